//! Dashboard actions on top of `ApiService`.
//!
//! # Design
//! The controller owns the `AppState` snapshot and is the only writer. The
//! view layer is reached through `Notifier`: a loading indicator that is
//! always hidden again (a drop guard covers the error path) and transient
//! toasts. Every action reports its outcome through the notifier and also
//! returns it, so callers can branch on the error if they need to.

use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::service::ApiService;
use crate::state::{AppState, DashboardSnapshot, DashboardStats, Reports};
use crate::transport::Transport;
use crate::types::*;
use crate::utils::{average_rating, is_valid_email, validate_required};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// The presentation seam.
pub trait Notifier: Send + Sync {
    fn show_loading(&self) {}
    fn hide_loading(&self) {}
    fn toast(&self, message: &str, kind: ToastKind);
}

/// Shows the loading indicator on creation and hides it on drop.
pub struct LoadingGuard<N: Notifier> {
    notifier: Arc<N>,
}

impl<N: Notifier> LoadingGuard<N> {
    pub fn show(notifier: Arc<N>) -> Self {
        notifier.show_loading();
        Self { notifier }
    }
}

impl<N: Notifier> Drop for LoadingGuard<N> {
    fn drop(&mut self) {
        self.notifier.hide_loading();
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Please fill in: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("{field} must be a whole number")]
    InvalidNumber { field: String },

    #[error("Student is not registered for this event")]
    NotRegistered,

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type ActionResult<T> = std::result::Result<T, ActionError>;

fn require(record: &Value, fields: &[&str]) -> ActionResult<()> {
    let missing = validate_required(record, fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ActionError::MissingFields(missing))
    }
}

fn parse_number<N: std::str::FromStr>(field: &str, raw: &str) -> ActionResult<N> {
    raw.trim().parse().map_err(|_| ActionError::InvalidNumber {
        field: field.to_string(),
    })
}

/// Raw input of the add-student form.
#[derive(Debug, Clone, Default)]
pub struct StudentForm {
    pub name: String,
    pub email: String,
    pub college_id: String,
}

impl StudentForm {
    pub fn validate(&self) -> ActionResult<NewStudent> {
        let record = json!({"name": self.name, "email": self.email, "college_id": self.college_id});
        require(&record, &["name", "email", "college_id"])?;
        if !is_valid_email(self.email.trim()) {
            return Err(ActionError::InvalidEmail);
        }
        Ok(NewStudent {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            college_id: parse_number("college_id", &self.college_id)?,
        })
    }
}

/// Raw input of the add-event form. `description` is optional.
#[derive(Debug, Clone, Default)]
pub struct EventForm {
    pub name: String,
    pub event_type: String,
    pub date: String,
    pub capacity: String,
    pub description: String,
    pub college_id: String,
    pub created_by: String,
}

impl EventForm {
    pub fn validate(&self) -> ActionResult<NewEvent> {
        let record = json!({
            "name": self.name,
            "type": self.event_type,
            "date": self.date,
            "capacity": self.capacity,
            "college_id": self.college_id,
            "created_by": self.created_by,
        });
        require(&record, &["name", "type", "date", "capacity", "college_id", "created_by"])?;
        Ok(NewEvent {
            name: self.name.trim().to_string(),
            event_type: self.event_type.trim().to_string(),
            date: self.date.trim().to_string(),
            capacity: parse_number("capacity", &self.capacity)?,
            description: self.description.clone(),
            college_id: parse_number("college_id", &self.college_id)?,
            created_by: self.created_by.trim().to_string(),
        })
    }
}

/// A student/event pair picked from two selects.
#[derive(Debug, Clone, Default)]
pub struct SelectionForm {
    pub student_id: String,
    pub event_id: String,
}

impl SelectionForm {
    fn ids(&self, extra: &[(&str, &str)]) -> ActionResult<(StudentId, EventId)> {
        let mut record = json!({"student_id": self.student_id, "event_id": self.event_id});
        let mut fields = vec!["student_id", "event_id"];
        for (name, value) in extra {
            record[*name] = Value::String(value.to_string());
            fields.push(*name);
        }
        require(&record, &fields)?;
        Ok((
            parse_number("student_id", &self.student_id)?,
            parse_number("event_id", &self.event_id)?,
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceForm {
    pub selection: SelectionForm,
    /// `"1"` for present, `"0"` for absent.
    pub attended: String,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackForm {
    pub selection: SelectionForm,
    pub rating: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSummary {
    pub total: usize,
    pub average_rating: f64,
    pub feedback: Vec<FeedbackDetails>,
}

/// Fetch everything the dashboard shows, concurrently.
///
/// Fails fast: the first error completes the join, the outstanding requests
/// are dropped, and no partial result is returned.
pub async fn fetch_dashboard<T: Transport>(api: &ApiService<T>) -> ApiResult<DashboardSnapshot> {
    let (colleges, students, events, event_popularity, student_participation) = tokio::try_join!(
        api.colleges(),
        api.students(),
        api.events(None),
        api.event_popularity_report(),
        api.student_participation_report(),
    )?;
    Ok(DashboardSnapshot {
        colleges,
        students,
        events,
        event_popularity,
        student_participation,
    })
}

/// Fetch all three reports concurrently, with the same fail-fast policy.
pub async fn fetch_reports<T: Transport>(api: &ApiService<T>) -> ApiResult<Reports> {
    let (event_popularity, student_participation, top_students) = tokio::try_join!(
        api.event_popularity_report(),
        api.student_participation_report(),
        api.top_students_report(),
    )?;
    Ok(Reports {
        event_popularity,
        student_participation,
        top_students,
    })
}

pub struct Controller<T: Transport, N: Notifier> {
    api: ApiService<T>,
    state: AppState,
    notifier: Arc<N>,
}

impl<T: Transport, N: Notifier> Controller<T, N> {
    pub fn new(api: ApiService<T>, notifier: N) -> Self {
        Self {
            api,
            state: AppState::default(),
            notifier: Arc::new(notifier),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn api(&self) -> &ApiService<T> {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn loading(&self) -> LoadingGuard<N> {
        LoadingGuard::show(Arc::clone(&self.notifier))
    }

    /// Toast the outcome and hand it back.
    fn finish<R>(&self, result: ActionResult<R>, success: Option<&str>) -> ActionResult<R> {
        match &result {
            Ok(_) => {
                if let Some(message) = success {
                    self.notifier.toast(message, ToastKind::Success);
                }
            }
            Err(e) => {
                warn!(error = %e, "action failed");
                let message = e.to_string();
                let message = if message.is_empty() {
                    "An unexpected error occurred".to_string()
                } else {
                    message
                };
                self.notifier.toast(&message, ToastKind::Error);
            }
        }
        result
    }

    /// First load: dashboard snapshot under the loading indicator.
    pub async fn initialize(&mut self) -> ActionResult<DashboardStats> {
        let result = {
            let _loading = self.loading();
            self.refresh_dashboard().await
        };
        self.finish(result, Some("Application loaded successfully!"))
    }

    pub async fn load_dashboard(&mut self) -> ActionResult<DashboardStats> {
        let result = self.refresh_dashboard().await;
        self.finish(result, None)
    }

    async fn refresh_dashboard(&mut self) -> ActionResult<DashboardStats> {
        let snapshot = fetch_dashboard(&self.api).await?;
        self.state.apply_dashboard(snapshot);
        let stats = self.state.stats();
        info!(
            colleges = stats.total_colleges,
            students = stats.total_students,
            events = stats.total_events,
            "dashboard loaded"
        );
        Ok(stats)
    }

    pub async fn load_colleges(&mut self) -> ActionResult<&[College]> {
        let result = self.api.colleges().await.map_err(ActionError::from);
        self.state.colleges = self.finish(result, None)?;
        Ok(&self.state.colleges)
    }

    pub async fn load_students(&mut self) -> ActionResult<&[Student]> {
        let result = self.api.students().await.map_err(ActionError::from);
        self.state.students = self.finish(result, None)?;
        Ok(&self.state.students)
    }

    pub async fn load_events(&mut self) -> ActionResult<&[Event]> {
        let result = self.api.events(None).await.map_err(ActionError::from);
        self.state.events = self.finish(result, None)?;
        Ok(&self.state.events)
    }

    pub async fn load_reports(&mut self) -> ActionResult<&Reports> {
        let result = fetch_reports(&self.api).await.map_err(ActionError::from);
        self.state.reports = self.finish(result, None)?;
        Ok(&self.state.reports)
    }

    pub async fn student_registrations(
        &self,
        student_id: StudentId,
    ) -> ActionResult<Vec<RegistrationDetails>> {
        let result = self.api.student_registrations(student_id).await;
        self.finish(result.map_err(ActionError::from), None)
    }

    /// Registrations for an event; also refreshes that event's index entries.
    pub async fn event_registrations(
        &mut self,
        event_id: EventId,
    ) -> ActionResult<Vec<RegistrationDetails>> {
        let result = self.api.event_registrations(event_id).await;
        if let Ok(registrations) = &result {
            self.state.registrations.replace_event(event_id, registrations);
        }
        self.finish(result.map_err(ActionError::from), None)
    }

    pub async fn event_attendance(&self, event_id: EventId) -> ActionResult<AttendanceReport> {
        let result = self.api.event_attendance(event_id).await;
        self.finish(result.map_err(ActionError::from), None)
    }

    pub async fn event_feedback(&self, event_id: EventId) -> ActionResult<FeedbackSummary> {
        let result = self.api.event_feedback(event_id).await.map(|feedback| FeedbackSummary {
            total: feedback.len(),
            average_rating: average_rating(feedback.iter().map(|f| f.feedback.rating)),
            feedback,
        });
        self.finish(result.map_err(ActionError::from), None)
    }

    pub async fn add_student(&mut self, form: &StudentForm) -> ActionResult<Student> {
        let result = self.try_add_student(form).await;
        self.finish(result, Some("Student added successfully!"))
    }

    async fn try_add_student(&mut self, form: &StudentForm) -> ActionResult<Student> {
        let input = form.validate()?;
        let _loading = self.loading();
        let student = self.api.create_student(&input).await?;
        // A failed reload is toasted on its own and keeps the old list.
        let _ = self.load_students().await;
        Ok(student)
    }

    pub async fn add_event(&mut self, form: &EventForm) -> ActionResult<Event> {
        let result = self.try_add_event(form).await;
        self.finish(result, Some("Event added successfully!"))
    }

    async fn try_add_event(&mut self, form: &EventForm) -> ActionResult<Event> {
        let input = form.validate()?;
        let _loading = self.loading();
        let event = self.api.create_event(&input).await?;
        let _ = self.load_events().await;
        Ok(event)
    }

    pub async fn add_registration(&mut self, form: &SelectionForm) -> ActionResult<Registration> {
        let result = self.try_add_registration(form).await;
        self.finish(result, Some("Registration successful!"))
    }

    async fn try_add_registration(&mut self, form: &SelectionForm) -> ActionResult<Registration> {
        let (student_id, event_id) = form.ids(&[])?;
        let _loading = self.loading();
        let registration = self
            .api
            .create_registration(&NewRegistration {
                student_id,
                event_id,
            })
            .await?;
        self.state
            .registrations
            .insert(student_id, event_id, registration.registration_id);
        Ok(registration)
    }

    pub async fn mark_attendance(&mut self, form: &AttendanceForm) -> ActionResult<Attendance> {
        let result = self.try_mark_attendance(form).await;
        self.finish(result, Some("Attendance marked successfully!"))
    }

    async fn try_mark_attendance(&mut self, form: &AttendanceForm) -> ActionResult<Attendance> {
        let (student_id, event_id) = form.selection.ids(&[("attended", form.attended.as_str())])?;
        let attended = parse_number::<u8>("attended", &form.attended)? != 0;
        let _loading = self.loading();
        let registration_id = self.resolve_registration(student_id, event_id).await?;
        let attendance = self
            .api
            .mark_attendance(&NewAttendance {
                registration_id,
                attended,
            })
            .await?;
        Ok(attendance)
    }

    pub async fn submit_feedback(&mut self, form: &FeedbackForm) -> ActionResult<Feedback> {
        let result = self.try_submit_feedback(form).await;
        self.finish(result, Some("Feedback submitted successfully!"))
    }

    async fn try_submit_feedback(&mut self, form: &FeedbackForm) -> ActionResult<Feedback> {
        let (student_id, event_id) = form.selection.ids(&[("rating", form.rating.as_str())])?;
        let rating = parse_number("rating", &form.rating)?;
        let comment = Some(form.comment.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let _loading = self.loading();
        let registration_id = self.resolve_registration(student_id, event_id).await?;
        let feedback = self
            .api
            .submit_feedback(&NewFeedback {
                registration_id,
                rating,
                comment,
            })
            .await?;
        Ok(feedback)
    }

    /// Look the registration up in the index, refreshing the event's
    /// registrations from the server on a miss.
    async fn resolve_registration(
        &mut self,
        student_id: StudentId,
        event_id: EventId,
    ) -> ActionResult<RegistrationId> {
        if let Some(id) = self.state.registrations.get(student_id, event_id) {
            return Ok(id);
        }
        let registrations = self.api.event_registrations(event_id).await?;
        self.state.registrations.replace_event(event_id, &registrations);
        self.state
            .registrations
            .get(student_id, event_id)
            .ok_or(ActionError::NotRegistered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_form_reports_missing_fields_in_order() {
        let form = StudentForm {
            name: "Ana".to_string(),
            ..StudentForm::default()
        };
        match form.validate() {
            Err(ActionError::MissingFields(missing)) => {
                assert_eq!(missing, vec!["email", "college_id"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_fields_message_lists_names() {
        let err = ActionError::MissingFields(vec!["email".to_string(), "college_id".to_string()]);
        assert_eq!(err.to_string(), "Please fill in: email, college_id");
    }

    #[test]
    fn student_form_checks_email_shape() {
        let form = StudentForm {
            name: "Ana".to_string(),
            email: "ana-at-uni".to_string(),
            college_id: "1".to_string(),
        };
        assert!(matches!(form.validate(), Err(ActionError::InvalidEmail)));
    }

    #[test]
    fn student_form_parses_college_id() {
        let form = StudentForm {
            name: " Ana ".to_string(),
            email: "ana@uni.edu".to_string(),
            college_id: "x1".to_string(),
        };
        assert!(matches!(
            form.validate(),
            Err(ActionError::InvalidNumber { field }) if field == "college_id"
        ));

        let form = StudentForm {
            college_id: " 3 ".to_string(),
            ..form
        };
        let input = form.validate().unwrap();
        assert_eq!(input.college_id, 3);
        assert_eq!(input.name, "Ana");
    }

    #[test]
    fn event_form_allows_blank_description() {
        let form = EventForm {
            name: "Hack Night".to_string(),
            event_type: "Hackathon".to_string(),
            date: "2026-11-02".to_string(),
            capacity: "40".to_string(),
            description: String::new(),
            college_id: "2".to_string(),
            created_by: "club".to_string(),
        };
        let input = form.validate().unwrap();
        assert_eq!(input.capacity, 40);
        assert!(input.description.is_empty());
    }

    #[test]
    fn selection_requires_extra_fields() {
        let form = AttendanceForm {
            selection: SelectionForm {
                student_id: "1".to_string(),
                event_id: "2".to_string(),
            },
            attended: String::new(),
        };
        match form.selection.ids(&[("attended", form.attended.as_str())]) {
            Err(ActionError::MissingFields(missing)) => assert_eq!(missing, vec!["attended"]),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
