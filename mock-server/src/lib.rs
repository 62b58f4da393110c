//! In-memory stand-in for the campus events API.
//!
//! Mirrors the real server's routes, JSON shapes and `{"detail": ...}` error
//! bodies closely enough to drive the client end to end. Nothing persists
//! beyond the process.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct College {
    pub college_id: i64,
    pub name: String,
    pub location: String,
}

#[derive(Deserialize)]
pub struct CreateCollege {
    pub name: String,
    pub location: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub college_id: i64,
}

#[derive(Deserialize)]
pub struct CreateStudent {
    pub name: String,
    pub email: String,
    pub college_id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub event_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: String,
    pub capacity: i64,
    pub description: String,
    pub college_id: i64,
    pub created_by: String,
}

#[derive(Deserialize)]
pub struct CreateEvent {
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: String,
    pub capacity: i64,
    pub description: String,
    pub college_id: i64,
    pub created_by: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    pub registration_id: i64,
    pub student_id: i64,
    pub event_id: i64,
    pub status: String,
    pub timestamp: String,
}

#[derive(Deserialize)]
pub struct CreateRegistration {
    pub student_id: i64,
    pub event_id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Attendance {
    pub attendance_id: i64,
    pub registration_id: i64,
    pub attended: i64,
    pub timestamp: String,
}

#[derive(Deserialize)]
pub struct CreateAttendance {
    pub registration_id: i64,
    pub attended: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub feedback_id: i64,
    pub registration_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateFeedback {
    pub registration_id: i64,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Deserialize)]
pub struct EventFilter {
    pub college_id: Option<i64>,
}

pub const REGISTERED: &str = "Registered";
pub const WAITLISTED: &str = "Waitlisted";

/// A rejected request, rendered as `{"detail": message}`.
#[derive(Debug)]
pub struct Rejection {
    status: StatusCode,
    detail: String,
}

impl Rejection {
    fn bad_request(detail: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.to_string(),
        }
    }

    fn not_found(detail: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

type Reply<T> = Result<Json<T>, Rejection>;

/// All tables, keyed by id. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct Store {
    colleges: BTreeMap<i64, College>,
    students: BTreeMap<i64, Student>,
    events: BTreeMap<i64, Event>,
    registrations: BTreeMap<i64, Registration>,
    attendance: BTreeMap<i64, Attendance>,
    feedback: BTreeMap<i64, Feedback>,
    last_id: i64,
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn add_college(&mut self, input: CreateCollege) -> College {
        let college = College {
            college_id: self.next_id(),
            name: input.name,
            location: input.location,
        };
        self.colleges.insert(college.college_id, college.clone());
        college
    }

    pub fn add_student(&mut self, input: CreateStudent) -> Result<Student, Rejection> {
        if !self.colleges.contains_key(&input.college_id) {
            return Err(Rejection::bad_request("College not found"));
        }
        if self.students.values().any(|s| s.email == input.email) {
            return Err(Rejection::bad_request("Email already registered"));
        }
        let student = Student {
            student_id: self.next_id(),
            name: input.name,
            email: input.email,
            college_id: input.college_id,
        };
        self.students.insert(student.student_id, student.clone());
        Ok(student)
    }

    pub fn add_event(&mut self, input: CreateEvent) -> Result<Event, Rejection> {
        if !self.colleges.contains_key(&input.college_id) {
            return Err(Rejection::bad_request("College not found"));
        }
        let event = Event {
            event_id: self.next_id(),
            name: input.name,
            event_type: input.event_type,
            date: input.date,
            capacity: input.capacity,
            description: input.description,
            college_id: input.college_id,
            created_by: input.created_by,
        };
        self.events.insert(event.event_id, event.clone());
        Ok(event)
    }

    /// Registrations beyond the event's capacity are waitlisted.
    pub fn add_registration(&mut self, input: CreateRegistration) -> Result<Registration, Rejection> {
        if !self.students.contains_key(&input.student_id) {
            return Err(Rejection::bad_request("Student not found"));
        }
        let capacity = self
            .events
            .get(&input.event_id)
            .map(|e| e.capacity)
            .ok_or_else(|| Rejection::bad_request("Event not found"))?;
        let existing: Vec<&Registration> = self
            .registrations
            .values()
            .filter(|r| r.event_id == input.event_id)
            .collect();
        if existing.iter().any(|r| r.student_id == input.student_id) {
            return Err(Rejection::bad_request("Student already registered for this event"));
        }
        let registered = existing.iter().filter(|r| r.status == REGISTERED).count() as i64;
        let status = if registered >= capacity { WAITLISTED } else { REGISTERED };

        let registration = Registration {
            registration_id: self.next_id(),
            student_id: input.student_id,
            event_id: input.event_id,
            status: status.to_string(),
            timestamp: now(),
        };
        self.registrations
            .insert(registration.registration_id, registration.clone());
        Ok(registration)
    }

    pub fn add_attendance(&mut self, input: CreateAttendance) -> Result<Attendance, Rejection> {
        if !self.registrations.contains_key(&input.registration_id) {
            return Err(Rejection::bad_request("Registration not found"));
        }
        if self
            .attendance
            .values()
            .any(|a| a.registration_id == input.registration_id)
        {
            return Err(Rejection::bad_request(
                "Attendance already marked for this registration",
            ));
        }
        let attendance = Attendance {
            attendance_id: self.next_id(),
            registration_id: input.registration_id,
            attended: input.attended,
            timestamp: now(),
        };
        self.attendance
            .insert(attendance.attendance_id, attendance.clone());
        Ok(attendance)
    }

    pub fn add_feedback(&mut self, input: CreateFeedback) -> Result<Feedback, Rejection> {
        if !self.registrations.contains_key(&input.registration_id) {
            return Err(Rejection::bad_request("Registration not found"));
        }
        if self
            .feedback
            .values()
            .any(|f| f.registration_id == input.registration_id)
        {
            return Err(Rejection::bad_request(
                "Feedback already submitted for this registration",
            ));
        }
        if !(1..=5).contains(&input.rating) {
            return Err(Rejection::bad_request("Rating must be between 1 and 5"));
        }
        let feedback = Feedback {
            feedback_id: self.next_id(),
            registration_id: input.registration_id,
            rating: input.rating,
            comment: input.comment,
        };
        self.feedback.insert(feedback.feedback_id, feedback.clone());
        Ok(feedback)
    }

    fn college_name(&self, college_id: i64) -> String {
        self.colleges
            .get(&college_id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    fn registration_details(&self, r: &Registration) -> Value {
        json!({
            "registration_id": r.registration_id,
            "student_id": r.student_id,
            "event_id": r.event_id,
            "status": r.status,
            "timestamp": r.timestamp,
            "student": self.students.get(&r.student_id),
            "event": self.events.get(&r.event_id),
        })
    }

    fn attended(&self, registration_id: i64) -> bool {
        self.attendance
            .values()
            .any(|a| a.registration_id == registration_id && a.attended == 1)
    }

    fn attendance_report(&self, event: &Event) -> Value {
        let records: Vec<Value> = self
            .attendance
            .values()
            .filter_map(|a| {
                let r = self.registrations.get(&a.registration_id)?;
                if r.event_id != event.event_id {
                    return None;
                }
                let s = self.students.get(&r.student_id)?;
                Some(json!({
                    "attendance_id": a.attendance_id,
                    "registration_id": a.registration_id,
                    "attended": a.attended,
                    "timestamp": a.timestamp,
                    "student_id": s.student_id,
                    "student_name": s.name,
                    "student_email": s.email,
                    "registration_status": r.status,
                    "registration_timestamp": r.timestamp,
                }))
            })
            .collect();

        let registered: Vec<&Registration> = self
            .registrations
            .values()
            .filter(|r| r.event_id == event.event_id && r.status == REGISTERED)
            .collect();
        let attended = registered
            .iter()
            .filter(|r| self.attended(r.registration_id))
            .count();
        let rate = if registered.is_empty() {
            0.0
        } else {
            (attended as f64 / registered.len() as f64 * 10000.0).round() / 100.0
        };

        json!({
            "event": event,
            "summary": {
                "total_registrations": registered.len(),
                "total_attendance": attended,
                "attendance_rate": rate,
            },
            "attendance_records": records,
        })
    }

    fn event_popularity(&self) -> Vec<Value> {
        let mut rows: Vec<(usize, &Event)> = self
            .events
            .values()
            .map(|e| {
                let count = self
                    .registrations
                    .values()
                    .filter(|r| r.event_id == e.event_id && r.status == REGISTERED)
                    .count();
                (count, e)
            })
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));
        rows.into_iter()
            .map(|(count, e)| {
                json!({
                    "event_id": e.event_id,
                    "event_name": e.name,
                    "college_name": self.college_name(e.college_id),
                    "registration_count": count,
                })
            })
            .collect()
    }

    /// Events attended by each student, optionally counting only
    /// `Registered` registrations, with the number of those registrations.
    fn participation(&self, registered_only: bool) -> Vec<(&Student, usize, usize)> {
        self.students
            .values()
            .map(|s| {
                let mine: Vec<&Registration> = self
                    .registrations
                    .values()
                    .filter(|r| r.student_id == s.student_id)
                    .filter(|r| !registered_only || r.status == REGISTERED)
                    .collect();
                let attended = mine
                    .iter()
                    .filter(|r| self.attended(r.registration_id))
                    .count();
                (s, mine.len(), attended)
            })
            .collect()
    }

    fn student_participation(&self) -> Vec<Value> {
        let mut rows = self.participation(false);
        rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.name.cmp(&b.0.name)));
        rows.into_iter()
            .map(|(s, _, attended)| {
                json!({
                    "student_id": s.student_id,
                    "student_name": s.name,
                    "college_name": self.college_name(s.college_id),
                    "events_attended": attended,
                })
            })
            .collect()
    }

    fn top_students(&self) -> Vec<Value> {
        let mut rows: Vec<(&Student, usize, usize, f64)> = self
            .participation(true)
            .into_iter()
            .filter(|(_, total, _)| *total > 0)
            .map(|(s, total, attended)| {
                let rate = (attended as f64 * 10000.0 / total as f64).round() / 100.0;
                (s, total, attended, rate)
            })
            .collect();
        rows.sort_by(|a, b| {
            b.2.cmp(&a.2)
                .then_with(|| b.3.total_cmp(&a.3))
                .then_with(|| a.0.name.cmp(&b.0.name))
        });
        rows.into_iter()
            .take(3)
            .map(|(s, total, attended, rate)| {
                json!({
                    "student_id": s.student_id,
                    "student_name": s.name,
                    "college_name": self.college_name(s.college_id),
                    "total_events": total,
                    "events_attended": attended,
                    "participation_rate": rate,
                })
            })
            .collect()
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/health", get(health))
        .route("/colleges", get(list_colleges).post(create_college))
        .route("/colleges/{id}", get(get_college))
        .route("/students", get(list_students).post(create_student))
        .route("/students/{id}", get(get_student))
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event))
        .route("/registrations", axum::routing::post(create_registration))
        .route("/registrations/student/{id}", get(student_registrations))
        .route("/registrations/event/{id}", get(event_registrations))
        .route("/attendance", axum::routing::post(mark_attendance))
        .route("/attendance/event/{id}", get(event_attendance))
        .route("/feedback", axum::routing::post(submit_feedback))
        .route("/feedback/event/{id}", get(event_feedback))
        .route("/reports/event-popularity", get(event_popularity))
        .route("/reports/student-participation", get(student_participation))
        .route("/reports/top-students", get(top_students))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "message": "API is running"}))
}

async fn list_colleges(State(db): State<Db>) -> Json<Vec<College>> {
    Json(db.read().await.colleges.values().cloned().collect())
}

async fn get_college(State(db): State<Db>, Path(id): Path<i64>) -> Reply<College> {
    let store = db.read().await;
    store
        .colleges
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Rejection::not_found("College not found"))
}

async fn create_college(State(db): State<Db>, Json(input): Json<CreateCollege>) -> Json<College> {
    Json(db.write().await.add_college(input))
}

async fn list_students(State(db): State<Db>) -> Json<Vec<Student>> {
    Json(db.read().await.students.values().cloned().collect())
}

async fn get_student(State(db): State<Db>, Path(id): Path<i64>) -> Reply<Student> {
    let store = db.read().await;
    store
        .students
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Rejection::not_found("Student not found"))
}

async fn create_student(State(db): State<Db>, Json(input): Json<CreateStudent>) -> Reply<Student> {
    db.write().await.add_student(input).map(Json)
}

async fn list_events(State(db): State<Db>, Query(filter): Query<EventFilter>) -> Reply<Vec<Event>> {
    let store = db.read().await;
    if let Some(college_id) = filter.college_id {
        if !store.colleges.contains_key(&college_id) {
            return Err(Rejection::bad_request("College not found"));
        }
    }
    Ok(Json(
        store
            .events
            .values()
            .filter(|e| filter.college_id.map_or(true, |id| e.college_id == id))
            .cloned()
            .collect(),
    ))
}

async fn get_event(State(db): State<Db>, Path(id): Path<i64>) -> Reply<Event> {
    let store = db.read().await;
    store
        .events
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Rejection::not_found("Event not found"))
}

async fn create_event(State(db): State<Db>, Json(input): Json<CreateEvent>) -> Reply<Event> {
    db.write().await.add_event(input).map(Json)
}

async fn create_registration(
    State(db): State<Db>,
    Json(input): Json<CreateRegistration>,
) -> Reply<Registration> {
    db.write().await.add_registration(input).map(Json)
}

async fn student_registrations(State(db): State<Db>, Path(id): Path<i64>) -> Reply<Vec<Value>> {
    let store = db.read().await;
    if !store.students.contains_key(&id) {
        return Err(Rejection::not_found("Student not found"));
    }
    // Newest first.
    Ok(Json(
        store
            .registrations
            .values()
            .rev()
            .filter(|r| r.student_id == id)
            .map(|r| store.registration_details(r))
            .collect(),
    ))
}

async fn event_registrations(State(db): State<Db>, Path(id): Path<i64>) -> Reply<Vec<Value>> {
    let store = db.read().await;
    if !store.events.contains_key(&id) {
        return Err(Rejection::not_found("Event not found"));
    }
    Ok(Json(
        store
            .registrations
            .values()
            .filter(|r| r.event_id == id)
            .map(|r| store.registration_details(r))
            .collect(),
    ))
}

async fn mark_attendance(
    State(db): State<Db>,
    Json(input): Json<CreateAttendance>,
) -> Reply<Attendance> {
    db.write().await.add_attendance(input).map(Json)
}

async fn event_attendance(State(db): State<Db>, Path(id): Path<i64>) -> Reply<Value> {
    let store = db.read().await;
    let event = store
        .events
        .get(&id)
        .ok_or_else(|| Rejection::not_found("Event not found"))?;
    Ok(Json(store.attendance_report(event)))
}

async fn submit_feedback(
    State(db): State<Db>,
    Json(input): Json<CreateFeedback>,
) -> Reply<Feedback> {
    db.write().await.add_feedback(input).map(Json)
}

async fn event_feedback(State(db): State<Db>, Path(id): Path<i64>) -> Reply<Vec<Value>> {
    let store = db.read().await;
    if !store.events.contains_key(&id) {
        return Err(Rejection::not_found("Event not found"));
    }
    // Newest first.
    Ok(Json(
        store
            .feedback
            .values()
            .rev()
            .filter_map(|f| {
                let r = store.registrations.get(&f.registration_id)?;
                (r.event_id == id).then(|| {
                    json!({
                        "feedback_id": f.feedback_id,
                        "registration_id": f.registration_id,
                        "rating": f.rating,
                        "comment": f.comment,
                        "registration": store.registration_details(r),
                    })
                })
            })
            .collect(),
    ))
}

async fn event_popularity(State(db): State<Db>) -> Json<Vec<Value>> {
    Json(db.read().await.event_popularity())
}

async fn student_participation(State(db): State<Db>) -> Json<Vec<Value>> {
    Json(db.read().await.student_participation())
}

async fn top_students(State(db): State<Db>) -> Json<Vec<Value>> {
    Json(db.read().await.top_students())
}
