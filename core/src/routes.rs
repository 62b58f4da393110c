//! Resource route table.
//!
//! Every typed method on `ApiService` resolves its verb and path through
//! `ROUTES`, so a path exists in exactly one place. The table is indexed by
//! `Endpoint` discriminant and must stay in declaration order.

use crate::error::{ApiError, ApiResult};
use crate::http::HttpMethod;

/// Every operation the campus API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    ListColleges,
    GetCollege,
    CreateCollege,
    ListStudents,
    GetStudent,
    CreateStudent,
    ListEvents,
    GetEvent,
    CreateEvent,
    CreateRegistration,
    StudentRegistrations,
    EventRegistrations,
    MarkAttendance,
    EventAttendance,
    SubmitFeedback,
    EventFeedback,
    EventPopularityReport,
    StudentParticipationReport,
    TopStudentsReport,
}

/// Verb, path template and optional query parameter for one endpoint.
///
/// Templates use `{id}` as the only placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub endpoint: Endpoint,
    pub method: HttpMethod,
    pub template: &'static str,
    pub query: Option<&'static str>,
}

const fn route(
    endpoint: Endpoint,
    method: HttpMethod,
    template: &'static str,
    query: Option<&'static str>,
) -> Route {
    Route {
        endpoint,
        method,
        template,
        query,
    }
}

use Endpoint as E;
use HttpMethod::{Get, Post};

pub const ROUTES: &[Route] = &[
    route(E::Health, Get, "/health", None),
    route(E::ListColleges, Get, "/colleges", None),
    route(E::GetCollege, Get, "/colleges/{id}", None),
    route(E::CreateCollege, Post, "/colleges", None),
    route(E::ListStudents, Get, "/students", None),
    route(E::GetStudent, Get, "/students/{id}", None),
    route(E::CreateStudent, Post, "/students", None),
    route(E::ListEvents, Get, "/events", Some("college_id")),
    route(E::GetEvent, Get, "/events/{id}", None),
    route(E::CreateEvent, Post, "/events", None),
    route(E::CreateRegistration, Post, "/registrations", None),
    route(E::StudentRegistrations, Get, "/registrations/student/{id}", None),
    route(E::EventRegistrations, Get, "/registrations/event/{id}", None),
    route(E::MarkAttendance, Post, "/attendance", None),
    route(E::EventAttendance, Get, "/attendance/event/{id}", None),
    route(E::SubmitFeedback, Post, "/feedback", None),
    route(E::EventFeedback, Get, "/feedback/event/{id}", None),
    route(E::EventPopularityReport, Get, "/reports/event-popularity", None),
    route(E::StudentParticipationReport, Get, "/reports/student-participation", None),
    route(E::TopStudentsReport, Get, "/reports/top-students", None),
];

impl Endpoint {
    pub fn route(self) -> &'static Route {
        &ROUTES[self as usize]
    }
}

/// Values substituted into a route template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathArgs {
    pub id: Option<i64>,
    pub query: Option<i64>,
}

impl PathArgs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn id(id: i64) -> Self {
        Self {
            id: Some(id),
            query: None,
        }
    }

    pub fn query(value: Option<i64>) -> Self {
        Self {
            id: None,
            query: value,
        }
    }
}

impl Route {
    /// Render the relative path for this route.
    ///
    /// The query parameter is appended only when the route declares one and
    /// a value is supplied.
    pub fn path(&self, args: PathArgs) -> ApiResult<String> {
        let mut path = if self.template.contains("{id}") {
            let id = args.id.ok_or_else(|| {
                ApiError::request_failed(format!("missing id for {}", self.template))
            })?;
            self.template.replace("{id}", &id.to_string())
        } else {
            self.template.to_string()
        };

        if let (Some(name), Some(value)) = (self.query, args.query) {
            path.push('?');
            path.push_str(name);
            path.push('=');
            path.push_str(&value.to_string());
        }
        Ok(path)
    }
}
