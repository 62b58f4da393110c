//! Async API service: the sans-IO client joined to a transport.
//!
//! `request` is the generic operation; the typed methods below it are
//! one-line delegations through the route table and carry no logic of
//! their own.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::client::{decode, encode, CampusClient};
use crate::error::ApiResult;
use crate::http::{HttpMethod, RequestOptions};
use crate::routes::{Endpoint, PathArgs};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::*;

pub struct ApiService<T = ReqwestTransport> {
    client: CampusClient,
    transport: T,
}

impl ApiService<ReqwestTransport> {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Ok(Self::with_transport(base_url, ReqwestTransport::new()?))
    }
}

impl<T: Transport> ApiService<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            client: CampusClient::new(base_url),
            transport,
        }
    }

    pub fn client(&self) -> &CampusClient {
        &self.client
    }

    /// Issue a request for `path` and return the parsed JSON body.
    ///
    /// Every failure is logged with the path before it is returned.
    pub async fn request(&self, path: &str, options: RequestOptions) -> ApiResult<Value> {
        let request = self.client.build_request(path, options);
        let result = match self.transport.execute(request).await {
            Ok(response) => self.client.parse_response(response),
            Err(e) => Err(e),
        };
        logged(path, result)
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.request(path, RequestOptions::method(HttpMethod::Get)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let options = RequestOptions::method(HttpMethod::Post).with_body(logged(path, encode(body))?);
        self.request(path, options).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let options = RequestOptions::method(HttpMethod::Put).with_body(logged(path, encode(body))?);
        self.request(path, options).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(path, RequestOptions::method(HttpMethod::Delete)).await
    }

    /// Resolve `endpoint` through the route table and decode the reply.
    pub async fn call<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        args: PathArgs,
        body: Option<String>,
    ) -> ApiResult<R> {
        let route = endpoint.route();
        let path = logged(route.template, route.path(args))?;
        let options = RequestOptions {
            method: route.method,
            headers: Vec::new(),
            body,
        };
        let value = self.request(&path, options).await?;
        logged(&path, decode(value))
    }

    async fn fetch<R: DeserializeOwned>(&self, endpoint: Endpoint, args: PathArgs) -> ApiResult<R> {
        self.call(endpoint, args, None).await
    }

    async fn send<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> ApiResult<R> {
        let body = logged(endpoint.route().template, encode(body))?;
        self.call(endpoint, PathArgs::none(), Some(body)).await
    }

    pub async fn health(&self) -> ApiResult<Health> {
        self.fetch(Endpoint::Health, PathArgs::none()).await
    }

    pub async fn colleges(&self) -> ApiResult<Vec<College>> {
        self.fetch(Endpoint::ListColleges, PathArgs::none()).await
    }

    pub async fn college(&self, id: CollegeId) -> ApiResult<College> {
        self.fetch(Endpoint::GetCollege, PathArgs::id(id)).await
    }

    pub async fn create_college(&self, input: &NewCollege) -> ApiResult<College> {
        self.send(Endpoint::CreateCollege, input).await
    }

    pub async fn students(&self) -> ApiResult<Vec<Student>> {
        self.fetch(Endpoint::ListStudents, PathArgs::none()).await
    }

    pub async fn student(&self, id: StudentId) -> ApiResult<Student> {
        self.fetch(Endpoint::GetStudent, PathArgs::id(id)).await
    }

    pub async fn create_student(&self, input: &NewStudent) -> ApiResult<Student> {
        self.send(Endpoint::CreateStudent, input).await
    }

    pub async fn events(&self, college_id: Option<CollegeId>) -> ApiResult<Vec<Event>> {
        self.fetch(Endpoint::ListEvents, PathArgs::query(college_id)).await
    }

    pub async fn event(&self, id: EventId) -> ApiResult<Event> {
        self.fetch(Endpoint::GetEvent, PathArgs::id(id)).await
    }

    pub async fn create_event(&self, input: &NewEvent) -> ApiResult<Event> {
        self.send(Endpoint::CreateEvent, input).await
    }

    pub async fn create_registration(&self, input: &NewRegistration) -> ApiResult<Registration> {
        self.send(Endpoint::CreateRegistration, input).await
    }

    pub async fn student_registrations(&self, id: StudentId) -> ApiResult<Vec<RegistrationDetails>> {
        self.fetch(Endpoint::StudentRegistrations, PathArgs::id(id)).await
    }

    pub async fn event_registrations(&self, id: EventId) -> ApiResult<Vec<RegistrationDetails>> {
        self.fetch(Endpoint::EventRegistrations, PathArgs::id(id)).await
    }

    pub async fn mark_attendance(&self, input: &NewAttendance) -> ApiResult<Attendance> {
        self.send(Endpoint::MarkAttendance, input).await
    }

    pub async fn event_attendance(&self, id: EventId) -> ApiResult<AttendanceReport> {
        self.fetch(Endpoint::EventAttendance, PathArgs::id(id)).await
    }

    pub async fn submit_feedback(&self, input: &NewFeedback) -> ApiResult<Feedback> {
        self.send(Endpoint::SubmitFeedback, input).await
    }

    pub async fn event_feedback(&self, id: EventId) -> ApiResult<Vec<FeedbackDetails>> {
        self.fetch(Endpoint::EventFeedback, PathArgs::id(id)).await
    }

    pub async fn event_popularity_report(&self) -> ApiResult<Vec<EventPopularity>> {
        self.fetch(Endpoint::EventPopularityReport, PathArgs::none()).await
    }

    pub async fn student_participation_report(&self) -> ApiResult<Vec<StudentParticipation>> {
        self.fetch(Endpoint::StudentParticipationReport, PathArgs::none()).await
    }

    pub async fn top_students_report(&self) -> ApiResult<Vec<TopStudent>> {
        self.fetch(Endpoint::TopStudentsReport, PathArgs::none()).await
    }
}

/// Record a failure against `path` before handing it back.
fn logged<R>(path: &str, result: ApiResult<R>) -> ApiResult<R> {
    if let Err(e) = &result {
        error!(path, status = ?e.status(), error = %e, "API request failed");
    }
    result
}
