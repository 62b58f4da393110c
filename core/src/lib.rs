//! Client core for the campus events API.
//!
//! # Overview
//! Fetches colleges, students, events, registrations, attendance and
//! feedback, and submits the dashboard's create actions. The request
//! builder/parser is sans-IO; a `Transport` executes the round-trip.
//!
//! # Design
//! - `CampusClient` is stateless: it holds only `base_url`.
//! - Building (`build_request`, `build`) and parsing (`parse_response`,
//!   `parse`) are separate, so the I/O boundary is explicit and testable.
//! - `ROUTES` is the single source of verbs and paths for typed methods.
//! - Every failure is `ApiError::RequestFailed` with a readable message.
//! - `Controller` owns `AppState`; presentation is reached via `Notifier`.
//! - DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod logging;
pub mod routes;
pub mod service;
pub mod state;
pub mod transport;
pub mod types;
pub mod utils;

pub use client::CampusClient;
pub use config::{Config, ConfigError};
pub use controller::{
    fetch_dashboard, fetch_reports, ActionError, AttendanceForm, Controller, EventForm,
    FeedbackForm, FeedbackSummary, LoadingGuard, Notifier, SelectionForm, StudentForm, ToastKind,
};
pub use error::{ApiError, ApiResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use routes::{Endpoint, PathArgs, Route, ROUTES};
pub use service::ApiService;
pub use state::{AppState, DashboardSnapshot, DashboardStats, RegistrationIndex, Reports};
pub use transport::{ReqwestTransport, Transport};
pub use types::*;
