//! Domain DTOs for the campus events API.
//!
//! # Design
//! These types mirror the server's JSON shapes but are defined independently
//! of the mock-server crate; integration tests catch schema drift. Ids are
//! integers assigned by the server, so create payloads never carry one.

use std::fmt;

use serde::{Deserialize, Serialize};

pub type CollegeId = i64;
pub type StudentId = i64;
pub type EventId = i64;
pub type RegistrationId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct College {
    pub college_id: CollegeId,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCollege {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub student_id: StudentId,
    pub name: String,
    pub email: String,
    pub college_id: CollegeId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub college_id: CollegeId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub event_id: EventId,
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: String,
    pub capacity: i64,
    pub description: String,
    pub college_id: CollegeId,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: String,
    pub capacity: i64,
    pub description: String,
    pub college_id: CollegeId,
    pub created_by: String,
}

/// Registration status as reported by the server.
///
/// Unknown values are kept verbatim so a newer server never breaks parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistrationStatus {
    Registered,
    Waitlisted,
    Cancelled,
    Other(String),
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RegistrationStatus::Registered => "Registered",
            RegistrationStatus::Waitlisted => "Waitlisted",
            RegistrationStatus::Cancelled => "Cancelled",
            RegistrationStatus::Other(s) => s,
        }
    }
}

impl From<String> for RegistrationStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Registered" => RegistrationStatus::Registered,
            "Waitlisted" => RegistrationStatus::Waitlisted,
            "Cancelled" => RegistrationStatus::Cancelled,
            _ => RegistrationStatus::Other(value),
        }
    }
}

impl From<RegistrationStatus> for String {
    fn from(value: RegistrationStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub registration_id: RegistrationId,
    pub student_id: StudentId,
    pub event_id: EventId,
    pub status: RegistrationStatus,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRegistration {
    pub student_id: StudentId,
    pub event_id: EventId,
}

/// A registration with its student and event expanded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationDetails {
    #[serde(flatten)]
    pub registration: Registration,
    pub student: Student,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attendance {
    pub attendance_id: i64,
    pub registration_id: RegistrationId,
    #[serde(with = "flag")]
    pub attended: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewAttendance {
    pub registration_id: RegistrationId,
    #[serde(with = "flag")]
    pub attended: bool,
}

/// One row of an event attendance report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    #[serde(flatten)]
    pub attendance: Attendance,
    pub student_id: StudentId,
    pub student_name: String,
    pub student_email: String,
    pub registration_status: RegistrationStatus,
    pub registration_timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceSummary {
    pub total_registrations: u64,
    pub total_attendance: u64,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceReport {
    pub event: Event,
    pub summary: AttendanceSummary,
    pub attendance_records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feedback {
    pub feedback_id: i64,
    pub registration_id: RegistrationId,
    pub rating: u8,
    pub comment: Option<String>,
}

/// Feedback payload. `comment` is sent as `null` when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewFeedback {
    pub registration_id: RegistrationId,
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackDetails {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub registration: RegistrationDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventPopularity {
    pub event_id: EventId,
    pub event_name: String,
    pub college_name: String,
    pub registration_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentParticipation {
    pub student_id: StudentId,
    pub student_name: String,
    pub college_name: String,
    pub events_attended: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopStudent {
    pub student_id: StudentId,
    pub student_name: String,
    pub college_name: String,
    pub total_events: u64,
    pub events_attended: u64,
    pub participation_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// `attended` travels as `0`/`1`; booleans are accepted on input too.
mod flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Int(i64),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(b),
            Raw::Int(0) => Ok(false),
            Raw::Int(1) => Ok(true),
            Raw::Int(other) => Err(de::Error::custom(format!("invalid attended flag {other}"))),
        }
    }
}
