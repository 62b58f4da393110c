//! Application state owned by the controller.
//!
//! # Design
//! `AppState` is the last-fetched snapshot of everything the dashboard shows.
//! It is replaced wholesale on reload, never merged, and helpers read it only
//! through an explicit reference. Registrations are indexed by
//! (student, event) so resolving a registration does not scan a list.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{
    College, CollegeId, Event, EventId, EventPopularity, RegistrationDetails, RegistrationId,
    Student, StudentId, StudentParticipation, TopStudent,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reports {
    pub event_popularity: Vec<EventPopularity>,
    pub student_participation: Vec<StudentParticipation>,
    pub top_students: Vec<TopStudent>,
}

/// Everything a dashboard reload fetches, applied in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub colleges: Vec<College>,
    pub students: Vec<Student>,
    pub events: Vec<Event>,
    pub event_popularity: Vec<EventPopularity>,
    pub student_participation: Vec<StudentParticipation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_colleges: usize,
    pub total_students: usize,
    pub total_events: usize,
}

/// (student, event) → registration id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationIndex {
    entries: HashMap<(StudentId, EventId), RegistrationId>,
}

impl RegistrationIndex {
    pub fn get(&self, student_id: StudentId, event_id: EventId) -> Option<RegistrationId> {
        self.entries.get(&(student_id, event_id)).copied()
    }

    pub fn insert(&mut self, student_id: StudentId, event_id: EventId, id: RegistrationId) {
        self.entries.insert((student_id, event_id), id);
    }

    /// Replace every entry for `event_id` with `registrations`.
    pub fn replace_event(&mut self, event_id: EventId, registrations: &[RegistrationDetails]) {
        self.entries.retain(|(_, event), _| *event != event_id);
        for details in registrations {
            let r = &details.registration;
            self.entries.insert((r.student_id, r.event_id), r.registration_id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub colleges: Vec<College>,
    pub students: Vec<Student>,
    pub events: Vec<Event>,
    pub reports: Reports,
    pub registrations: RegistrationIndex,
}

impl AppState {
    /// Swap in a complete dashboard snapshot. Top-students and the
    /// registration index are not part of a dashboard reload and survive it.
    pub fn apply_dashboard(&mut self, snapshot: DashboardSnapshot) {
        self.colleges = snapshot.colleges;
        self.students = snapshot.students;
        self.events = snapshot.events;
        self.reports.event_popularity = snapshot.event_popularity;
        self.reports.student_participation = snapshot.student_participation;
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            total_colleges: self.colleges.len(),
            total_students: self.students.len(),
            total_events: self.events.len(),
        }
    }

    /// Events hosted by `college_id`, or every event when no filter is set.
    pub fn filter_events(&self, college_id: Option<CollegeId>) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| college_id.map_or(true, |id| e.college_id == id))
            .collect()
    }

    /// Case-insensitive substring match on name or email.
    pub fn search_students(&self, term: &str) -> Vec<&Student> {
        let term = term.trim().to_lowercase();
        self.students
            .iter()
            .filter(|s| {
                term.is_empty()
                    || s.name.to_lowercase().contains(&term)
                    || s.email.to_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn college(&self, college_id: CollegeId) -> Option<&College> {
        self.colleges.iter().find(|c| c.college_id == college_id)
    }

    pub fn college_name(&self, college_id: CollegeId) -> &str {
        self.college(college_id).map_or("Unknown", |c| c.name.as_str())
    }

    pub fn student(&self, student_id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.student_id == student_id)
    }

    pub fn event(&self, event_id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.event_id == event_id)
    }
}
