//! Typed endpoints of the school health backend
//!
//! The confirmation workflow only ever talks to the backend through
//! [`SchoolHealthApi`], so tests can swap in `MockSchoolHealthApi` or a
//! wiremock server without touching workflow code.

use async_trait::async_trait;
use serde::Serialize;

use super::{ApiClient, ApiError};
use crate::model::{EventSignup, HealthEvent, ItemId, MedicationRequest, MedicationSchedule, Student};

#[cfg(test)]
use mockall::automock;

/// Decision a nurse can record on an event signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupDecision {
    Approved,
    Rejected,
}

impl SignupDecision {
    /// Wire value of the `status` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SignupDecision::Approved => "APPROVED",
            SignupDecision::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Serialize)]
struct ReasonBody<'a> {
    reason: &'a str,
}

/// Body accepted by `PUT /api/schedules/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    pub request_id: Option<u64>,
    pub scheduled_date: Option<chrono::NaiveDate>,
    pub scheduled_time: Option<chrono::NaiveTime>,
    pub notes: Option<String>,
}

impl From<&MedicationSchedule> for ScheduleUpdate {
    fn from(schedule: &MedicationSchedule) -> Self {
        Self {
            request_id: schedule.request_id,
            scheduled_date: schedule.scheduled_date,
            scheduled_time: schedule.scheduled_time,
            notes: schedule.notes.clone(),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SchoolHealthApi: Send + Sync {
    async fn list_health_events(&self) -> Result<Vec<HealthEvent>, ApiError>;

    async fn list_signups_for_event(&self, event_id: u64) -> Result<Vec<EventSignup>, ApiError>;

    async fn list_my_signups(&self) -> Result<Vec<EventSignup>, ApiError>;

    async fn update_signup_status(&self, signup_id: ItemId, decision: SignupDecision) -> Result<(), ApiError>;

    async fn list_students(&self) -> Result<Vec<Student>, ApiError>;

    async fn confirm_student(&self, student_id: ItemId) -> Result<(), ApiError>;

    async fn reject_student(&self, student_id: ItemId, reason: &str) -> Result<(), ApiError>;

    async fn list_medication_requests(&self) -> Result<Vec<MedicationRequest>, ApiError>;

    async fn list_pending_medication_requests(&self) -> Result<Vec<MedicationRequest>, ApiError>;

    async fn confirm_medication_request(&self, request_id: ItemId) -> Result<(), ApiError>;

    async fn reject_medication_request(&self, request_id: ItemId, reason: &str) -> Result<(), ApiError>;

    async fn list_medication_schedules(&self) -> Result<Vec<MedicationSchedule>, ApiError>;

    async fn update_medication_schedule(&self, schedule_id: ItemId, update: ScheduleUpdate) -> Result<(), ApiError>;
}

#[async_trait]
impl SchoolHealthApi for ApiClient {
    async fn list_health_events(&self) -> Result<Vec<HealthEvent>, ApiError> {
        self.get_json("/api/health-events").await
    }

    async fn list_signups_for_event(&self, event_id: u64) -> Result<Vec<EventSignup>, ApiError> {
        self.get_json(&format!("/api/event-signups/event/{event_id}")).await
    }

    async fn list_my_signups(&self) -> Result<Vec<EventSignup>, ApiError> {
        self.get_json("/api/event-signups/my").await
    }

    async fn update_signup_status(&self, signup_id: ItemId, decision: SignupDecision) -> Result<(), ApiError> {
        self.put::<()>(
            &format!("/api/event-signups/{signup_id}/status"),
            &[("status", decision.as_str())],
            None,
        )
        .await
    }

    async fn list_students(&self) -> Result<Vec<Student>, ApiError> {
        self.get_json("/api/students").await
    }

    async fn confirm_student(&self, student_id: ItemId) -> Result<(), ApiError> {
        self.put::<()>(&format!("/api/students/{student_id}/confirm"), &[], None)
            .await
    }

    async fn reject_student(&self, student_id: ItemId, reason: &str) -> Result<(), ApiError> {
        self.put(
            &format!("/api/students/{student_id}/reject"),
            &[],
            Some(&ReasonBody { reason }),
        )
        .await
    }

    async fn list_medication_requests(&self) -> Result<Vec<MedicationRequest>, ApiError> {
        self.get_json("/api/medications/nurse/all").await
    }

    async fn list_pending_medication_requests(&self) -> Result<Vec<MedicationRequest>, ApiError> {
        self.get_json("/api/medications/nurse/pending").await
    }

    async fn confirm_medication_request(&self, request_id: ItemId) -> Result<(), ApiError> {
        self.put::<()>(&format!("/api/medications/nurse/confirm/{request_id}"), &[], None)
            .await
    }

    async fn reject_medication_request(&self, request_id: ItemId, reason: &str) -> Result<(), ApiError> {
        self.put(
            &format!("/api/medications/nurse/unconfirm/{request_id}"),
            &[],
            Some(&ReasonBody { reason }),
        )
        .await
    }

    async fn list_medication_schedules(&self) -> Result<Vec<MedicationSchedule>, ApiError> {
        self.get_json("/api/schedules/nurse/all").await
    }

    async fn update_medication_schedule(&self, schedule_id: ItemId, update: ScheduleUpdate) -> Result<(), ApiError> {
        self.put(&format!("/api/schedules/{schedule_id}"), &[], Some(&update))
            .await
    }
}
