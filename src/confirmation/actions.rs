//! Confirmation actions backed by the school health API
//!
//! Each action resolves the item's identity and issues exactly one
//! request. An item without an identity is an error, never a request.

use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;

use super::action::ConfirmationAction;
use crate::api::{SchoolHealthApi, ScheduleUpdate, SignupDecision};
use crate::model::{ConfirmableItem, EventSignup, ItemId, MedicationRequest, MedicationSchedule, Student};

fn require_identity<I: ConfirmableItem>(item: &I) -> anyhow::Result<ItemId> {
    item.identity()
        .ok_or_else(|| anyhow!("{} has no identity", item.display_name()))
}

/// Records a nurse's decision on an event signup.
#[derive(Clone)]
pub struct DecideSignup {
    api: Arc<dyn SchoolHealthApi>,
    decision: SignupDecision,
}

impl DecideSignup {
    pub fn approve(api: Arc<dyn SchoolHealthApi>) -> Self {
        Self {
            api,
            decision: SignupDecision::Approved,
        }
    }

    pub fn reject(api: Arc<dyn SchoolHealthApi>) -> Self {
        Self {
            api,
            decision: SignupDecision::Rejected,
        }
    }

    pub fn decision(&self) -> SignupDecision {
        self.decision
    }
}

#[async_trait]
impl ConfirmationAction<EventSignup> for DecideSignup {
    async fn apply(&self, item: &EventSignup) -> anyhow::Result<()> {
        let id = require_identity(item)?;
        self.api.update_signup_status(id, self.decision).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ConfirmStudent {
    api: Arc<dyn SchoolHealthApi>,
}

impl ConfirmStudent {
    pub fn new(api: Arc<dyn SchoolHealthApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ConfirmationAction<Student> for ConfirmStudent {
    async fn apply(&self, item: &Student) -> anyhow::Result<()> {
        let id = require_identity(item)?;
        self.api.confirm_student(id).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct RejectStudent {
    api: Arc<dyn SchoolHealthApi>,
    reason: String,
}

impl RejectStudent {
    pub fn new(api: Arc<dyn SchoolHealthApi>, reason: impl Into<String>) -> Self {
        Self {
            api,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ConfirmationAction<Student> for RejectStudent {
    async fn apply(&self, item: &Student) -> anyhow::Result<()> {
        let id = require_identity(item)?;
        self.api.reject_student(id, &self.reason).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ConfirmMedicationRequest {
    api: Arc<dyn SchoolHealthApi>,
}

impl ConfirmMedicationRequest {
    pub fn new(api: Arc<dyn SchoolHealthApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ConfirmationAction<MedicationRequest> for ConfirmMedicationRequest {
    async fn apply(&self, item: &MedicationRequest) -> anyhow::Result<()> {
        let id = require_identity(item)?;
        self.api.confirm_medication_request(id).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct RejectMedicationRequest {
    api: Arc<dyn SchoolHealthApi>,
    reason: String,
}

impl RejectMedicationRequest {
    pub fn new(api: Arc<dyn SchoolHealthApi>, reason: impl Into<String>) -> Self {
        Self {
            api,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ConfirmationAction<MedicationRequest> for RejectMedicationRequest {
    async fn apply(&self, item: &MedicationRequest) -> anyhow::Result<()> {
        let id = require_identity(item)?;
        self.api.reject_medication_request(id, &self.reason).await?;
        Ok(())
    }
}

/// Confirms a schedule by saving it back unchanged.
///
/// The backend keeps no status on schedules, so this only checks that the
/// schedule still exists and is accepted as-is.
#[derive(Clone)]
pub struct ConfirmMedicationSchedule {
    api: Arc<dyn SchoolHealthApi>,
}

impl ConfirmMedicationSchedule {
    pub fn new(api: Arc<dyn SchoolHealthApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ConfirmationAction<MedicationSchedule> for ConfirmMedicationSchedule {
    async fn apply(&self, item: &MedicationSchedule) -> anyhow::Result<()> {
        let id = require_identity(item)?;
        self.api
            .update_medication_schedule(id, ScheduleUpdate::from(item))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockSchoolHealthApi};
    use crate::model::ItemStatus;
    use mockall::predicate::eq;
    use reqwest::StatusCode;

    fn signup(id: Option<u64>) -> EventSignup {
        EventSignup {
            signup_id: id,
            event_id: Some(3),
            event_title: None,
            student_id: Some(40),
            student_name: Some("Mai".to_string()),
            student_code: None,
            status: ItemStatus::from_raw("PENDING"),
            signup_date: None,
        }
    }

    fn request(id: Option<u64>) -> MedicationRequest {
        MedicationRequest {
            request_id: id,
            student_id: Some(40),
            student_name: Some("Mai".to_string()),
            medication_name: Some("Ventolin".to_string()),
            dosage: None,
            frequency: None,
            confirmation_status: ItemStatus::from_raw("PENDING"),
            unconfirm_reason: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn approve_signup_sends_approved_status() {
        let mut api = MockSchoolHealthApi::new();
        api.expect_update_signup_status()
            .with(eq(ItemId::new(101).unwrap()), eq(SignupDecision::Approved))
            .times(1)
            .returning(|_, _| Ok(()));

        let action = DecideSignup::approve(Arc::new(api));
        tokio_test::assert_ok!(action.apply(&signup(Some(101))).await);
    }

    #[tokio::test]
    async fn reject_signup_surfaces_backend_message() {
        let mut api = MockSchoolHealthApi::new();
        api.expect_update_signup_status()
            .with(eq(ItemId::new(5).unwrap()), eq(SignupDecision::Rejected))
            .times(1)
            .returning(|_, _| {
                Err(ApiError::Status {
                    status: StatusCode::CONFLICT,
                    message: "Signup already processed".to_string(),
                })
            });

        let action = DecideSignup::reject(Arc::new(api));
        let err = action.apply(&signup(Some(5))).await.unwrap_err();
        assert_eq!(err.to_string(), "Signup already processed");
    }

    #[tokio::test]
    async fn missing_identity_sends_nothing() {
        let mut api = MockSchoolHealthApi::new();
        api.expect_update_signup_status().never();

        let action = DecideSignup::approve(Arc::new(api));
        assert!(action.apply(&signup(None)).await.is_err());
    }

    #[tokio::test]
    async fn reject_medication_request_passes_reason() {
        let mut api = MockSchoolHealthApi::new();
        api.expect_reject_medication_request()
            .withf(|id, reason| id.get() == 12 && reason.to_string() == "Missing prescription")
            .times(1)
            .returning(|_, _| Ok(()));

        let action = RejectMedicationRequest::new(Arc::new(api), "Missing prescription");
        tokio_test::assert_ok!(action.apply(&request(Some(12))).await);
    }

    #[tokio::test]
    async fn confirm_medication_request_hits_confirm_endpoint() {
        let mut api = MockSchoolHealthApi::new();
        api.expect_confirm_medication_request()
            .with(eq(ItemId::new(12).unwrap()))
            .times(1)
            .returning(|_| Ok(()));

        let action = ConfirmMedicationRequest::new(Arc::new(api));
        tokio_test::assert_ok!(action.apply(&request(Some(12))).await);
    }

    #[tokio::test]
    async fn student_actions_use_their_endpoints() {
        let student = Student {
            student_id: Some(9),
            student_code: Some("HS009".to_string()),
            full_name: None,
            class_name: None,
            date_of_birth: None,
            confirmation_status: ItemStatus::from_raw("PENDING"),
        };

        let mut api = MockSchoolHealthApi::new();
        api.expect_confirm_student().times(1).returning(|_| Ok(()));
        api.expect_reject_student()
            .withf(|id, reason| id.get() == 9 && reason.to_string() == "Duplicate record")
            .times(1)
            .returning(|_, _| Ok(()));
        let api: Arc<dyn SchoolHealthApi> = Arc::new(api);

        tokio_test::assert_ok!(ConfirmStudent::new(api.clone()).apply(&student).await);
        tokio_test::assert_ok!(RejectStudent::new(api, "Duplicate record").apply(&student).await);
    }

    #[tokio::test]
    async fn schedule_confirmation_resubmits_fields() {
        let schedule = MedicationSchedule {
            schedule_id: Some(31),
            student_id: Some(40),
            student_name: Some("Mai".to_string()),
            request_id: Some(12),
            medication_name: Some("Ventolin".to_string()),
            scheduled_date: None,
            scheduled_time: None,
            notes: Some("after lunch".to_string()),
            administered_by: None,
            dispensed_quantity: Some(2),
            status: ItemStatus::from_raw("PENDING"),
        };

        let mut api = MockSchoolHealthApi::new();
        api.expect_update_medication_schedule()
            .withf(|id, update| {
                id.get() == 31 && update.request_id == Some(12) && update.notes.as_deref() == Some("after lunch")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let action = ConfirmMedicationSchedule::new(Arc::new(api));
        tokio_test::assert_ok!(action.apply(&schedule).await);
    }
}
