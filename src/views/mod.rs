//! List helpers and the nurse's signup board

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::api::{ApiError, SchoolHealthApi};
use crate::confirmation::{
    AssentPrompt, BulkOptions, BulkOutcome, ConfirmOptions, ConfirmationKind, ConfirmationOutcome,
    ConfirmationWorkflow, DecideSignup, InFlightTracker, SetupError,
};
use crate::model::{ConfirmableItem, EventSignup, HealthEvent, ItemId, ItemStatus, StatusKind};
use crate::notify::Notifier;

pub const NO_PENDING_SIGNUPS_MESSAGE: &str = "No pending signups to confirm";

/// Signups still waiting for a decision, optionally for one event only.
pub fn pending_signups(signups: &[EventSignup], event_id: Option<u64>) -> Vec<&EventSignup> {
    signups
        .iter()
        .filter(|s| s.status.is_pending())
        .filter(|s| event_id.is_none() || s.event_id == event_id)
        .collect()
}

/// Per-status counts shown above a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTally {
    pub pending: usize,
    pub confirmed: usize,
    pub rejected: usize,
    pub other: usize,
}

impl StatusTally {
    pub fn from_items<'a, I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: ConfirmableItem + 'a,
    {
        items.into_iter().fold(Self::default(), |mut tally, item| {
            match item.status().kind() {
                StatusKind::Pending => tally.pending += 1,
                StatusKind::Confirmed => tally.confirmed += 1,
                StatusKind::Rejected => tally.rejected += 1,
                _ => tally.other += 1,
            }
            tally
        })
    }

    pub fn total(&self) -> usize {
        self.pending + self.confirmed + self.rejected + self.other
    }
}

fn student_label(signup: &EventSignup) -> &str {
    signup
        .student_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("student")
}

/// Event signups as a nurse sees them, with approve and reject decisions.
///
/// The local copy of a signup only changes after its action succeeded.
pub struct SignupBoard {
    api: Arc<dyn SchoolHealthApi>,
    notifier: Arc<dyn Notifier>,
    signups: Mutex<Vec<EventSignup>>,
    approve: ConfirmationWorkflow<EventSignup>,
    reject: ConfirmationWorkflow<EventSignup>,
}

impl SignupBoard {
    pub fn new(api: Arc<dyn SchoolHealthApi>, notifier: Arc<dyn Notifier>) -> Self {
        let tracker = InFlightTracker::shared();
        let approve = ConfirmationWorkflow::<EventSignup>::new(
            Arc::new(DecideSignup::approve(Arc::clone(&api))),
            Arc::clone(&tracker),
            Arc::clone(&notifier),
        );
        let reject = ConfirmationWorkflow::<EventSignup>::new(
            Arc::new(DecideSignup::reject(Arc::clone(&api))),
            tracker,
            Arc::clone(&notifier),
        );

        Self {
            api,
            notifier,
            signups: Mutex::new(Vec::new()),
            approve,
            reject,
        }
    }

    pub fn with_signups(self, signups: Vec<EventSignup>) -> Self {
        *self.lock_signups() = signups;
        self
    }

    fn lock_signups(&self) -> MutexGuard<'_, Vec<EventSignup>> {
        self.signups.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn signups(&self) -> Vec<EventSignup> {
        self.lock_signups().clone()
    }

    pub fn find(&self, id: ItemId) -> Option<EventSignup> {
        self.lock_signups().iter().find(|s| s.identity() == Some(id)).cloned()
    }

    pub fn pending(&self, event_id: Option<u64>) -> Vec<EventSignup> {
        pending_signups(&self.lock_signups(), event_id).into_iter().cloned().collect()
    }

    pub fn tally(&self) -> StatusTally {
        StatusTally::from_items(self.lock_signups().iter())
    }

    pub fn is_in_flight(&self, id: ItemId) -> bool {
        self.approve.is_in_flight(id)
    }

    pub fn approve_workflow(&self) -> &ConfirmationWorkflow<EventSignup> {
        &self.approve
    }

    pub fn reject_workflow(&self) -> &ConfirmationWorkflow<EventSignup> {
        &self.reject
    }

    /// Loads the signups of every event. An event whose signups cannot be
    /// fetched is skipped.
    pub async fn load_all(&self) -> Result<usize, ApiError> {
        let events = self.api.list_health_events().await?;
        let mut loaded = Vec::new();

        for event in &events {
            match self.api.list_signups_for_event(event.event_id).await {
                Ok(signups) => loaded.extend(signups.into_iter().map(|s| with_event_title(s, event))),
                Err(error) => warn!(event_id = event.event_id, error = %error, "Skipping event signups"),
            }
        }

        info!(events = events.len(), signups = loaded.len(), "Loaded event signups");
        let count = loaded.len();
        *self.lock_signups() = loaded;
        Ok(count)
    }

    pub async fn load_event(&self, event_id: u64) -> Result<usize, ApiError> {
        let signups = self.api.list_signups_for_event(event_id).await?;
        let count = signups.len();
        *self.lock_signups() = signups;
        Ok(count)
    }

    /// Opens the approval surface for `id`. Returns `false` for an unknown
    /// signup.
    pub fn request_approval(&self, id: ItemId) -> bool {
        match self.find(id) {
            Some(signup) => {
                self.approve.request_confirmation(signup);
                true
            }
            None => false,
        }
    }

    pub fn request_rejection(&self, id: ItemId) -> bool {
        match self.find(id) {
            Some(signup) => {
                self.reject.request_confirmation(signup);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&self) {
        self.approve.cancel();
        self.reject.cancel();
    }

    pub async fn approve(&self, id: ItemId) -> Option<ConfirmationOutcome> {
        let signup = self.find(id)?;
        let options = ConfirmationKind::EventSignup
            .options::<EventSignup>()
            .with_success_message(format!("Event signup confirmed successfully for {}", student_label(&signup)));
        Some(self.decide(&self.approve, &signup, &options, "APPROVED").await)
    }

    pub async fn reject(&self, id: ItemId) -> Option<ConfirmationOutcome> {
        let signup = self.find(id)?;
        let options = ConfirmationKind::EventSignupReject
            .options::<EventSignup>()
            .with_success_message(format!("Event signup rejected for {}", student_label(&signup)));
        Some(self.decide(&self.reject, &signup, &options, "REJECTED").await)
    }

    async fn decide(
        &self,
        workflow: &ConfirmationWorkflow<EventSignup>,
        signup: &EventSignup,
        options: &ConfirmOptions<EventSignup>,
        new_status: &str,
    ) -> ConfirmationOutcome {
        let outcome = workflow.confirm(signup, options).await;
        if let ConfirmationOutcome::Succeeded { id, .. } = &outcome {
            self.set_status(&[*id], new_status);
        }
        outcome
    }

    fn set_status(&self, ids: &[ItemId], status: &str) {
        let mut signups = self.lock_signups();
        for signup in signups.iter_mut() {
            if signup.identity().is_some_and(|id| ids.contains(&id)) {
                signup.set_status(ItemStatus::from_raw(status));
            }
        }
    }

    /// Approves every pending signup, optionally for one event only.
    pub async fn approve_all_pending(
        &self,
        event: Option<&HealthEvent>,
        prompt: &dyn AssentPrompt,
        require_confirmation: bool,
    ) -> Result<BulkOutcome, SetupError> {
        let pending = self.pending(event.map(|e| e.event_id));
        if pending.is_empty() {
            self.notifier.error(NO_PENDING_SIGNUPS_MESSAGE);
            return Ok(BulkOutcome::NoOp);
        }

        let scope = event
            .map(|e| format!(" for {}", e.display_title()))
            .unwrap_or_default();
        let options = BulkOptions {
            require_confirmation,
            ..BulkOptions::default()
        }
        .with_confirm_message(format!(
            "Are you sure you want to confirm all {} pending signup(s){scope}? This action cannot be undone.",
            pending.len()
        ));

        let outcome = self.approve.confirm_all(&pending, &options, prompt).await?;
        if let Some(report) = outcome.report() {
            self.set_status(&report.succeeded, "APPROVED");
        }
        Ok(outcome)
    }
}

fn with_event_title(mut signup: EventSignup, event: &HealthEvent) -> EventSignup {
    if signup.event_title.is_none() {
        signup.event_title = Some(event.display_title().to_string());
    }
    if signup.event_id.is_none() {
        signup.event_id = Some(event.event_id);
    }
    signup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockSchoolHealthApi, SignupDecision};
    use crate::confirmation::FixedAssent;
    use crate::model::Student;
    use crate::notify::{NotificationLevel, RecordingNotifier};
    use reqwest::StatusCode;

    fn signup(id: u64, event: u64, status: &str) -> EventSignup {
        EventSignup {
            signup_id: Some(id),
            event_id: Some(event),
            event_title: None,
            student_id: None,
            student_name: Some(format!("Student {id}")),
            student_code: None,
            status: ItemStatus::from_raw(status),
            signup_date: None,
        }
    }

    fn id(raw: u64) -> ItemId {
        ItemId::new(raw).unwrap()
    }

    #[test]
    fn pending_filter_ignores_case_and_scopes_by_event() {
        let signups = vec![
            signup(1, 10, "PENDING"),
            signup(2, 10, "pending"),
            signup(3, 11, "PENDING"),
            signup(4, 10, "APPROVED"),
        ];

        assert_eq!(pending_signups(&signups, None).len(), 3);
        let for_event: Vec<Option<u64>> = pending_signups(&signups, Some(10)).iter().map(|s| s.signup_id).collect();
        assert_eq!(for_event, vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn pending_filter_agrees_with_tally_on_padded_status() {
        let mut api = MockSchoolHealthApi::new();
        api.expect_update_signup_status().times(1).returning(|_, _| Ok(()));
        let board = SignupBoard::new(Arc::new(api), Arc::new(RecordingNotifier::new()))
            .with_signups(vec![signup(7, 1, "PENDING "), signup(8, 1, " Approved")]);

        assert_eq!(board.tally().pending, 1);
        assert_eq!(board.pending(None).len(), board.tally().pending);

        let outcome = board.approve_all_pending(None, &FixedAssent(true), true).await.unwrap();
        assert_eq!(outcome.success_count(), 1);
        assert!(board.find(id(7)).unwrap().status.is_confirmed());
    }

    #[test]
    fn tally_groups_status_vocabulary() {
        let signups = vec![
            signup(1, 1, "PENDING"),
            signup(2, 1, "APPROVED"),
            signup(3, 1, "REJECTED"),
            signup(4, 1, "CANCELLED"),
        ];
        let tally = StatusTally::from_items(&signups);
        assert_eq!(
            tally,
            StatusTally {
                pending: 1,
                confirmed: 1,
                rejected: 1,
                other: 1
            }
        );
        assert_eq!(tally.total(), 4);

        let students: Vec<Student> = Vec::new();
        assert_eq!(StatusTally::from_items(&students).total(), 0);
    }

    #[tokio::test]
    async fn approval_updates_local_status_only_on_success() {
        let mut api = MockSchoolHealthApi::new();
        api.expect_update_signup_status()
            .returning(|signup_id, _| match signup_id.get() {
                1 => Ok(()),
                _ => Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "HTTP error! status: 500".to_string(),
                }),
            });
        let notifier = Arc::new(RecordingNotifier::new());
        let board = SignupBoard::new(Arc::new(api), notifier.clone())
            .with_signups(vec![signup(1, 1, "PENDING"), signup(2, 1, "PENDING")]);

        let ok = board.approve(id(1)).await.unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.message(), "Event signup confirmed successfully for Student 1");

        let failed = board.approve(id(2)).await.unwrap();
        assert_eq!(failed.message(), "Failed to confirm signup");

        assert!(board.find(id(1)).unwrap().status.is_confirmed());
        assert!(board.find(id(2)).unwrap().status.is_pending());
        assert!(board.approve(id(99)).await.is_none());
        assert_eq!(notifier.notifications().len(), 2);
    }

    #[tokio::test]
    async fn rejection_marks_rejected() {
        let mut api = MockSchoolHealthApi::new();
        api.expect_update_signup_status()
            .withf(|_, decision| *decision == SignupDecision::Rejected)
            .times(1)
            .returning(|_, _| Ok(()));
        let board = SignupBoard::new(Arc::new(api), Arc::new(RecordingNotifier::new()))
            .with_signups(vec![signup(4, 1, "PENDING")]);

        assert!(board.request_rejection(id(4)));
        assert_eq!(board.reject_workflow().phase(), crate::confirmation::WorkflowPhase::AwaitingConfirmation);
        let outcome = board.reject(id(4)).await.unwrap();
        assert_eq!(outcome.message(), "Event signup rejected for Student 4");
        assert_eq!(board.find(id(4)).unwrap().status.raw(), "REJECTED");
    }

    #[tokio::test]
    async fn approve_all_with_nothing_pending_reports_it() {
        let api = MockSchoolHealthApi::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let board = SignupBoard::new(Arc::new(api), notifier.clone()).with_signups(vec![signup(1, 1, "APPROVED")]);

        let outcome = board.approve_all_pending(None, &FixedAssent(true), true).await.unwrap();
        assert!(matches!(outcome, BulkOutcome::NoOp));
        assert_eq!(notifier.messages(NotificationLevel::Error), vec![NO_PENDING_SIGNUPS_MESSAGE]);
    }

    #[tokio::test]
    async fn load_all_skips_failing_events_and_fills_titles() {
        let mut api = MockSchoolHealthApi::new();
        api.expect_list_health_events().times(1).returning(|| {
            Ok(vec![
                HealthEvent {
                    event_id: 1,
                    title: Some("Flu shots".to_string()),
                    description: None,
                    category: None,
                    schedule_date: None,
                    created_by: None,
                },
                HealthEvent {
                    event_id: 2,
                    title: None,
                    description: None,
                    category: None,
                    schedule_date: None,
                    created_by: None,
                },
            ])
        });
        api.expect_list_signups_for_event().returning(|event_id| match event_id {
            1 => Ok(vec![signup(7, 1, "PENDING")]),
            _ => Err(ApiError::InvalidResponse {
                message: "bad payload".to_string(),
            }),
        });

        let board = SignupBoard::new(Arc::new(api), Arc::new(RecordingNotifier::new()));
        assert_eq!(board.load_all().await.unwrap(), 1);
        assert_eq!(board.signups()[0].event_title.as_deref(), Some("Flu shots"));
    }
}
