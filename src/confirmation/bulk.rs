use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

use super::action::{self, ConfirmationAction};
use super::options::BulkOptions;
use super::tracker::InFlightTracker;
use super::{ConfirmationError, SetupError};
use crate::model::{ConfirmableItem, ItemId};
use crate::notify::Notifier;
use crate::observability::{create_confirmation_span, OperationTimer};
use crate::telemetry::generate_correlation_id;

/// Asks the user a yes/no question before a bulk run.
#[async_trait]
pub trait AssentPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> anyhow::Result<bool>;
}

/// Always answers the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAssent(pub bool);

#[async_trait]
impl AssentPrompt for FixedAssent {
    async fn confirm(&self, _message: &str) -> anyhow::Result<bool> {
        Ok(self.0)
    }
}

#[derive(Debug)]
pub struct BulkFailure {
    pub id: Option<ItemId>,
    pub error: ConfirmationError,
}

#[derive(Debug, Default)]
pub struct BulkReport {
    pub succeeded: Vec<ItemId>,
    pub failures: Vec<BulkFailure>,
}

impl BulkReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug)]
pub enum BulkOutcome {
    /// The user declined; nothing ran.
    Cancelled,
    /// Empty input; nothing ran and nothing was shown.
    NoOp,
    Completed(BulkReport),
}

impl BulkOutcome {
    pub fn success_count(&self) -> usize {
        match self {
            BulkOutcome::Completed(report) => report.success_count(),
            _ => 0,
        }
    }

    pub fn failure_count(&self) -> usize {
        match self {
            BulkOutcome::Completed(report) => report.failure_count(),
            _ => 0,
        }
    }

    pub fn report(&self) -> Option<&BulkReport> {
        match self {
            BulkOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

pub fn bulk_success_message(count: usize) -> String {
    format!("Successfully confirmed {count} items!")
}

pub fn bulk_failure_message(count: usize) -> String {
    format!("{count} confirmations failed. Please check individual item statuses.")
}

/// Runs one action over a list of items, strictly one at a time.
pub struct BulkConfirmer {
    tracker: Arc<InFlightTracker>,
    notifier: Arc<dyn Notifier>,
}

impl BulkConfirmer {
    pub fn new(tracker: Arc<InFlightTracker>, notifier: Arc<dyn Notifier>) -> Self {
        Self { tracker, notifier }
    }

    /// Asks for assent once, then applies `action` to each item in order.
    ///
    /// Per-item failures are counted, never propagated. Only a failing
    /// prompt yields `Err`.
    pub async fn confirm_all<I, A>(
        &self,
        items: &[I],
        action: &A,
        options: &BulkOptions,
        prompt: &dyn AssentPrompt,
    ) -> Result<BulkOutcome, SetupError>
    where
        I: ConfirmableItem,
        A: ConfirmationAction<I> + ?Sized,
    {
        if items.is_empty() {
            return Ok(BulkOutcome::NoOp);
        }

        if options.require_confirmation && !prompt.confirm(&options.confirm_message).await.map_err(SetupError::Prompt)? {
            info!(items = items.len(), "Bulk confirmation declined");
            return Ok(BulkOutcome::Cancelled);
        }

        let correlation_id = generate_correlation_id();
        let span = create_confirmation_span("confirm_all", None, &correlation_id);
        async move {
            let timer = OperationTimer::new("confirm_all");
            let mut report = BulkReport::default();

            for item in items {
                let Some(id) = item.identity() else {
                    warn!(item = %item.display_name(), "Skipping item without an identity");
                    report.failures.push(BulkFailure {
                        id: None,
                        error: ConfirmationError::InvalidIdentity {
                            message: format!("{} has no identity", item.display_name()),
                        },
                    });
                    continue;
                };

                let result = {
                    let _in_flight = self.tracker.begin(id);
                    action::invoke(action, item).await
                };
                match result {
                    Ok(()) => report.succeeded.push(id),
                    Err(error) => {
                        warn!(item_id = %id, error = %error, "Bulk item failed");
                        report.failures.push(BulkFailure { id: Some(id), error });
                    }
                }
            }

            timer.finish();
            info!(
                succeeded = report.success_count(),
                failed = report.failure_count(),
                "Bulk confirmation finished"
            );

            if report.success_count() > 0 {
                self.notifier.success(&bulk_success_message(report.success_count()));
            }
            if report.failure_count() > 0 {
                self.notifier.error(&bulk_failure_message(report.failure_count()));
            }

            Ok(BulkOutcome::Completed(report))
        }
        .instrument(span)
        .await
    }
}
