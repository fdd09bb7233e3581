use statig::prelude::*;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn, Instrument};

use super::action::{self, ConfirmationAction};
use super::bulk::{AssentPrompt, BulkConfirmer, BulkOutcome};
use super::options::{BulkOptions, ConfirmOptions};
use super::tracker::InFlightTracker;
use super::{ConfirmationError, SetupError};
use crate::model::{ConfirmableItem, ItemId};
use crate::notify::Notifier;
use crate::observability::create_confirmation_span;
use crate::telemetry::generate_correlation_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The user asked to confirm an item (step 1).
    Request,
    /// The user dismissed the confirmation surface.
    Cancel,
    /// An action started.
    Execute,
    /// An action settled, successfully or not.
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    AwaitingConfirmation,
    Executing,
}

/// Phase bookkeeping for one confirmation surface.
#[derive(Debug, Default)]
pub struct ConfirmationSurface {
    phase: WorkflowPhase,
    running: usize,
}

impl ConfirmationSurface {
    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn running(&self) -> usize {
        self.running
    }

    fn finish_one(&mut self) {
        self.running = self.running.saturating_sub(1);
    }
}

#[state_machine(initial = "State::idle()")]
impl ConfirmationSurface {
    #[state]
    fn idle(&mut self, event: &SurfaceEvent) -> Outcome<State> {
        match event {
            SurfaceEvent::Request => {
                self.phase = WorkflowPhase::AwaitingConfirmation;
                Transition(State::awaiting_confirmation())
            }
            SurfaceEvent::Execute => {
                self.running += 1;
                self.phase = WorkflowPhase::Executing;
                Transition(State::executing())
            }
            SurfaceEvent::Settle => {
                self.finish_one();
                Handled
            }
            SurfaceEvent::Cancel => Handled,
        }
    }

    #[state]
    fn awaiting_confirmation(&mut self, event: &SurfaceEvent) -> Outcome<State> {
        match event {
            // A new request replaces the pending target; nothing is queued.
            SurfaceEvent::Request => Handled,
            SurfaceEvent::Cancel => {
                self.phase = WorkflowPhase::Idle;
                Transition(State::idle())
            }
            SurfaceEvent::Execute => {
                self.running += 1;
                self.phase = WorkflowPhase::Executing;
                Transition(State::executing())
            }
            // Settling closes the surface even if another request was opened.
            SurfaceEvent::Settle => {
                self.finish_one();
                if self.running == 0 {
                    self.phase = WorkflowPhase::Idle;
                    Transition(State::idle())
                } else {
                    self.phase = WorkflowPhase::Executing;
                    Transition(State::executing())
                }
            }
        }
    }

    #[state]
    fn executing(&mut self, event: &SurfaceEvent) -> Outcome<State> {
        match event {
            SurfaceEvent::Request => {
                self.phase = WorkflowPhase::AwaitingConfirmation;
                Transition(State::awaiting_confirmation())
            }
            SurfaceEvent::Execute => {
                self.running += 1;
                Handled
            }
            SurfaceEvent::Settle => {
                self.finish_one();
                if self.running == 0 {
                    self.phase = WorkflowPhase::Idle;
                    Transition(State::idle())
                } else {
                    Handled
                }
            }
            // No mid-flight abort.
            SurfaceEvent::Cancel => Handled,
        }
    }
}

/// Terminal result of one `confirm` call.
#[derive(Debug)]
pub enum ConfirmationOutcome {
    Succeeded {
        id: ItemId,
        message: String,
    },
    Failed {
        id: Option<ItemId>,
        message: String,
        error: ConfirmationError,
    },
}

impl ConfirmationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConfirmationOutcome::Succeeded { .. })
    }

    pub fn id(&self) -> Option<ItemId> {
        match self {
            ConfirmationOutcome::Succeeded { id, .. } => Some(*id),
            ConfirmationOutcome::Failed { id, .. } => *id,
        }
    }

    /// The message that was shown to the user.
    pub fn message(&self) -> &str {
        match self {
            ConfirmationOutcome::Succeeded { message, .. } | ConfirmationOutcome::Failed { message, .. } => message,
        }
    }

    pub fn error(&self) -> Option<&ConfirmationError> {
        match self {
            ConfirmationOutcome::Succeeded { .. } => None,
            ConfirmationOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Two-step confirmation controller for one view.
///
/// Construct one per mounted screen and drop it on teardown. Several
/// workflows (approve and reject, say) can share one [`InFlightTracker`].
pub struct ConfirmationWorkflow<I> {
    action: Arc<dyn ConfirmationAction<I>>,
    tracker: Arc<InFlightTracker>,
    notifier: Arc<dyn Notifier>,
    surface: Mutex<StateMachine<ConfirmationSurface>>,
    pending: Mutex<Option<I>>,
}

impl<I> fmt::Debug for ConfirmationWorkflow<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmationWorkflow")
            .field("phase", &self.phase())
            .field("in_flight", &self.tracker.len())
            .finish_non_exhaustive()
    }
}

/// Settles the surface however `confirm` exits.
struct SettleOnDrop<'a, I> {
    workflow: &'a ConfirmationWorkflow<I>,
}

impl<I> Drop for SettleOnDrop<'_, I> {
    fn drop(&mut self) {
        self.workflow.settle();
    }
}

impl<I> ConfirmationWorkflow<I> {
    pub fn tracker(&self) -> &Arc<InFlightTracker> {
        &self.tracker
    }

    pub fn is_in_flight(&self, id: ItemId) -> bool {
        self.tracker.is_in_flight(id)
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.lock_surface().inner().phase()
    }

    pub fn has_pending(&self) -> bool {
        self.lock_pending().is_some()
    }

    fn lock_surface(&self) -> MutexGuard<'_, StateMachine<ConfirmationSurface>> {
        self.surface.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<I>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dispatch(&self, event: SurfaceEvent) {
        self.lock_surface().handle(&event);
    }

    fn settle(&self) {
        self.dispatch(SurfaceEvent::Settle);
        *self.lock_pending() = None;
    }

    /// Step 1: open the confirmation surface for `item`, replacing any
    /// pending target. No network call.
    pub fn request_confirmation(&self, item: I) {
        *self.lock_pending() = Some(item);
        self.dispatch(SurfaceEvent::Request);
    }

    /// Dismiss the confirmation surface. A no-op when nothing is pending;
    /// has no effect on an action already running.
    pub fn cancel(&self) {
        *self.lock_pending() = None;
        self.dispatch(SurfaceEvent::Cancel);
    }
}

impl<I: Clone> ConfirmationWorkflow<I> {
    pub fn pending_target(&self) -> Option<I> {
        self.lock_pending().clone()
    }
}

impl<I> ConfirmationWorkflow<I>
where
    I: ConfirmableItem,
{
    pub fn new(
        action: Arc<dyn ConfirmationAction<I>>,
        tracker: Arc<InFlightTracker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            action,
            tracker,
            notifier,
            surface: Mutex::new(ConfirmationSurface::default().state_machine()),
            pending: Mutex::new(None),
        }
    }

    /// Step 2: run the action for `item` exactly once.
    ///
    /// Never returns an error: every failure becomes a
    /// [`ConfirmationOutcome::Failed`]. Exactly one notification is emitted.
    /// The identity is never left in flight once this returns.
    pub async fn confirm(&self, item: &I, options: &ConfirmOptions<I>) -> ConfirmationOutcome {
        let correlation_id = generate_correlation_id();

        let Some(id) = (options.item_id)(item) else {
            self.cancel();
            warn!(correlation.id = %correlation_id, "Refusing to confirm item without an identity");
            self.notifier.error(&options.invalid_id_message);
            return ConfirmationOutcome::Failed {
                id: None,
                message: options.invalid_id_message.clone(),
                error: ConfirmationError::InvalidIdentity {
                    message: options.invalid_id_message.clone(),
                },
            };
        };

        let span = create_confirmation_span("confirm", Some(id.get()), &correlation_id);
        async move {
            self.dispatch(SurfaceEvent::Execute);
            let result = {
                let _settle = SettleOnDrop { workflow: self };
                let _in_flight = self.tracker.begin(id);
                action::invoke(self.action.as_ref(), item).await
            };

            match result {
                Ok(()) => {
                    let message = options.success_text(item);
                    info!(item_id = %id, "Confirmation succeeded");
                    self.notifier.success(&message);
                    ConfirmationOutcome::Succeeded { id, message }
                }
                Err(error) => {
                    let message = options.failure_text(&error.cause_message());
                    warn!(item_id = %id, error = %error, "Confirmation failed");
                    self.notifier.error(&message);
                    ConfirmationOutcome::Failed {
                        id: Some(id),
                        message,
                        error,
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Confirms whatever [`request_confirmation`](Self::request_confirmation)
    /// left pending. Returns `None` when nothing is pending.
    pub async fn confirm_pending(&self, options: &ConfirmOptions<I>) -> Option<ConfirmationOutcome>
    where
        I: Clone,
    {
        let item = self.pending_target()?;
        Some(self.confirm(&item, options).await)
    }

    /// Applies this workflow's action to every item, one after another.
    pub async fn confirm_all(
        &self,
        items: &[I],
        options: &BulkOptions,
        prompt: &dyn AssentPrompt,
    ) -> Result<BulkOutcome, SetupError> {
        BulkConfirmer::new(Arc::clone(&self.tracker), Arc::clone(&self.notifier))
            .confirm_all(items, self.action.as_ref(), options, prompt)
            .await
    }
}
