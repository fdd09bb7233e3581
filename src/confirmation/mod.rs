//! Two-step confirmation of pending records
//!
//! A [`ConfirmationWorkflow`] opens a confirmation surface for one item,
//! runs its [`ConfirmationAction`] once the user commits, and reports the
//! result through a [`Notifier`](crate::notify::Notifier). Bulk runs go
//! through [`BulkConfirmer`] and share the same in-flight markers.

pub mod action;
pub mod actions;
pub mod bulk;
pub mod errors;
pub mod options;
pub mod tracker;
pub mod workflow;

pub use action::{invoke, ConfirmationAction};
pub use actions::{
    ConfirmMedicationRequest, ConfirmMedicationSchedule, ConfirmStudent, DecideSignup, RejectMedicationRequest,
    RejectStudent,
};
pub use bulk::{AssentPrompt, BulkConfirmer, BulkFailure, BulkOutcome, BulkReport, FixedAssent};
pub use errors::{ConfirmationError, SetupError};
pub use options::{BulkOptions, ConfirmOptions, ConfirmationKind, ConfirmationPrompt, Tone};
pub use tracker::{InFlightGuard, InFlightTracker};
pub use workflow::{ConfirmationOutcome, ConfirmationSurface, ConfirmationWorkflow, SurfaceEvent, WorkflowPhase};
