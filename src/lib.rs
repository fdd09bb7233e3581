// School Health Confirmation Engine
// Two-step confirmation of pending school health records against the backend API

pub mod api;
pub mod config;
pub mod confirmation;
pub mod model;
pub mod notify;
pub mod observability;
pub mod telemetry;
pub mod views;

// Re-export key types for easy access
pub use api::{ApiClient, ApiError, SchoolHealthApi, ScheduleUpdate, SignupDecision};
pub use config::{config, init_config, SchoolHealthConfig};
pub use confirmation::{
    AssentPrompt, BulkConfirmer, BulkOptions, BulkOutcome, ConfirmOptions, ConfirmationAction, ConfirmationError,
    ConfirmationKind, ConfirmationOutcome, ConfirmationWorkflow, FixedAssent, InFlightTracker, SetupError,
    WorkflowPhase,
};
pub use model::{
    ConfirmableItem, EventSignup, HealthEvent, ItemId, ItemStatus, MedicationRequest, MedicationSchedule, StatusKind,
    Student,
};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use observability::{create_confirmation_span, ApiMetrics, OperationTimer};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use views::{pending_signups, SignupBoard, StatusTally};
