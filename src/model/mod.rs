// Domain types shared by the API client and the confirmation workflow

pub mod identity;
pub mod items;
pub mod status;

pub use identity::{ItemId, ItemIdError};
pub use items::{
    ConfirmableItem, EventSignup, HealthEvent, MedicationRequest, MedicationSchedule, Student,
};
pub use status::{ItemStatus, StatusKind};
