use crate::model::{ConfirmableItem, ItemId};

pub const DEFAULT_INVALID_ID_MESSAGE: &str = "Cannot confirm: Invalid item ID";
pub const DEFAULT_BULK_CONFIRM_MESSAGE: &str =
    "Are you sure you want to confirm all items? This action cannot be undone.";

/// Per-call settings for a single confirmation.
///
/// Identity and name lookups default to the item's own
/// [`ConfirmableItem`] implementation and can be overridden per call.
pub struct ConfirmOptions<I> {
    pub item_id: fn(&I) -> Option<ItemId>,
    pub item_name: fn(&I) -> String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub invalid_id_message: String,
}

impl<I: ConfirmableItem> Default for ConfirmOptions<I> {
    fn default() -> Self {
        Self {
            item_id: <I as ConfirmableItem>::identity,
            item_name: <I as ConfirmableItem>::display_name,
            success_message: None,
            error_message: None,
            invalid_id_message: DEFAULT_INVALID_ID_MESSAGE.to_string(),
        }
    }
}

impl<I> Clone for ConfirmOptions<I> {
    fn clone(&self) -> Self {
        Self {
            item_id: self.item_id,
            item_name: self.item_name,
            success_message: self.success_message.clone(),
            error_message: self.error_message.clone(),
            invalid_id_message: self.invalid_id_message.clone(),
        }
    }
}

impl<I> std::fmt::Debug for ConfirmOptions<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmOptions")
            .field("success_message", &self.success_message)
            .field("error_message", &self.error_message)
            .field("invalid_id_message", &self.invalid_id_message)
            .finish_non_exhaustive()
    }
}

impl<I: ConfirmableItem> ConfirmOptions<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item_id(mut self, item_id: fn(&I) -> Option<ItemId>) -> Self {
        self.item_id = item_id;
        self
    }

    pub fn with_item_name(mut self, item_name: fn(&I) -> String) -> Self {
        self.item_name = item_name;
        self
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_invalid_id_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_id_message = message.into();
        self
    }
}

impl<I> ConfirmOptions<I> {
    pub(crate) fn success_text(&self, item: &I) -> String {
        self.success_message
            .clone()
            .unwrap_or_else(|| format!("{} has been confirmed successfully!", (self.item_name)(item)))
    }

    pub(crate) fn failure_text(&self, cause: &str) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| format!("Failed to confirm: {cause}"))
    }
}

/// Settings for a bulk run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOptions {
    pub require_confirmation: bool,
    pub confirm_message: String,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            require_confirmation: true,
            confirm_message: DEFAULT_BULK_CONFIRM_MESSAGE.to_string(),
        }
    }
}

impl BulkOptions {
    pub fn with_confirm_message(mut self, message: impl Into<String>) -> Self {
        self.confirm_message = message.into();
        self
    }

    /// For callers that already obtained assent some other way.
    pub fn without_prompt(mut self) -> Self {
        self.require_confirmation = false;
        self
    }
}

/// What kind of decision the confirmation surface is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationKind {
    Student,
    StudentReject,
    MedicalRequest,
    MedicalRequestReject,
    MedicationSchedule,
    EventSignup,
    EventSignupReject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    Blue,
    Purple,
    Red,
}

/// Copy shown on the confirmation surface before the user commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub warning_note: &'static str,
    pub tone: Tone,
}

impl ConfirmationKind {
    pub fn prompt(self) -> ConfirmationPrompt {
        match self {
            ConfirmationKind::Student => ConfirmationPrompt {
                title: "Confirm Student",
                subtitle: "This will mark the student as confirmed",
                warning_note: "Once confirmed, this student will be marked as verified in the system. This action cannot be undone.",
                tone: Tone::Green,
            },
            ConfirmationKind::StudentReject => ConfirmationPrompt {
                title: "Reject Student",
                subtitle: "This will mark the student as rejected",
                warning_note: "Once rejected, this student will not be verified in the system. This action cannot be undone.",
                tone: Tone::Red,
            },
            ConfirmationKind::MedicalRequest => ConfirmationPrompt {
                title: "Confirm Medical Request",
                subtitle: "This will approve the medical request",
                warning_note: "Once confirmed, this medical request will be approved and processed. This action cannot be undone.",
                tone: Tone::Blue,
            },
            ConfirmationKind::MedicalRequestReject => ConfirmationPrompt {
                title: "Reject Medical Request",
                subtitle: "This will reject the medical request",
                warning_note: "Once rejected, this medical request will not be processed. This action cannot be undone.",
                tone: Tone::Red,
            },
            ConfirmationKind::MedicationSchedule => ConfirmationPrompt {
                title: "Confirm Medication Schedule",
                subtitle: "This will approve the medication schedule",
                warning_note: "Once confirmed, this medication schedule will be active and cannot be undone.",
                tone: Tone::Purple,
            },
            ConfirmationKind::EventSignup => ConfirmationPrompt {
                title: "Confirm Event Signup",
                subtitle: "This will approve the event signup request",
                warning_note: "Once confirmed, the student will be registered for this event. This action cannot be undone.",
                tone: Tone::Blue,
            },
            ConfirmationKind::EventSignupReject => ConfirmationPrompt {
                title: "Reject Event Signup",
                subtitle: "This will reject the event signup request",
                warning_note: "Once rejected, the student will not be registered for this event. This action cannot be undone.",
                tone: Tone::Red,
            },
        }
    }

    /// Default messages for this kind of decision.
    pub fn options<I: ConfirmableItem>(self) -> ConfirmOptions<I> {
        let base = ConfirmOptions::new();
        match self {
            ConfirmationKind::Student => base
                .with_error_message("Failed to confirm student. Please try again.")
                .with_invalid_id_message("Cannot confirm student: Invalid student ID"),
            ConfirmationKind::StudentReject => base
                .with_error_message("Failed to reject student. Please try again.")
                .with_invalid_id_message("Cannot reject student: Invalid student ID"),
            ConfirmationKind::MedicalRequest => base
                .with_error_message("Failed to confirm medical request. Please try again.")
                .with_invalid_id_message("Cannot confirm medical request: Invalid request ID"),
            ConfirmationKind::MedicalRequestReject => base
                .with_error_message("Failed to reject medical request. Please try again.")
                .with_invalid_id_message("Cannot reject medical request: Invalid request ID"),
            ConfirmationKind::MedicationSchedule => base
                .with_error_message("Failed to confirm medication schedule. Please try again.")
                .with_invalid_id_message("Cannot confirm medication schedule: Invalid schedule ID"),
            ConfirmationKind::EventSignup => base
                .with_error_message("Failed to confirm signup")
                .with_invalid_id_message("Cannot confirm signup: Invalid signup ID"),
            ConfirmationKind::EventSignupReject => base
                .with_error_message("Failed to reject signup")
                .with_invalid_id_message("Cannot reject signup: Invalid signup ID"),
        }
    }
}
