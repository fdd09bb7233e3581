use thiserror::Error;

/// Why a single confirmation did not go through.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// The item has no usable identity; nothing was sent.
    #[error("{message}")]
    InvalidIdentity { message: String },
    /// The action returned an error.
    #[error("{source}")]
    ActionFailed {
        #[source]
        source: anyhow::Error,
    },
    /// The action panicked, either when called or while it was running.
    #[error("action panicked: {message}")]
    ActionPanicked { message: String },
}

impl ConfirmationError {
    /// Description of the underlying cause, used to build notifications.
    pub fn cause_message(&self) -> String {
        match self {
            ConfirmationError::InvalidIdentity { message } => message.clone(),
            ConfirmationError::ActionFailed { source } => source.to_string(),
            ConfirmationError::ActionPanicked { message } => message.clone(),
        }
    }
}

/// The bulk run itself could not be carried out. Never produced for a
/// per-item failure.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("could not obtain assent for bulk confirmation: {0}")]
    Prompt(#[source] anyhow::Error),
}
