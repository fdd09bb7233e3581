use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Status { status: StatusCode, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid response from API: {message}")]
    InvalidResponse { message: String },
    #[error("Invalid API base URL '{url}'")]
    InvalidBaseUrl { url: String },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }

    /// Builds the error for a failed response, preferring the message the
    /// backend put in its error body.
    pub(crate) fn from_response_body(status: StatusCode, body: &str) -> Self {
        let message = extract_backend_message(body)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
        ApiError::Status { status, message }
    }
}

fn extract_backend_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }
    Some(trimmed.to_string())
}
