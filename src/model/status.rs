use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Normalised meaning of an upstream status string.
///
/// The API is inconsistent about casing and vocabulary (`PENDING` vs
/// `pending`, `APPROVED` for signups but `confirmed` for students), so every
/// status is classified once when it is deserialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Pending,
    Confirmed,
    Rejected,
    Completed,
    Cancelled,
    Unknown,
}

impl StatusKind {
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => StatusKind::Pending,
            "confirmed" | "approved" => StatusKind::Confirmed,
            "rejected" | "denied" | "unconfirmed" => StatusKind::Rejected,
            "completed" | "administered" => StatusKind::Completed,
            "cancelled" => StatusKind::Cancelled,
            _ => StatusKind::Unknown,
        }
    }

    /// Label shown in status badges.
    pub fn display(self) -> &'static str {
        match self {
            StatusKind::Pending => "Pending",
            StatusKind::Confirmed => "Confirmed",
            StatusKind::Rejected => "Rejected",
            StatusKind::Completed => "Completed",
            StatusKind::Cancelled => "Cancelled",
            StatusKind::Unknown => "Unknown",
        }
    }
}

/// A status as received from the API: the raw text is kept verbatim and
/// written back unchanged, comparisons go through [`StatusKind`].
#[derive(Debug, Clone)]
pub struct ItemStatus {
    raw: String,
    kind: StatusKind,
}

impl ItemStatus {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = StatusKind::classify(&raw);
        Self { raw, kind }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn is_pending(&self) -> bool {
        self.kind == StatusKind::Pending
    }

    pub fn is_confirmed(&self) -> bool {
        self.kind == StatusKind::Confirmed
    }

    pub fn is_rejected(&self) -> bool {
        self.kind == StatusKind::Rejected
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self {
            raw: String::new(),
            kind: StatusKind::Unknown,
        }
    }
}

/// Two statuses are equal when they mean the same thing, whatever the casing.
impl PartialEq for ItemStatus {
    fn eq(&self, other: &Self) -> bool {
        match (self.kind, other.kind) {
            (StatusKind::Unknown, StatusKind::Unknown) => self.raw.eq_ignore_ascii_case(&other.raw),
            (a, b) => a == b,
        }
    }
}

impl Eq for ItemStatus {}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ItemStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ItemStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(ItemStatus::from_raw).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_ignores_case() {
        assert_eq!(StatusKind::classify("PENDING"), StatusKind::Pending);
        assert_eq!(StatusKind::classify("pending"), StatusKind::Pending);
        assert_eq!(StatusKind::classify("Approved"), StatusKind::Confirmed);
        assert_eq!(StatusKind::classify("CONFIRMED"), StatusKind::Confirmed);
        assert_eq!(StatusKind::classify("unconfirmed"), StatusKind::Rejected);
        assert_eq!(StatusKind::classify("ADMINISTERED"), StatusKind::Completed);
        assert_eq!(StatusKind::classify("on hold"), StatusKind::Unknown);
    }

    #[test]
    fn raw_text_survives_a_round_trip() {
        let status: ItemStatus = serde_json::from_str("\"APPROVED\"").unwrap();
        assert_eq!(status.raw(), "APPROVED");
        assert!(status.is_confirmed());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"APPROVED\"");
    }

    #[test]
    fn equality_is_semantic() {
        assert_eq!(ItemStatus::from_raw("APPROVED"), ItemStatus::from_raw("confirmed"));
        assert_eq!(ItemStatus::from_raw("PENDING"), ItemStatus::from_raw("pending"));
        assert_ne!(ItemStatus::from_raw("PENDING"), ItemStatus::from_raw("REJECTED"));
        assert_eq!(ItemStatus::from_raw("On Hold"), ItemStatus::from_raw("on hold"));
    }

    #[test]
    fn null_status_is_unknown() {
        let status: ItemStatus = serde_json::from_str("null").unwrap();
        assert_eq!(status.kind(), StatusKind::Unknown);
        assert_eq!(status.kind().display(), "Unknown");
    }
}
