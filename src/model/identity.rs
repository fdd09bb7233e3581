use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use thiserror::Error;

/// Stable identifier of a persisted item.
///
/// The backend hands out positive numeric keys (`studentId`, `signupId`,
/// `requestId`, `scheduleId`). Zero never names a real row, so it is treated
/// the same as a missing id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(NonZeroU64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemIdError {
    #[error("item id is empty")]
    Empty,
    #[error("item id must be non-zero")]
    Zero,
    #[error("item id is not a number: {value}")]
    NotNumeric { value: String },
}

impl ItemId {
    /// Returns `None` for zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Lenient constructor for optional raw keys coming off the wire.
    pub fn from_raw(raw: Option<u64>) -> Option<Self> {
        raw.and_then(Self::new)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for ItemId {
    type Error = ItemIdError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(ItemIdError::Zero)
    }
}

impl FromStr for ItemId {
    type Err = ItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ItemIdError::Empty);
        }
        let raw: u64 = trimmed.parse().map_err(|_| ItemIdError::NotNumeric {
            value: trimmed.to_string(),
        })?;
        Self::try_from(raw)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_an_identity() {
        assert_eq!(ItemId::new(0), None);
        assert_eq!(ItemId::from_raw(Some(0)), None);
        assert_eq!(ItemId::from_raw(None), None);
        assert_eq!(ItemId::try_from(0), Err(ItemIdError::Zero));
    }

    #[test]
    fn parses_text_keys() {
        assert_eq!("101".parse::<ItemId>().unwrap().get(), 101);
        assert_eq!(" 7 ".parse::<ItemId>().unwrap().get(), 7);
        assert_eq!("".parse::<ItemId>(), Err(ItemIdError::Empty));
        assert_eq!("0".parse::<ItemId>(), Err(ItemIdError::Zero));
        assert!(matches!(
            "abc".parse::<ItemId>(),
            Err(ItemIdError::NotNumeric { .. })
        ));
    }

    #[test]
    fn serializes_as_plain_number() {
        let id = ItemId::new(42).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: ItemId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ItemId>("0").is_err());
    }
}
