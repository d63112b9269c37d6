use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a process-unique identifier.
///
/// A non-empty `prefix` is joined to the random part with a hyphen
/// (`draft-3f2c...`). An empty prefix yields the bare identifier.
#[must_use]
pub fn generate(prefix: &str) -> String {
    let id = Uuid::new_v4();
    if prefix.is_empty() {
        id.to_string()
    } else {
        format!("{prefix}-{id}")
    }
}

/// An opaque, non-empty identifier for a draft or a service log.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(NonEmptyString);

impl RecordId {
    /// Wraps an existing identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdError`] if the string is empty or only whitespace.
    pub fn new(s: String) -> Result<Self, InvalidIdError> {
        if s.trim().is_empty() {
            return Err(InvalidIdError);
        }
        NonEmptyString::new(s).map(Self).map_err(|_| InvalidIdError)
    }

    /// Allocates a fresh identifier with the given prefix.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(NonEmptyString::new(generate(prefix)).expect("generated ids are never empty"))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RecordId {
    type Error = InvalidIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.as_str().to_owned()
    }
}

impl FromStr for RecordId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for RecordId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

/// Error returned when an identifier is blank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("record ids must not be empty")]
pub struct InvalidIdError;

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generate_is_unique() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate("")).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn prefix_is_joined_with_hyphen() {
        assert!(generate("draft").starts_with("draft-"));
        assert!(generate("log").starts_with("log-"));
    }

    #[test]
    fn empty_prefix_has_no_leading_separator() {
        let id = generate("");
        assert!(!id.starts_with('-'));
        assert!(!id.is_empty());
    }

    #[test]
    fn blank_record_id_is_rejected() {
        assert_eq!(RecordId::new(String::new()), Err(InvalidIdError));
        assert_eq!("   ".parse::<RecordId>(), Err(InvalidIdError));
    }

    #[test]
    fn record_id_serializes_as_plain_string() {
        let id: RecordId = "log-1".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"log-1\"");

        let error = serde_json::from_str::<RecordId>("\"\"");
        assert!(error.is_err());
    }
}
