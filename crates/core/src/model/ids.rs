use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a Question, as assigned by the backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u64);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Slug identifying a test type, e.g. `word-logic`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TestTypeId(String);

impl TestTypeId {
    /// Creates a new `TestTypeId` from a non-blank slug.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the slug is blank or contains whitespace or `/`.
    pub fn new(slug: impl Into<String>) -> Result<Self, ParseIdError> {
        let slug = slug.into();
        let trimmed = slug.trim();
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) || trimmed.contains('/') {
            return Err(ParseIdError {
                kind: "TestTypeId".to_string(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TestTypeId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TestTypeId> for String {
    fn from(value: TestTypeId) -> Self {
        value.0
    }
}

/// Correlation id for a single attempt. Never sent to the backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Debug for TestTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TestTypeId({})", self.0)
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TestTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(QuestionId::new)
            .map_err(|_| ParseIdError {
                kind: "QuestionId".to_string(),
            })
    }
}

impl FromStr for TestTypeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_id_display() {
        let id = QuestionId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_question_id_from_str() {
        let id: QuestionId = " 123 ".parse().unwrap();
        assert_eq!(id, QuestionId::new(123));
    }

    #[test]
    fn test_question_id_from_str_invalid() {
        assert!("not-a-number".parse::<QuestionId>().is_err());
    }

    #[test]
    fn test_type_id_trims_and_rejects_blank() {
        let id: TestTypeId = "  word-logic ".parse().unwrap();
        assert_eq!(id.as_str(), "word-logic");
        assert!(TestTypeId::new("   ").is_err());
        assert!(TestTypeId::new("word logic").is_err());
        assert!(TestTypeId::new("a/b").is_err());
    }

    #[test]
    fn test_type_id_serializes_as_plain_string() {
        let id = TestTypeId::new("memory").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"memory\"");
        let back: TestTypeId = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<TestTypeId>("\"\"").is_err());
    }

    #[test]
    fn attempt_ids_are_unique() {
        assert_ne!(AttemptId::new_v4(), AttemptId::new_v4());
    }
}
