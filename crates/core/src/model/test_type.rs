use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::TestTypeId;

/// Family a test type belongs to. Decides whether questions may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestMode {
    Numeric,
    Verbal,
    Memory,
    Mixed,
}

impl TestMode {
    /// Memory and mixed tests refuse a normal finish while any question is unanswered.
    #[must_use]
    pub fn requires_all_answered(self) -> bool {
        matches!(self, TestMode::Memory | TestMode::Mixed)
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestMode::Numeric => "numeric",
            TestMode::Verbal => "verbal",
            TestMode::Memory => "memory",
            TestMode::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// A test the backend can serve questions for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestType {
    id: TestTypeId,
    name: String,
    mode: TestMode,
}

impl TestType {
    #[must_use]
    pub fn new(id: TestTypeId, name: impl Into<String>, mode: TestMode) -> Self {
        Self {
            id,
            name: name.into(),
            mode,
        }
    }

    #[must_use]
    pub fn id(&self) -> &TestTypeId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mode(&self) -> TestMode {
        self.mode
    }

    /// Look a test type up in the built-in catalogue by slug.
    #[must_use]
    pub fn lookup(slug: &str) -> Option<Self> {
        catalog().into_iter().find(|t| t.id.as_str() == slug)
    }
}

/// Built-in test types served by the assessment backend.
#[must_use]
pub fn catalog() -> Vec<TestType> {
    [
        ("numeric-reasoning", "Numeric Reasoning", TestMode::Numeric),
        ("word-logic", "Word Logic", TestMode::Verbal),
        ("memory", "Memory", TestMode::Memory),
        ("mixed", "Mixed", TestMode::Mixed),
    ]
    .into_iter()
    .filter_map(|(slug, name, mode)| {
        TestTypeId::new(slug)
            .ok()
            .map(|id| TestType::new(id, name, mode))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_policy_follows_mode() {
        assert!(!TestMode::Numeric.requires_all_answered());
        assert!(!TestMode::Verbal.requires_all_answered());
        assert!(TestMode::Memory.requires_all_answered());
        assert!(TestMode::Mixed.requires_all_answered());
    }

    #[test]
    fn catalogue_lookup_finds_word_logic() {
        let t = TestType::lookup("word-logic").unwrap();
        assert_eq!(t.mode(), TestMode::Verbal);
        assert_eq!(t.name(), "Word Logic");
        assert!(TestType::lookup("astrology").is_none());
        assert_eq!(catalog().len(), 4);
    }
}
