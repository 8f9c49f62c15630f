use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("multiple choice question needs at least one option")]
    NoOptions,

    #[error("option {index} is blank")]
    BlankOption { index: usize },

    #[error("memory question needs at least one pair")]
    NoPairs,

    #[error("word {word} of pair {pair} is blank")]
    BlankWord { pair: usize, word: usize },

    #[error("memory question has no missing slots")]
    NoMissingSlots,

    #[error("missing slot {slot} is outside the pairs")]
    SlotOutOfRange { slot: SlotId },

    #[error("memorize seconds must be > 0")]
    InvalidMemorizeSeconds,
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// The three question shapes an assessment can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    FillInGap,
    MemoryPair,
}

impl QuestionKind {
    /// Wire name used in submission payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple-choice",
            QuestionKind::FillInGap => "fill-in-gap",
            QuestionKind::MemoryPair => "memory-pair",
        }
    }

    #[must_use]
    pub fn is_memory(self) -> bool {
        matches!(self, QuestionKind::MemoryPair)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SLOTS ─────────────────────────────────────────────────────────────────────
//

/// A missing word position inside a memory question: `(pair index, word index)`.
///
/// Serializes as `"<pair>-<word>"`, which is also the key used in submitted slot maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId {
    pair: usize,
    word: usize,
}

impl SlotId {
    #[must_use]
    pub fn new(pair: usize, word: usize) -> Self {
        Self { pair, word }
    }

    #[must_use]
    pub fn pair(&self) -> usize {
        self.pair
    }

    #[must_use]
    pub fn word(&self) -> usize {
        self.word
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.pair, self.word)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid slot id: {raw}")]
pub struct ParseSlotError {
    raw: String,
}

impl FromStr for SlotId {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSlotError { raw: s.to_string() };
        let (pair, word) = s.trim().split_once('-').ok_or_else(err)?;
        Ok(Self {
            pair: pair.parse().map_err(|_| err())?,
            word: word.parse().map_err(|_| err())?,
        })
    }
}

impl Serialize for SlotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

//
// ─── MEMORY PAYLOAD ────────────────────────────────────────────────────────────
//

/// Word tuples shown during memorization, plus the positions hidden during recall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPairs {
    pairs: Vec<Vec<String>>,
    missing: BTreeSet<SlotId>,
    memorize_seconds: u32,
}

impl MemoryPairs {
    /// Build a validated memory payload.
    ///
    /// `missing` maps a pair index to the word indices hidden in that pair.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if there are no pairs, a word is blank, no slot is
    /// missing, a slot points outside the pairs, or `memorize_seconds` is zero.
    pub fn new(
        pairs: Vec<Vec<String>>,
        missing: &BTreeMap<usize, BTreeSet<usize>>,
        memorize_seconds: u32,
    ) -> Result<Self, QuestionError> {
        if pairs.is_empty() || pairs.iter().any(Vec::is_empty) {
            return Err(QuestionError::NoPairs);
        }
        for (pair, words) in pairs.iter().enumerate() {
            if let Some(word) = words.iter().position(|w| w.trim().is_empty()) {
                return Err(QuestionError::BlankWord { pair, word });
            }
        }
        if memorize_seconds == 0 {
            return Err(QuestionError::InvalidMemorizeSeconds);
        }

        let mut slots = BTreeSet::new();
        for (&pair, words) in missing {
            for &word in words {
                let slot = SlotId::new(pair, word);
                let in_range = pairs.get(pair).is_some_and(|p| word < p.len());
                if !in_range {
                    return Err(QuestionError::SlotOutOfRange { slot });
                }
                slots.insert(slot);
            }
        }
        if slots.is_empty() {
            return Err(QuestionError::NoMissingSlots);
        }

        Ok(Self {
            pairs,
            missing: slots,
            memorize_seconds,
        })
    }

    #[must_use]
    pub fn pairs(&self) -> &[Vec<String>] {
        &self.pairs
    }

    /// Missing slots in `(pair, word)` order.
    pub fn missing_slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.missing.iter().copied()
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.missing.len()
    }

    #[must_use]
    pub fn is_missing(&self, slot: SlotId) -> bool {
        self.missing.contains(&slot)
    }

    #[must_use]
    pub fn memorize_seconds(&self) -> u32 {
        self.memorize_seconds
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionBody {
    MultipleChoice { options: Vec<String> },
    FillInGap,
    MemoryPair(MemoryPairs),
}

/// A canonical, immutable question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    body: QuestionBody,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank or there are no usable options.
    pub fn multiple_choice(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = required_prompt(prompt.into())?;
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::BlankOption { index });
        }
        Ok(Self {
            id,
            prompt,
            body: QuestionBody::MultipleChoice { options },
        })
    }

    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank.
    pub fn fill_in_gap(id: QuestionId, prompt: impl Into<String>) -> Result<Self, QuestionError> {
        Ok(Self {
            id,
            prompt: required_prompt(prompt.into())?,
            body: QuestionBody::FillInGap,
        })
    }

    /// Memory questions may carry an empty prompt; the pairs are the content.
    #[must_use]
    pub fn memory_pair(id: QuestionId, prompt: impl Into<String>, memory: MemoryPairs) -> Self {
        Self {
            id,
            prompt: prompt.into().trim().to_owned(),
            body: QuestionBody::MemoryPair(memory),
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn body(&self) -> &QuestionBody {
        &self.body
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self.body {
            QuestionBody::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            QuestionBody::FillInGap => QuestionKind::FillInGap,
            QuestionBody::MemoryPair(_) => QuestionKind::MemoryPair,
        }
    }

    #[must_use]
    pub fn options(&self) -> Option<&[String]> {
        match &self.body {
            QuestionBody::MultipleChoice { options } => Some(options),
            _ => None,
        }
    }

    #[must_use]
    pub fn memory(&self) -> Option<&MemoryPairs> {
        match &self.body {
            QuestionBody::MemoryPair(memory) => Some(memory),
            _ => None,
        }
    }
}

fn required_prompt(prompt: String) -> Result<String, QuestionError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(QuestionError::EmptyPrompt);
    }
    Ok(trimmed.to_owned())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
