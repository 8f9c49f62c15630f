//! The one place backend question shapes are turned into canonical `Question`s.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use assess_core::model::{MemoryPairs, Question, QuestionError, QuestionId, QuestionKind};

use crate::raw::{RawId, RawQuestion};

/// A backend question that could not be given a canonical shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MalformedQuestion {
    #[error("question at position {position} could not be read: {message}")]
    Unreadable { position: usize, message: String },

    #[error("question at position {position} has no usable id")]
    MissingId { position: usize },

    #[error("question {id}: cannot tell its kind")]
    MissingKind { id: QuestionId },

    #[error("question {id}: unknown kind {kind:?}")]
    UnknownKind { id: QuestionId, kind: String },

    #[error("question {id}: missing slot key {key:?} is not a pair index")]
    BadSlotKey { id: QuestionId, key: String },

    #[error("question {id}: {source}")]
    Invalid {
        id: QuestionId,
        #[source]
        source: QuestionError,
    },
}

/// Outcome of normalizing a whole question list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub questions: Vec<Question>,
    pub dropped: Vec<MalformedQuestion>,
}

/// Normalize every question, dropping the ones that cannot be used.
#[must_use]
pub fn normalize_all(raws: Vec<RawQuestion>, default_memorize_seconds: u32) -> Normalized {
    let mut out = Normalized::default();
    for (position, raw) in raws.into_iter().enumerate() {
        match normalize_question(position, raw, default_memorize_seconds) {
            Ok(question) => out.questions.push(question),
            Err(err) => {
                tracing::warn!(position, error = %err, "dropping malformed question");
                out.dropped.push(err);
            }
        }
    }
    out
}

/// Normalize one backend question.
///
/// A missing kind is inferred from the payload (pairs → memory, options → multiple
/// choice). A missing memorization time falls back to `default_memorize_seconds`.
///
/// # Errors
///
/// Returns `MalformedQuestion` when no canonical shape can be resolved.
pub fn normalize_question(
    position: usize,
    raw: RawQuestion,
    default_memorize_seconds: u32,
) -> Result<Question, MalformedQuestion> {
    if let Some(message) = raw.unreadable {
        return Err(MalformedQuestion::Unreadable { position, message });
    }

    let id = raw
        .id
        .as_ref()
        .and_then(parse_id)
        .ok_or(MalformedQuestion::MissingId { position })?;

    let kind = match raw.kind.as_deref() {
        Some(name) => parse_kind(name).ok_or_else(|| MalformedQuestion::UnknownKind {
            id,
            kind: name.to_string(),
        })?,
        None if raw.pairs.is_some() => QuestionKind::MemoryPair,
        None if raw.options.is_some() => QuestionKind::MultipleChoice,
        None => return Err(MalformedQuestion::MissingKind { id }),
    };

    let invalid = |source| MalformedQuestion::Invalid { id, source };
    let prompt = raw.prompt.unwrap_or_default();

    match kind {
        QuestionKind::MultipleChoice => {
            Question::multiple_choice(id, prompt, raw.options.unwrap_or_default()).map_err(invalid)
        }
        QuestionKind::FillInGap => Question::fill_in_gap(id, prompt).map_err(invalid),
        QuestionKind::MemoryPair => {
            let missing = parse_missing(id, raw.missing_slots.unwrap_or_default())?;
            let memory = MemoryPairs::new(
                raw.pairs.unwrap_or_default(),
                &missing,
                raw.memorize_seconds.unwrap_or(default_memorize_seconds),
            )
            .map_err(invalid)?;
            Ok(Question::memory_pair(id, prompt, memory))
        }
    }
}

fn parse_id(raw: &RawId) -> Option<QuestionId> {
    match raw {
        RawId::Number(n) => Some(QuestionId::new(*n)),
        RawId::Text(s) => s.parse().ok(),
    }
}

fn parse_kind(name: &str) -> Option<QuestionKind> {
    let folded: String = name
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    match folded.as_str() {
        "multiplechoice" | "mcq" | "choice" | "single" | "numeric" => {
            Some(QuestionKind::MultipleChoice)
        }
        "fillingap" | "fillinthegap" | "fillgap" | "gap" | "verbal" => {
            Some(QuestionKind::FillInGap)
        }
        "memorypair" | "memorypairs" | "memory" | "pair" | "pairs" | "memorytriplet"
        | "triplet" => Some(QuestionKind::MemoryPair),
        _ => None,
    }
}

fn parse_missing(
    id: QuestionId,
    raw: BTreeMap<String, Vec<usize>>,
) -> Result<BTreeMap<usize, BTreeSet<usize>>, MalformedQuestion> {
    raw.into_iter()
        .map(|(key, words)| {
            let pair = key
                .trim()
                .parse::<usize>()
                .map_err(|_| MalformedQuestion::BadSlotKey { id, key })?;
            Ok((pair, words.into_iter().collect()))
        })
        .collect()
}
