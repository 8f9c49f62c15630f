use std::collections::BTreeMap;

use crate::model::question::{QuestionKind, SlotId};

/// A stored response. The variant mirrors the question kind it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Choice { selected_index: usize },
    Text { text: String },
    Slots { values: BTreeMap<SlotId, String> },
}

impl Answer {
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            Answer::Choice { .. } => QuestionKind::MultipleChoice,
            Answer::Text { .. } => QuestionKind::FillInGap,
            Answer::Slots { .. } => QuestionKind::MemoryPair,
        }
    }

    /// Value recorded for a memory slot, if any.
    #[must_use]
    pub fn slot(&self, slot: SlotId) -> Option<&str> {
        match self {
            Answer::Slots { values } => values.get(&slot).map(String::as_str),
            _ => None,
        }
    }
}

/// A single user edit, as raised by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    Select(usize),
    Text(String),
    Slot { slot: SlotId, value: String },
}

impl AnswerInput {
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerInput::Select(_) => QuestionKind::MultipleChoice,
            AnswerInput::Text(_) => QuestionKind::FillInGap,
            AnswerInput::Slot { .. } => QuestionKind::MemoryPair,
        }
    }
}
