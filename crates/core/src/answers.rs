use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::model::{Answer, AnswerInput, Question, QuestionBody, QuestionKind, SlotId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("a {got} answer cannot be given to a {expected} question")]
    KindMismatch {
        expected: QuestionKind,
        got: QuestionKind,
    },

    #[error("option {index} does not exist (question has {len})")]
    OptionOutOfRange { index: usize, len: usize },

    #[error("slot {slot} is not a missing slot of this question")]
    UnknownSlot { slot: SlotId },
}

/// Whether `answer` fully answers `question`.
///
/// - multiple choice: the selected index is a valid option
/// - fill in gap: the trimmed text is non-empty
/// - memory pair: every missing slot holds a non-blank value
#[must_use]
pub fn is_answer_complete(question: &Question, answer: Option<&Answer>) -> bool {
    match (question.body(), answer) {
        (QuestionBody::MultipleChoice { options }, Some(Answer::Choice { selected_index })) => {
            *selected_index < options.len()
        }
        (QuestionBody::FillInGap, Some(Answer::Text { text })) => !text.trim().is_empty(),
        (QuestionBody::MemoryPair(memory), Some(Answer::Slots { values })) => memory
            .missing_slots()
            .all(|slot| values.get(&slot).is_some_and(|v| !v.trim().is_empty())),
        _ => false,
    }
}

/// Answers for one attempt, keyed by question index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: BTreeMap<usize, Answer>,
}

impl AnswerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is stored at `index`. No merge happens, even for slot answers.
    pub fn set(&mut self, index: usize, answer: Answer) -> Option<Answer> {
        self.answers.insert(index, answer)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Answer> {
        self.answers.get(&index)
    }

    /// Validate a user edit against `question` and store it.
    ///
    /// Slot edits merge into the existing slot map of the same question; every other
    /// edit overwrites.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError` when the edit does not fit the question.
    pub fn apply(
        &mut self,
        index: usize,
        question: &Question,
        input: AnswerInput,
    ) -> Result<&Answer, AnswerError> {
        let expected = question.kind();
        if input.kind() != expected {
            return Err(AnswerError::KindMismatch {
                expected,
                got: input.kind(),
            });
        }

        let answer = match (question.body(), input) {
            (QuestionBody::MultipleChoice { options }, AnswerInput::Select(selected_index)) => {
                if selected_index >= options.len() {
                    return Err(AnswerError::OptionOutOfRange {
                        index: selected_index,
                        len: options.len(),
                    });
                }
                Answer::Choice { selected_index }
            }
            (QuestionBody::FillInGap, AnswerInput::Text(text)) => Answer::Text { text },
            (QuestionBody::MemoryPair(memory), AnswerInput::Slot { slot, value }) => {
                if !memory.is_missing(slot) {
                    return Err(AnswerError::UnknownSlot { slot });
                }
                let mut values = match self.answers.remove(&index) {
                    Some(Answer::Slots { values }) => values,
                    _ => BTreeMap::new(),
                };
                values.insert(slot, value);
                Answer::Slots { values }
            }
            (_, input) => {
                return Err(AnswerError::KindMismatch {
                    expected,
                    got: input.kind(),
                });
            }
        };

        match self.answers.entry(index) {
            Entry::Occupied(mut entry) => {
                entry.insert(answer);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(answer)),
        }
    }

    #[must_use]
    pub fn is_complete(&self, index: usize, question: &Question) -> bool {
        is_answer_complete(question, self.get(index))
    }

    #[must_use]
    pub fn all_complete(&self, questions: &[Question]) -> bool {
        self.all_complete_except(questions, &BTreeSet::new())
    }

    /// Like `all_complete`, ignoring the indices in `exempt`.
    #[must_use]
    pub fn all_complete_except(&self, questions: &[Question], exempt: &BTreeSet<usize>) -> bool {
        questions
            .iter()
            .enumerate()
            .filter(|(index, _)| !exempt.contains(index))
            .all(|(index, question)| self.is_complete(index, question))
    }

    /// Number of questions that are fully answered.
    #[must_use]
    pub fn answered_count(&self, questions: &[Question]) -> usize {
        questions
            .iter()
            .enumerate()
            .filter(|(index, question)| self.is_complete(*index, question))
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
