//! Wire payload for the scoring backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::answers::AnswerStore;
use crate::model::{Answer, MemoryPairs, Question, QuestionBody, QuestionId, QuestionKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionValue {
    Index(usize),
    Text(String),
}

/// One submitted answer: `{ "questionId": 1, "kind": "fill-in-gap", "value": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub question_id: QuestionId,
    pub kind: QuestionKind,
    pub value: Option<SubmissionValue>,
}

/// Build the payload: one record per question, in question order.
///
/// - multiple choice: selected index, or null
/// - fill in gap: trimmed text, or null when missing/blank
/// - memory pair: a JSON object string keyed by slot id (`"0-1"`), blanks as `""`
#[must_use]
pub fn format_submission(questions: &[Question], answers: &AnswerStore) -> Vec<SubmissionRecord> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| SubmissionRecord {
            question_id: question.id(),
            kind: question.kind(),
            value: record_value(question, answers.get(index)),
        })
        .collect()
}

fn record_value(question: &Question, answer: Option<&Answer>) -> Option<SubmissionValue> {
    match (question.body(), answer) {
        (QuestionBody::MultipleChoice { options }, Some(Answer::Choice { selected_index })) => {
            (*selected_index < options.len()).then_some(SubmissionValue::Index(*selected_index))
        }
        (QuestionBody::FillInGap, Some(Answer::Text { text })) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| SubmissionValue::Text(trimmed.to_owned()))
        }
        (QuestionBody::MemoryPair(memory), answer) => {
            Some(SubmissionValue::Text(slot_map(memory, answer)))
        }
        _ => None,
    }
}

fn slot_map(memory: &MemoryPairs, answer: Option<&Answer>) -> String {
    let mut map = Map::new();
    for slot in memory.missing_slots() {
        let value = answer
            .and_then(|a| a.slot(slot))
            .map(str::trim)
            .unwrap_or_default();
        map.insert(slot.to_string(), Value::String(value.to_owned()));
    }
    Value::Object(map).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerInput, SlotId};
    use std::collections::{BTreeMap, BTreeSet};

    fn gap(id: u64) -> Question {
        Question::fill_in_gap(QuestionId::new(id), "Fill ___").unwrap()
    }

    fn memory(id: u64) -> Question {
        let pairs = vec![
            vec!["bread".to_string(), "butter".to_string()],
            vec!["fish".to_string(), "chips".to_string()],
        ];
        let missing = BTreeMap::from([(0, BTreeSet::from([1])), (1, BTreeSet::from([0]))]);
        Question::memory_pair(
            QuestionId::new(id),
            "",
            MemoryPairs::new(pairs, &missing, 10).unwrap(),
        )
    }

    #[test]
    fn word_logic_payload_uses_null_for_blank() {
        let questions = vec![gap(1), gap(2)];
        let mut answers = AnswerStore::new();
        answers
            .apply(1, &questions[1], AnswerInput::Text("eating".into()))
            .unwrap();

        let payload = format_submission(&questions, &answers);
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"[{"questionId":1,"kind":"fill-in-gap","value":null},{"questionId":2,"kind":"fill-in-gap","value":"eating"}]"#
        );
    }

    #[test]
    fn whitespace_text_becomes_null_and_text_is_trimmed() {
        let questions = vec![gap(1), gap(2)];
        let mut answers = AnswerStore::new();
        answers.apply(0, &questions[0], AnswerInput::Text("  ".into())).unwrap();
        answers.apply(1, &questions[1], AnswerInput::Text(" run ".into())).unwrap();

        let payload = format_submission(&questions, &answers);
        assert_eq!(payload[0].value, None);
        assert_eq!(payload[1].value, Some(SubmissionValue::Text("run".into())));
    }

    #[test]
    fn memory_record_serializes_every_slot() {
        let questions = vec![memory(7)];
        let mut answers = AnswerStore::new();
        answers
            .apply(
                0,
                &questions[0],
                AnswerInput::Slot { slot: SlotId::new(1, 0), value: "fish".into() },
            )
            .unwrap();

        let payload = format_submission(&questions, &answers);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].kind, QuestionKind::MemoryPair);
        assert_eq!(
            payload[0].value,
            Some(SubmissionValue::Text(r#"{"0-1":"","1-0":"fish"}"#.into()))
        );
    }

    #[test]
    fn order_follows_questions_not_fill_order() {
        let questions = vec![
            Question::multiple_choice(QuestionId::new(10), "Pick", vec!["a".into(), "b".into()])
                .unwrap(),
            gap(11),
            memory(12),
        ];
        let mut answers = AnswerStore::new();
        answers.apply(1, &questions[1], AnswerInput::Text("x".into())).unwrap();
        answers.apply(0, &questions[0], AnswerInput::Select(1)).unwrap();

        let first = format_submission(&questions, &answers);
        let second = format_submission(&questions, &answers);
        assert_eq!(first, second);
        assert_eq!(first.len(), questions.len());

        let ids: Vec<_> = first.iter().map(|r| r.question_id.value()).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert_eq!(first[0].value, Some(SubmissionValue::Index(1)));
    }
}
