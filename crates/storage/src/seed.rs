//! Sample question banks for the built-in test types, used by the demo binary and tests.

use serde_json::{Value, json};

use assess_core::model::{TestTypeId, catalog};

use crate::raw::RawQuestion;
use crate::repository::{InMemoryRepository, StorageError};

fn bank(slug: &str) -> Value {
    match slug {
        "numeric-reasoning" => json!([
            { "id": 101, "type": "multiple-choice", "question": "2, 4, 8, 16, ?",
              "options": ["18", "24", "32", "64"] },
            { "id": 102, "type": "multiple-choice", "question": "15% of 80 is",
              "options": ["8", "12", "15", "20"] },
        ]),
        "word-logic" => json!([
            { "questionId": 1, "questionType": "fill-in-gap", "prompt": "Birds are to flying as fish are to ___" },
            { "questionId": 2, "questionType": "fill-in-gap", "prompt": "She was ___ her dinner when the phone rang" },
        ]),
        "memory" => json!([
            { "question_id": 201, "question_type": "memory_pair", "prompt": "Memorize these pairs",
              "pairs": [["ocean", "wave"], ["forest", "pine"]],
              "missing_slots": { "0": [1], "1": [1] }, "memorize_seconds": 20 },
            { "question_id": 202, "question_type": "memory_triplet", "prompt": "Memorize these triplets",
              "pairs": [["red", "apple", "tree"]],
              "missing_slots": { "0": [0, 2] } },
        ]),
        "mixed" => json!([
            { "Id": 301, "Type": "MultipleChoice", "Question": "Odd one out",
              "Options": ["cat", "dog", "car", "cow"] },
            { "Id": 302, "Type": "FillInGap", "Question": "Hot is to cold as up is to ___" },
            { "Id": 303, "Type": "MemoryPair", "Question": "Memorize the pair",
              "Pairs": [["salt", "pepper"]], "MissingSlots": { "0": [1] }, "MemorizeSeconds": 15 },
        ]),
        _ => json!([]),
    }
}

/// Raw questions for a catalogue slug; empty for unknown slugs.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if a bank does not match the raw shape.
pub fn sample_questions(slug: &str) -> Result<Vec<RawQuestion>, StorageError> {
    serde_json::from_value(bank(slug)).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Load a sample bank for every catalogue test type.
///
/// # Errors
///
/// Returns `StorageError` if a bank cannot be parsed or stored.
pub fn seed_catalog(repo: &InMemoryRepository) -> Result<(), StorageError> {
    for test_type in catalog() {
        let questions = sample_questions(test_type.id().as_str())?;
        repo.insert_questions(TestTypeId::clone(test_type.id()), questions)?;
    }
    Ok(())
}
