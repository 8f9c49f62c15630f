use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Question id as the backend sends it: a number, or a number inside a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{n}"),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

/// A word or option that may arrive as a JSON string, number or boolean.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl From<RawText> for String {
    fn from(raw: RawText) -> Self {
        match raw {
            RawText::Text(s) => s,
            RawText::Number(n) => n.to_string(),
            RawText::Bool(b) => b.to_string(),
        }
    }
}

/// A question exactly as the backend delivers it.
///
/// Field names arrive in camelCase, snake_case or PascalCase, and some fields have
/// alternate names (`type` vs `kind`, `question` vs `prompt`). Everything is optional
/// here; `normalize` decides whether the shape is usable.
///
/// Reading never fails for a JSON value: an element that does not fit the shape comes
/// back with `unreadable` set, so one bad element cannot spoil a whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuestion {
    pub id: Option<RawId>,
    pub kind: Option<String>,
    pub prompt: Option<String>,
    pub options: Option<Vec<String>>,
    pub pairs: Option<Vec<Vec<String>>>,
    pub missing_slots: Option<BTreeMap<String, Vec<usize>>>,
    pub memorize_seconds: Option<u32>,
    /// Why the element could not be read.
    pub unreadable: Option<String>,
}

/// Every accepted spelling of each field, canonical name first.
const SPELLINGS: &[&[&str]] = &[
    &["id", "Id", "questionId", "question_id", "QuestionId"],
    &["kind", "Kind", "type", "Type", "questionType", "question_type", "QuestionType"],
    &["prompt", "Prompt", "question", "Question", "text"],
    &["options", "Options", "choices", "Choices"],
    &["pairs", "Pairs", "words", "Words", "triplets"],
    &["missing_slots", "missingSlots", "MissingSlots", "missing", "missingWords", "missing_words"],
    &["memorize_seconds", "memorizeSeconds", "MemorizeSeconds", "memorizeTime", "memorize_time"],
];

#[derive(Deserialize)]
struct Fields {
    #[serde(default, alias = "Id", alias = "questionId", alias = "question_id", alias = "QuestionId")]
    id: Option<RawId>,

    #[serde(
        default,
        alias = "Kind",
        alias = "type",
        alias = "Type",
        alias = "questionType",
        alias = "question_type",
        alias = "QuestionType"
    )]
    kind: Option<String>,

    #[serde(default, alias = "Prompt", alias = "question", alias = "Question", alias = "text")]
    prompt: Option<String>,

    #[serde(default, alias = "Options", alias = "choices", alias = "Choices")]
    options: Option<Vec<RawText>>,

    #[serde(default, alias = "Pairs", alias = "words", alias = "Words", alias = "triplets")]
    pairs: Option<Vec<Vec<RawText>>>,

    #[serde(
        default,
        alias = "missingSlots",
        alias = "MissingSlots",
        alias = "missing",
        alias = "missingWords",
        alias = "missing_words"
    )]
    missing_slots: Option<BTreeMap<String, Vec<usize>>>,

    #[serde(
        default,
        alias = "memorizeSeconds",
        alias = "MemorizeSeconds",
        alias = "memorizeTime",
        alias = "memorize_time"
    )]
    memorize_seconds: Option<u32>,
}

fn texts(raw: Vec<RawText>) -> Vec<String> {
    raw.into_iter().map(String::from).collect()
}

impl From<Fields> for RawQuestion {
    fn from(fields: Fields) -> Self {
        Self {
            id: fields.id,
            kind: fields.kind,
            prompt: fields.prompt,
            options: fields.options.map(texts),
            pairs: fields
                .pairs
                .map(|pairs| pairs.into_iter().map(texts).collect()),
            missing_slots: fields.missing_slots,
            memorize_seconds: fields.memorize_seconds,
            unreadable: None,
        }
    }
}

/// Keep one spelling per field; serde rejects an object naming a field twice.
fn keep_first_spelling(map: &mut Map<String, Value>) {
    for spellings in SPELLINGS {
        let mut present = spellings.iter().filter(|name| map.contains_key(**name));
        if present.next().is_some() {
            let extra: Vec<&str> = present.copied().collect();
            for name in extra {
                map.remove(name);
            }
        }
    }
}

impl RawQuestion {
    /// Read one element of a backend question list.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let value = match value {
            Value::Object(mut map) => {
                keep_first_spelling(&mut map);
                Value::Object(map)
            }
            other => other,
        };
        match serde_json::from_value::<Fields>(value) {
            Ok(fields) => fields.into(),
            Err(err) => Self {
                unreadable: Some(err.to_string()),
                ..Self::default()
            },
        }
    }
}

impl<'de> Deserialize<'de> for RawQuestion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}
