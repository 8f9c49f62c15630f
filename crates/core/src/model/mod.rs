mod answer;
mod ids;
mod question;
mod settings;
mod test_type;

pub use answer::{Answer, AnswerInput};
pub use ids::{AttemptId, ParseIdError, QuestionId, TestTypeId};
pub use question::{
    MemoryPairs, ParseSlotError, Question, QuestionBody, QuestionError, QuestionKind, SlotId,
};
pub use settings::{SessionSettings, SettingsError};
pub use test_type::{TestMode, TestType, catalog};
