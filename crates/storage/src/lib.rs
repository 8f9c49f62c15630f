#![forbid(unsafe_code)]

pub mod normalize;
pub mod raw;
pub mod repository;
pub mod seed;

pub use normalize::{MalformedQuestion, Normalized, normalize_all, normalize_question};
pub use raw::{RawId, RawQuestion};
pub use repository::{
    InMemoryRepository, QuestionSource, Storage, StorageError, StoredSubmission,
    SubmissionReceipt, SubmissionSink,
};
