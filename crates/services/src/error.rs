//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::session::SessionError;
use storage::repository::StorageError;

/// Errors emitted by `AttemptService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("unknown test type {0:?}")]
    UnknownTestType(String),
    #[error("no usable questions for test type {0}")]
    Empty(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Transport(#[from] StorageError),
}

/// The attempt runner task has stopped and no longer accepts commands.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("attempt runner has stopped")]
pub struct RunnerClosed;
