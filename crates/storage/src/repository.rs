use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use assess_core::model::TestTypeId;
use assess_core::submission::SubmissionRecord;

use crate::raw::RawQuestion;

/// Errors surfaced by backend adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("rejected by backend (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Backend acknowledgement of a delivered payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub accepted: usize,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Where questions for a test type come from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the raw question list for a test type.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for unknown test types, or transport errors.
    async fn fetch_questions(&self, test_type: &TestTypeId)
    -> Result<Vec<RawQuestion>, StorageError>;
}

/// Where finished attempts are delivered. Retrying is the caller's decision.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Deliver a formatted payload.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend rejects the payload or cannot be reached.
    async fn submit(
        &self,
        test_type: &TestTypeId,
        records: &[SubmissionRecord],
    ) -> Result<SubmissionReceipt, StorageError>;
}

/// A payload captured by the in-memory sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSubmission {
    pub test_type: TestTypeId,
    pub records: Vec<SubmissionRecord>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<TestTypeId, Vec<RawQuestion>>>>,
    submissions: Arc<Mutex<Vec<StoredSubmission>>>,
    failing_submits: Arc<Mutex<u32>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the question list served for `test_type`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_questions(
        &self,
        test_type: TestTypeId,
        questions: Vec<RawQuestion>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(test_type, questions);
        Ok(())
    }

    /// Make the next `count` submissions fail with `StorageError::Timeout`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn fail_next_submissions(&self, count: u32) -> Result<(), StorageError> {
        let mut guard = self
            .failing_submits
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = count;
        Ok(())
    }

    /// Every payload accepted so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn submissions(&self) -> Result<Vec<StoredSubmission>, StorageError> {
        let guard = self
            .submissions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl QuestionSource for InMemoryRepository {
    async fn fetch_questions(
        &self,
        test_type: &TestTypeId,
    ) -> Result<Vec<RawQuestion>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(test_type).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl SubmissionSink for InMemoryRepository {
    async fn submit(
        &self,
        test_type: &TestTypeId,
        records: &[SubmissionRecord],
    ) -> Result<SubmissionReceipt, StorageError> {
        {
            let mut failing = self
                .failing_submits
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            if *failing > 0 {
                *failing -= 1;
                return Err(StorageError::Timeout);
            }
        }

        let mut guard = self
            .submissions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(StoredSubmission {
            test_type: test_type.clone(),
            records: records.to_vec(),
        });
        Ok(SubmissionReceipt {
            accepted: records.len(),
            reference: Some(format!("local-{}", guard.len())),
        })
    }
}

/// Aggregates the question source and submission sink behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionSource>,
    pub submissions: Arc<dyn SubmissionSink>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionSource> = Arc::new(repo.clone());
        let submissions: Arc<dyn SubmissionSink> = Arc::new(repo);
        Self {
            questions,
            submissions,
        }
    }
}
