use std::sync::Arc;

use assess_core::model::{SessionSettings, TestType};
use assess_core::session::{SessionError, SessionStatus, TestSession};
use assess_core::time::elapsed_seconds;
use storage::normalize::normalize_all;
use storage::repository::{QuestionSource, Storage, SubmissionReceipt, SubmissionSink};

use crate::Clock;
use crate::error::AttemptError;

/// Starts attempts from a question source and delivers finished ones to a sink.
#[derive(Clone)]
pub struct AttemptService {
    clock: Clock,
    questions: Arc<dyn QuestionSource>,
    submissions: Arc<dyn SubmissionSink>,
    settings: SessionSettings,
}

impl AttemptService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        submissions: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            clock,
            questions,
            submissions,
            settings: SessionSettings::default(),
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.questions),
            Arc::clone(&storage.submissions),
        )
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Start an attempt for a catalogue slug.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::UnknownTestType` for slugs outside the catalogue, otherwise
    /// see [`AttemptService::start_attempt`].
    pub async fn start_by_slug(&self, slug: &str) -> Result<TestSession, AttemptError> {
        let test_type =
            TestType::lookup(slug).ok_or_else(|| AttemptError::UnknownTestType(slug.to_string()))?;
        self.start_attempt(test_type).await
    }

    /// Fetch, normalize and start an attempt.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Transport` if the questions cannot be fetched and
    /// `AttemptError::Empty` if none of them survive normalization.
    pub async fn start_attempt(&self, test_type: TestType) -> Result<TestSession, AttemptError> {
        let raws = self.questions.fetch_questions(test_type.id()).await?;
        let normalized = normalize_all(raws, self.settings.default_memorize_seconds());
        if !normalized.dropped.is_empty() {
            tracing::warn!(
                test_type = %test_type.id(),
                dropped = normalized.dropped.len(),
                kept = normalized.questions.len(),
                "some questions were dropped"
            );
        }
        if normalized.questions.is_empty() {
            return Err(AttemptError::Empty(test_type.id().to_string()));
        }
        let session =
            TestSession::new(test_type, normalized.questions, self.settings, self.clock.now())?;
        Ok(session)
    }

    /// Deliver a finished attempt.
    ///
    /// On a transport failure the session stays awaiting submission with its payload, so
    /// the same call can be repeated.
    ///
    /// # Errors
    ///
    /// - `AttemptError::Session(NotAwaitingSubmission)` while the attempt is still running
    /// - `AttemptError::Session(AlreadySubmitted)` once delivered
    /// - `AttemptError::Transport` when the sink fails
    pub async fn submit(&self, session: &mut TestSession) -> Result<SubmissionReceipt, AttemptError> {
        match session.status() {
            SessionStatus::InProgress => return Err(SessionError::NotAwaitingSubmission.into()),
            SessionStatus::Submitted => return Err(SessionError::AlreadySubmitted.into()),
            SessionStatus::AwaitingSubmission => {}
        }
        let payload = session.payload().ok_or(SessionError::NotAwaitingSubmission)?;

        let receipt = match self
            .submissions
            .submit(session.test_type().id(), payload)
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(
                    attempt_id = %session.attempt_id(),
                    error = %err,
                    "submission failed, payload kept for resubmit"
                );
                return Err(err.into());
            }
        };

        let now = self.clock.now();
        session.mark_submitted(now)?;
        tracing::info!(
            attempt_id = %session.attempt_id(),
            elapsed_seconds = elapsed_seconds(session.started_at(), now),
            accepted = receipt.accepted,
            reference = receipt.reference.as_deref().unwrap_or("-"),
            "submission delivered"
        );
        Ok(receipt)
    }

    /// Retry delivery after a transport failure.
    ///
    /// # Errors
    ///
    /// See [`AttemptService::submit`].
    pub async fn resubmit(&self, session: &mut TestSession) -> Result<SubmissionReceipt, AttemptError> {
        tracing::debug!(attempt_id = %session.attempt_id(), "resubmitting");
        self.submit(session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{AnswerInput, TestTypeId};
    use assess_core::time::fixed_now;
    use storage::raw::RawQuestion;
    use storage::repository::InMemoryRepository;
    use storage::seed::seed_catalog;

    fn service(repo: &InMemoryRepository) -> AttemptService {
        AttemptService::from_storage(Clock::fixed(fixed_now()), &Storage::from_repository(repo.clone()))
    }

    #[tokio::test]
    async fn start_uses_clock_and_catalogue() {
        let repo = InMemoryRepository::new();
        seed_catalog(&repo).unwrap();
        let session = service(&repo).start_by_slug("word-logic").await.unwrap();
        assert_eq!(session.started_at(), fixed_now());
        assert_eq!(session.questions().len(), 2);
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[tokio::test]
    async fn unknown_slug_and_empty_bank_fail() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        assert!(matches!(
            svc.start_by_slug("astrology").await,
            Err(AttemptError::UnknownTestType(_))
        ));

        let broken = RawQuestion {
            prompt: Some("no id".into()),
            ..RawQuestion::default()
        };
        repo.insert_questions(TestTypeId::new("memory").unwrap(), vec![broken])
            .unwrap();
        assert!(matches!(
            svc.start_by_slug("memory").await,
            Err(AttemptError::Empty(_))
        ));
    }

    #[tokio::test]
    async fn submit_refuses_running_attempt() {
        let repo = InMemoryRepository::new();
        seed_catalog(&repo).unwrap();
        let svc = service(&repo);
        let mut session = svc.start_by_slug("word-logic").await.unwrap();
        session.answer(AnswerInput::Text("swimming".into())).unwrap();

        let err = svc.submit(&mut session).await.unwrap_err();
        assert!(matches!(
            err,
            AttemptError::Session(SessionError::NotAwaitingSubmission)
        ));
        assert!(repo.submissions().unwrap().is_empty());
    }
}
