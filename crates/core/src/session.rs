use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::answers::{AnswerError, AnswerStore};
use crate::model::{
    Answer, AnswerInput, AttemptId, Question, QuestionKind, SessionSettings, TestType,
};
use crate::navigation::{NavAction, NavContext, NavKey, NavigationState, navigation_state};
use crate::phase::{MemoryPhase, PhaseError, PhaseMachine, PhaseStep};
use crate::submission::{SubmissionRecord, format_submission};
use crate::time::deadline_after;
use crate::timer::{Countdown, TickOutcome};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Why a transition was refused. The state is left untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("moving forward is not allowed yet")]
    ForwardDisabled,

    #[error("moving back is not allowed here")]
    BackDisabled,

    #[error("memory slots can only be filled during recall")]
    NotRecalling,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error("session already submitted")]
    AlreadySubmitted,

    #[error("session is waiting for its submission to be delivered")]
    AwaitingSubmission,

    #[error("session has not finished yet")]
    NotAwaitingSubmission,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    AwaitingSubmission,
    /// Terminal.
    Submitted,
}

/// Why the attempt stopped taking answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    Finished,
    RecallExpired,
    AttemptExpired,
}

/// Everything the session reacts to. Time only enters through `Tick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Answer(AnswerInput),
    Advance,
    Back,
    Key(NavKey),
    /// One second elapsed.
    Tick,
}

/// What a dispatched event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Answered { index: usize },
    Moved { from: usize, to: usize },
    EnteredRecall { index: usize },
    /// The recall window closed and the session moved on regardless of blanks.
    ForceAdvanced { from: usize, to: usize },
    AwaitingSubmission { reason: SubmitReason },
    Ticked,
    /// Tick received while nothing is running.
    Idle,
}

/// Aggregated view of attempt progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a test.
///
/// Owns both countdowns: the attempt countdown for the whole run and, while a memory
/// question is current, the phase countdown inside its `PhaseMachine`. Moving to another
/// question drops the phase machine, so its countdown cannot outlive the question.
///
/// Memory questions are one-shot: once the attempt has moved past one, navigation skips
/// over it in both directions.
pub struct TestSession {
    attempt_id: AttemptId,
    test_type: TestType,
    settings: SessionSettings,
    questions: Vec<Question>,
    current: usize,
    /// Highest index visited so far.
    furthest: usize,
    answers: AnswerStore,
    started_at: DateTime<Utc>,
    deadline_at: DateTime<Utc>,
    attempt_timer: Countdown,
    phase: Option<PhaseMachine>,
    recall_expired: BTreeSet<usize>,
    status: SessionStatus,
    submit_reason: Option<SubmitReason>,
    payload: Option<Vec<SubmissionRecord>>,
    submitted_at: Option<DateTime<Utc>>,
}

impl TestSession {
    /// Start an attempt at question 0.
    ///
    /// `started_at` should come from the services layer clock to keep time deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        test_type: TestType,
        questions: Vec<Question>,
        settings: SessionSettings,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let Some(first) = questions.first() else {
            return Err(SessionError::Empty);
        };
        let phase = phase_for(first, settings);
        let attempt_seconds = settings.attempt_seconds();
        let attempt_id = AttemptId::new_v4();

        tracing::info!(
            attempt_id = %attempt_id,
            test_type = %test_type.id(),
            questions = questions.len(),
            attempt_seconds,
            "attempt started"
        );

        Ok(Self {
            attempt_id,
            test_type,
            settings,
            questions,
            current: 0,
            furthest: 0,
            answers: AnswerStore::new(),
            started_at,
            deadline_at: deadline_after(started_at, attempt_seconds),
            attempt_timer: Countdown::start(attempt_seconds),
            phase,
            recall_expired: BTreeSet::new(),
            status: SessionStatus::InProgress,
            submit_reason: None,
            payload: None,
            submitted_at: None,
        })
    }

    /// Single entry point for every state change.
    ///
    /// # Errors
    ///
    /// - `SessionError::AlreadySubmitted` for any event once submitted
    /// - `SessionError::AwaitingSubmission` for user events after the attempt ended
    /// - `SessionError::Validation` when navigation rules refuse the move
    /// - `SessionError::Answer` when an edit does not fit the current question
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<Transition, SessionError> {
        match (self.status, &event) {
            (SessionStatus::Submitted, _) => return Err(SessionError::AlreadySubmitted),
            (SessionStatus::AwaitingSubmission, SessionEvent::Tick) => return Ok(Transition::Idle),
            (SessionStatus::AwaitingSubmission, _) => {
                return Err(SessionError::AwaitingSubmission);
            }
            (SessionStatus::InProgress, _) => {}
        }

        match event {
            SessionEvent::Answer(input) => self.apply_answer(input),
            SessionEvent::Advance => self.go_forward(),
            SessionEvent::Back => self.go_back(),
            SessionEvent::Key(key) => match key.action() {
                NavAction::Forward => self.go_forward(),
                NavAction::Back => self.go_back(),
            },
            SessionEvent::Tick => Ok(self.on_tick()),
        }
    }

    /// # Errors
    ///
    /// See [`TestSession::dispatch`].
    pub fn answer(&mut self, input: AnswerInput) -> Result<Transition, SessionError> {
        self.dispatch(SessionEvent::Answer(input))
    }

    /// # Errors
    ///
    /// See [`TestSession::dispatch`].
    pub fn advance(&mut self) -> Result<Transition, SessionError> {
        self.dispatch(SessionEvent::Advance)
    }

    /// # Errors
    ///
    /// See [`TestSession::dispatch`].
    pub fn back(&mut self) -> Result<Transition, SessionError> {
        self.dispatch(SessionEvent::Back)
    }

    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` once submitted.
    pub fn tick(&mut self) -> Result<Transition, SessionError> {
        self.dispatch(SessionEvent::Tick)
    }

    /// Record that the payload reached the backend.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` on a second call and
    /// `SessionError::NotAwaitingSubmission` while the attempt is still running.
    pub fn mark_submitted(&mut self, at: DateTime<Utc>) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Submitted => Err(SessionError::AlreadySubmitted),
            SessionStatus::InProgress => Err(SessionError::NotAwaitingSubmission),
            SessionStatus::AwaitingSubmission => {
                self.status = SessionStatus::Submitted;
                self.submitted_at = Some(at);
                tracing::info!(attempt_id = %self.attempt_id, "attempt submitted");
                Ok(())
            }
        }
    }

    //
    // ─── READ ACCESS ───────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn test_type(&self) -> &TestType {
        &self.test_type
    }

    #[must_use]
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn submit_reason(&self) -> Option<SubmitReason> {
        self.submit_reason
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&Answer> {
        self.answers.get(self.current)
    }

    /// Phase of the current question; `None` unless it is a memory question.
    #[must_use]
    pub fn phase(&self) -> Option<MemoryPhase> {
        self.phase.as_ref().map(PhaseMachine::phase)
    }

    #[must_use]
    pub fn attempt_remaining(&self) -> u32 {
        self.attempt_timer.remaining()
    }

    #[must_use]
    pub fn phase_remaining(&self) -> Option<u32> {
        self.phase.as_ref().map(PhaseMachine::remaining)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn deadline_at(&self) -> DateTime<Utc> {
        self.deadline_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// The formatted payload, available from `AwaitingSubmission` on.
    #[must_use]
    pub fn payload(&self) -> Option<&[SubmissionRecord]> {
        self.payload.as_deref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status != SessionStatus::InProgress
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let answered = self.answers.answered_count(&self.questions);
        SessionProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            is_complete: self.is_finished(),
        }
    }

    #[must_use]
    pub fn navigation(&self) -> NavigationState {
        let ctx = NavContext {
            index: self.current,
            total: self.questions.len(),
            earlier_reachable: self.back_target().is_some(),
            requires_all_answered: self.test_type.mode().requires_all_answered(),
            attempt_complete: self
                .answers
                .all_complete_except(&self.questions, &self.recall_expired),
        };
        navigation_state(
            self.current_question(),
            self.current_answer(),
            self.phase(),
            ctx,
        )
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn apply_answer(&mut self, input: AnswerInput) -> Result<Transition, SessionError> {
        if matches!(input, AnswerInput::Slot { .. }) && self.phase() != Some(MemoryPhase::Recall) {
            return Err(ValidationError::NotRecalling.into());
        }
        let index = self.current;
        self.answers.apply(index, &self.questions[index], input)?;
        Ok(Transition::Answered { index })
    }

    fn go_forward(&mut self) -> Result<Transition, SessionError> {
        if !self.navigation().can_go_forward {
            return Err(ValidationError::ForwardDisabled.into());
        }

        let index = self.current;
        if let Some(machine) = self
            .phase
            .as_mut()
            .filter(|m| m.phase() == MemoryPhase::Memorization)
        {
            machine.acknowledge()?;
            tracing::debug!(
                attempt_id = %self.attempt_id,
                index,
                timer = ?machine.timer_handle(),
                "memorization acknowledged"
            );
            return Ok(Transition::EnteredRecall { index });
        }

        match self.forward_target() {
            Some(to) => Ok(self.move_to(to)),
            None => Ok(self.begin_submission(SubmitReason::Finished)),
        }
    }

    fn go_back(&mut self) -> Result<Transition, SessionError> {
        match self.back_target() {
            Some(to) if self.navigation().can_go_back => Ok(self.move_to(to)),
            _ => Err(ValidationError::BackDisabled.into()),
        }
    }

    fn is_passed_memory(&self, index: usize) -> bool {
        index < self.furthest && self.questions[index].kind() == QuestionKind::MemoryPair
    }

    fn back_target(&self) -> Option<usize> {
        (0..self.current).rev().find(|&i| !self.is_passed_memory(i))
    }

    fn forward_target(&self) -> Option<usize> {
        (self.current + 1..self.questions.len()).find(|&i| !self.is_passed_memory(i))
    }

    fn on_tick(&mut self) -> Transition {
        // The attempt countdown is ticked first: its expiry wins over any phase change.
        if self.attempt_timer.tick() == TickOutcome::Expired {
            tracing::info!(
                attempt_id = %self.attempt_id,
                index = self.current,
                "attempt time expired, forcing submission"
            );
            return self.begin_submission(SubmitReason::AttemptExpired);
        }

        let step = self
            .phase
            .as_mut()
            .map_or(PhaseStep::Idle, PhaseMachine::tick);
        let index = self.current;
        match step {
            PhaseStep::EnteredRecall => {
                tracing::debug!(attempt_id = %self.attempt_id, index, "memorization time expired");
                Transition::EnteredRecall { index }
            }
            PhaseStep::RecallExpired => {
                self.recall_expired.insert(index);
                tracing::info!(attempt_id = %self.attempt_id, index, "recall time expired");
                let Some(to) = self.forward_target() else {
                    return self.begin_submission(SubmitReason::RecallExpired);
                };
                self.move_to(to);
                Transition::ForceAdvanced { from: index, to }
            }
            PhaseStep::Stay { .. } | PhaseStep::Idle => Transition::Ticked,
        }
    }

    fn move_to(&mut self, to: usize) -> Transition {
        let from = self.current;
        if let Some(machine) = self.phase.as_mut() {
            machine.cancel();
            tracing::trace!(timer = ?machine.timer_handle(), "phase countdown retired");
        }
        self.current = to;
        self.furthest = self.furthest.max(to);
        self.phase = phase_for(&self.questions[to], self.settings);
        tracing::debug!(
            attempt_id = %self.attempt_id,
            from,
            to,
            phase_timer = ?self.phase.as_ref().map(PhaseMachine::timer_handle),
            "moved to question"
        );
        Transition::Moved { from, to }
    }

    fn begin_submission(&mut self, reason: SubmitReason) -> Transition {
        self.attempt_timer.cancel();
        if let Some(mut machine) = self.phase.take() {
            machine.cancel();
        }
        self.payload = Some(format_submission(&self.questions, &self.answers));
        self.status = SessionStatus::AwaitingSubmission;
        self.submit_reason = Some(reason);
        tracing::info!(
            attempt_id = %self.attempt_id,
            ?reason,
            answered = self.answers.answered_count(&self.questions),
            total = self.questions.len(),
            "attempt awaiting submission"
        );
        Transition::AwaitingSubmission { reason }
    }
}

fn phase_for(question: &Question, settings: SessionSettings) -> Option<PhaseMachine> {
    question
        .memory()
        .map(|memory| PhaseMachine::begin(memory.memorize_seconds(), settings.recall_seconds()))
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("attempt_id", &self.attempt_id)
            .field("test_type", self.test_type.id())
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("status", &self.status)
            .field("phase", &self.phase())
            .field("attempt_remaining", &self.attempt_remaining())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemoryPairs, QuestionId, SlotId, TestMode, TestTypeId};
    use crate::submission::SubmissionValue;
    use crate::time::fixed_now;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn test_type(slug: &str, mode: TestMode) -> TestType {
        TestType::new(TestTypeId::new(slug).unwrap(), slug, mode)
    }

    fn settings(attempt_seconds: u32) -> SessionSettings {
        SessionSettings::new(attempt_seconds, 45, 30).unwrap()
    }

    fn gap(id: u64) -> Question {
        Question::fill_in_gap(QuestionId::new(id), "He was ___ dinner").unwrap()
    }

    fn choice(id: u64) -> Question {
        Question::multiple_choice(QuestionId::new(id), "2 + 2", vec!["3".into(), "4".into()])
            .unwrap()
    }

    fn memory(id: u64, memorize_seconds: u32) -> Question {
        let pairs = vec![vec!["ocean".to_string(), "wave".to_string()]];
        let missing = BTreeMap::from([(0, BTreeSet::from([1]))]);
        Question::memory_pair(
            QuestionId::new(id),
            "Memorize the pair",
            MemoryPairs::new(pairs, &missing, memorize_seconds).unwrap(),
        )
    }

    fn session(mode: TestMode, questions: Vec<Question>, attempt_seconds: u32) -> TestSession {
        TestSession::new(
            test_type("t", mode),
            questions,
            settings(attempt_seconds),
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = TestSession::new(
            test_type("t", TestMode::Verbal),
            Vec::new(),
            settings(60),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionError::Empty);
    }

    #[test]
    fn deadline_is_start_plus_attempt_limit() {
        let s = session(TestMode::Verbal, vec![gap(1)], 90);
        assert_eq!(s.deadline_at(), fixed_now() + Duration::seconds(90));
        assert_eq!(s.attempt_remaining(), 90);
        assert_eq!(s.phase(), None);
    }

    #[test]
    fn word_logic_scenario_skips_and_finishes() {
        let mut s = session(TestMode::Verbal, vec![gap(1), gap(2)], 600);

        assert_eq!(s.navigation().label.to_string(), "Skip");
        assert_eq!(s.advance().unwrap(), Transition::Moved { from: 0, to: 1 });

        s.answer(AnswerInput::Text("eating".into())).unwrap();
        assert_eq!(s.navigation().label.to_string(), "Finish");
        assert_eq!(
            s.advance().unwrap(),
            Transition::AwaitingSubmission {
                reason: SubmitReason::Finished
            }
        );

        let payload = s.payload().unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].value, None);
        assert_eq!(payload[1].value, Some(SubmissionValue::Text("eating".into())));
    }

    #[test]
    fn mixed_test_refuses_finish_until_everything_is_answered() {
        let mut s = session(TestMode::Mixed, vec![choice(1), gap(2)], 600);

        s.advance().unwrap();
        s.answer(AnswerInput::Text("walk".into())).unwrap();
        let err = s.advance().unwrap_err();
        assert_eq!(err, SessionError::Validation(ValidationError::ForwardDisabled));
        assert_eq!(s.status(), SessionStatus::InProgress);

        s.back().unwrap();
        s.answer(AnswerInput::Select(1)).unwrap();
        s.dispatch(SessionEvent::Key(NavKey::ArrowRight)).unwrap();
        assert!(matches!(
            s.dispatch(SessionEvent::Key(NavKey::Enter)).unwrap(),
            Transition::AwaitingSubmission { .. }
        ));
    }

    #[test]
    fn question_skipped_before_a_memory_question_can_still_be_finished() {
        let mut s = session(TestMode::Mixed, vec![choice(1), memory(2, 30), gap(3)], 600);

        assert_eq!(s.advance().unwrap(), Transition::Moved { from: 0, to: 1 });
        assert_eq!(s.advance().unwrap(), Transition::EnteredRecall { index: 1 });
        s.answer(AnswerInput::Slot { slot: SlotId::new(0, 1), value: "wave".into() })
            .unwrap();
        assert_eq!(s.advance().unwrap(), Transition::Moved { from: 1, to: 2 });
        s.answer(AnswerInput::Text("eating".into())).unwrap();

        let nav = s.navigation();
        assert_eq!(nav.label.to_string(), "Finish");
        assert!(!nav.can_go_forward);
        assert!(nav.can_go_back);

        assert_eq!(s.back().unwrap(), Transition::Moved { from: 2, to: 0 });
        assert_eq!(s.phase(), None);
        assert!(!s.navigation().can_go_back);
        s.answer(AnswerInput::Select(1)).unwrap();
        assert_eq!(s.advance().unwrap(), Transition::Moved { from: 0, to: 2 });
        assert_eq!(
            s.advance().unwrap(),
            Transition::AwaitingSubmission {
                reason: SubmitReason::Finished
            }
        );

        let payload = s.payload().unwrap();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload[1].value, Some(SubmissionValue::Text(r#"{"0-1":"wave"}"#.into())));
    }

    #[test]
    fn memory_recall_needs_all_slots_before_advancing() {
        let mut s = session(TestMode::Memory, vec![memory(1, 30), memory(2, 30)], 600);

        assert_eq!(s.phase(), Some(MemoryPhase::Memorization));
        let err = s
            .answer(AnswerInput::Slot { slot: SlotId::new(0, 1), value: "wave".into() })
            .unwrap_err();
        assert_eq!(err, SessionError::Validation(ValidationError::NotRecalling));

        assert_eq!(s.advance().unwrap(), Transition::EnteredRecall { index: 0 });
        assert_eq!(s.phase_remaining(), Some(45));
        assert!(s.advance().is_err());
        assert!(s.back().is_err());

        s.answer(AnswerInput::Slot { slot: SlotId::new(0, 1), value: "wave".into() })
            .unwrap();
        assert_eq!(s.advance().unwrap(), Transition::Moved { from: 0, to: 1 });
        assert_eq!(s.phase(), Some(MemoryPhase::Memorization));
        assert_eq!(s.phase_remaining(), Some(30));
    }

    #[test]
    fn recall_timeout_force_submits_with_blank_slot() {
        let mut s = session(TestMode::Memory, vec![memory(1, 30)], 600);
        s.advance().unwrap();

        for _ in 0..44 {
            assert_eq!(s.tick().unwrap(), Transition::Ticked);
        }
        assert_eq!(
            s.tick().unwrap(),
            Transition::AwaitingSubmission {
                reason: SubmitReason::RecallExpired
            }
        );

        let payload = s.payload().unwrap();
        assert_eq!(payload[0].value, Some(SubmissionValue::Text(r#"{"0-1":""}"#.into())));
    }

    #[test]
    fn recall_timeout_mid_test_moves_on_and_exempts_question() {
        let mut s = session(TestMode::Memory, vec![memory(1, 1), memory(2, 1)], 600);

        assert_eq!(s.tick().unwrap(), Transition::EnteredRecall { index: 0 });
        for _ in 0..44 {
            s.tick().unwrap();
        }
        assert_eq!(
            s.tick().unwrap(),
            Transition::ForceAdvanced { from: 0, to: 1 }
        );
        assert_eq!(s.current_index(), 1);

        s.advance().unwrap();
        s.answer(AnswerInput::Slot { slot: SlotId::new(0, 1), value: "wave".into() })
            .unwrap();
        let nav = s.navigation();
        assert!(nav.can_go_forward);
        assert!(!nav.can_go_back);
    }

    #[test]
    fn attempt_expiry_wins_mid_memorization() {
        let mut s = session(TestMode::Memory, vec![memory(1, 30)], 2);

        assert_eq!(s.tick().unwrap(), Transition::Ticked);
        assert_eq!(s.phase(), Some(MemoryPhase::Memorization));
        assert_eq!(
            s.tick().unwrap(),
            Transition::AwaitingSubmission {
                reason: SubmitReason::AttemptExpired
            }
        );
        assert_eq!(s.status(), SessionStatus::AwaitingSubmission);
        assert_eq!(s.phase(), None);
        assert_eq!(s.tick().unwrap(), Transition::Idle);
        assert_eq!(s.advance().unwrap_err(), SessionError::AwaitingSubmission);
    }

    #[test]
    fn submitted_is_terminal() {
        let mut s = session(TestMode::Verbal, vec![gap(1)], 60);
        assert_eq!(s.mark_submitted(fixed_now()).unwrap_err(), SessionError::NotAwaitingSubmission);

        s.advance().unwrap();
        s.mark_submitted(fixed_now()).unwrap();
        assert_eq!(s.status(), SessionStatus::Submitted);
        assert_eq!(s.submitted_at(), Some(fixed_now()));

        assert_eq!(s.mark_submitted(fixed_now()).unwrap_err(), SessionError::AlreadySubmitted);
        assert_eq!(s.tick().unwrap_err(), SessionError::AlreadySubmitted);
        assert_eq!(
            s.answer(AnswerInput::Text("late".into())).unwrap_err(),
            SessionError::AlreadySubmitted
        );
    }

    #[test]
    fn progress_counts_complete_answers() {
        let mut s = session(TestMode::Numeric, vec![choice(1), choice(2), choice(3)], 60);
        s.answer(AnswerInput::Select(0)).unwrap();

        let progress = s.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 2);
        assert!(!progress.is_complete);
    }

    #[test]
    fn leaving_a_memory_question_replaces_its_phase_timer() {
        let mut s = session(TestMode::Mixed, vec![memory(1, 5), choice(2)], 600);
        s.advance().unwrap();
        s.answer(AnswerInput::Slot { slot: SlotId::new(0, 1), value: "wave".into() })
            .unwrap();
        s.advance().unwrap();

        assert_eq!(s.phase(), None);
        assert_eq!(s.phase_remaining(), None);
        assert!(!s.navigation().can_go_back);
        for _ in 0..50 {
            assert_eq!(s.tick().unwrap(), Transition::Ticked);
        }
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.attempt_remaining(), 550);
    }
}
