use assess_core::model::QuestionKind;
use assess_core::navigation::NavigationState;
use assess_core::phase::MemoryPhase;
use assess_core::session::{SessionProgress, SessionStatus, TestSession};

/// What a presentation layer needs to redraw after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptSnapshot {
    pub status: SessionStatus,
    pub index: usize,
    pub kind: QuestionKind,
    pub phase: Option<MemoryPhase>,
    pub navigation: NavigationState,
    pub progress: SessionProgress,
    pub attempt_remaining: u32,
    pub phase_remaining: Option<u32>,
}

impl AttemptSnapshot {
    #[must_use]
    pub fn of(session: &TestSession) -> Self {
        Self {
            status: session.status(),
            index: session.current_index(),
            kind: session.current_question().kind(),
            phase: session.phase(),
            navigation: session.navigation(),
            progress: session.progress(),
            attempt_remaining: session.attempt_remaining(),
            phase_remaining: session.phase_remaining(),
        }
    }
}
