use thiserror::Error;

use crate::timer::{Countdown, TickOutcome, TimerHandle};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PhaseError {
    #[error("recall has already started")]
    AlreadyRecalling,
}

/// Sub-state of a memory question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryPhase {
    Memorization,
    Recall,
}

/// Result of ticking the phase countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStep {
    Stay { remaining: u32 },
    EnteredRecall,
    /// The recall window closed; the owner must force-advance.
    RecallExpired,
    Idle,
}

/// Memorization → Recall for one memory question.
///
/// Owns the phase countdown. There is no way back from `Recall`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseMachine {
    phase: MemoryPhase,
    timer: Countdown,
    recall_seconds: u32,
}

impl PhaseMachine {
    #[must_use]
    pub fn begin(memorize_seconds: u32, recall_seconds: u32) -> Self {
        Self {
            phase: MemoryPhase::Memorization,
            timer: Countdown::start(memorize_seconds),
            recall_seconds,
        }
    }

    #[must_use]
    pub fn phase(&self) -> MemoryPhase {
        self.phase
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.timer.remaining()
    }

    #[must_use]
    pub fn timer_handle(&self) -> TimerHandle {
        self.timer.handle()
    }

    /// The "I'm Ready" acknowledgement: leave memorization early.
    ///
    /// # Errors
    ///
    /// Returns `PhaseError::AlreadyRecalling` once recall has started.
    pub fn acknowledge(&mut self) -> Result<(), PhaseError> {
        if self.phase == MemoryPhase::Recall {
            return Err(PhaseError::AlreadyRecalling);
        }
        self.enter_recall();
        Ok(())
    }

    pub fn tick(&mut self) -> PhaseStep {
        match (self.timer.tick(), self.phase) {
            (TickOutcome::Running { remaining }, _) => PhaseStep::Stay { remaining },
            (TickOutcome::Expired, MemoryPhase::Memorization) => {
                self.enter_recall();
                PhaseStep::EnteredRecall
            }
            (TickOutcome::Expired, MemoryPhase::Recall) => PhaseStep::RecallExpired,
            (TickOutcome::Inactive, _) => PhaseStep::Idle,
        }
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    fn enter_recall(&mut self) {
        self.timer.cancel();
        self.timer = Countdown::start(self.recall_seconds);
        self.phase = MemoryPhase::Recall;
        tracing::debug!(recall_seconds = self.recall_seconds, "recall phase started");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memorization_expiry_enters_recall_with_fresh_budget() {
        let mut machine = PhaseMachine::begin(2, 45);
        let memorize_handle = machine.timer_handle();

        assert_eq!(machine.tick(), PhaseStep::Stay { remaining: 1 });
        assert_eq!(machine.tick(), PhaseStep::EnteredRecall);
        assert_eq!(machine.phase(), MemoryPhase::Recall);
        assert_eq!(machine.remaining(), 45);
        assert_ne!(machine.timer_handle(), memorize_handle);
    }

    #[test]
    fn acknowledgement_skips_remaining_memorization() {
        let mut machine = PhaseMachine::begin(30, 45);
        machine.tick();
        machine.acknowledge().unwrap();
        assert_eq!(machine.phase(), MemoryPhase::Recall);
        assert_eq!(machine.remaining(), 45);
        assert_eq!(machine.acknowledge(), Err(PhaseError::AlreadyRecalling));
    }

    #[test]
    fn recall_expiry_is_reported_once() {
        let mut machine = PhaseMachine::begin(1, 2);
        assert_eq!(machine.tick(), PhaseStep::EnteredRecall);
        assert_eq!(machine.tick(), PhaseStep::Stay { remaining: 1 });
        assert_eq!(machine.tick(), PhaseStep::RecallExpired);
        assert_eq!(machine.tick(), PhaseStep::Idle);
        assert_eq!(machine.phase(), MemoryPhase::Recall);
    }

    #[test]
    fn cancelled_machine_goes_idle() {
        let mut machine = PhaseMachine::begin(5, 5);
        machine.cancel();
        assert_eq!(machine.tick(), PhaseStep::Idle);
    }
}
