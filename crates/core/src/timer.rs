//! Cooperative one-second countdown.
//!
//! A `Countdown` never reads the wall clock: whoever owns it calls [`Countdown::tick`]
//! once per elapsed second. Each started countdown carries its own [`TimerHandle`], so
//! replacing a countdown also retires the handle of the one it replaced.

use std::fmt;
use uuid::Uuid;

/// Identity of one started countdown.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(Uuid);

impl TimerHandle {
    fn mint() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerHandle({})", self.0)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32 },
    /// Reported exactly once, on the tick that reaches zero.
    Expired,
    /// The countdown was already expired or cancelled.
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountdownState {
    Running,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    handle: TimerHandle,
    remaining: u32,
    state: CountdownState,
}

impl Countdown {
    /// Start a countdown of `duration_seconds`.
    ///
    /// A zero duration expires on its first tick.
    #[must_use]
    pub fn start(duration_seconds: u32) -> Self {
        Self {
            handle: TimerHandle::mint(),
            remaining: duration_seconds,
            state: CountdownState::Running,
        }
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != CountdownState::Running {
            return TickOutcome::Inactive;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = CountdownState::Expired;
            return TickOutcome::Expired;
        }
        TickOutcome::Running {
            remaining: self.remaining,
        }
    }

    /// Stop the countdown. Returns `true` only for the call that actually cancelled it.
    pub fn cancel(&mut self) -> bool {
        if self.state == CountdownState::Running {
            self.state = CountdownState::Cancelled;
            return true;
        }
        false
    }

    #[must_use]
    pub fn handle(&self) -> TimerHandle {
        self.handle
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_ticks_expire_exactly_once() {
        let mut timer = Countdown::start(5);
        let mut expirations = 0;
        let mut seen = Vec::new();

        for _ in 0..8 {
            match timer.tick() {
                TickOutcome::Running { remaining } => seen.push(remaining),
                TickOutcome::Expired => expirations += 1,
                TickOutcome::Inactive => {}
            }
        }

        assert_eq!(expirations, 1);
        assert_eq!(seen, vec![4, 3, 2, 1]);
        assert_eq!(timer.remaining(), 0);
        assert_eq!(timer.tick(), TickOutcome::Inactive);
    }

    #[test]
    fn zero_duration_expires_on_first_tick() {
        let mut timer = Countdown::start(0);
        assert_eq!(timer.tick(), TickOutcome::Expired);
        assert_eq!(timer.tick(), TickOutcome::Inactive);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn cancel_is_idempotent_and_stops_ticks() {
        let mut timer = Countdown::start(3);
        assert_eq!(timer.tick(), TickOutcome::Running { remaining: 2 });

        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert_eq!(timer.tick(), TickOutcome::Inactive);
        assert_eq!(timer.remaining(), 2);
    }

    #[test]
    fn cancel_after_expiry_has_no_effect() {
        let mut timer = Countdown::start(1);
        assert_eq!(timer.tick(), TickOutcome::Expired);
        assert!(!timer.cancel());
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn every_start_mints_a_fresh_handle() {
        let a = Countdown::start(10);
        let b = Countdown::start(10);
        assert_ne!(a.handle(), b.handle());
        assert_eq!(a.remaining(), b.remaining());
    }
}
