//! Wall-clock time for attempts.
//!
//! Only the start, deadline and delivery timestamps come from here. Countdowns advance
//! through `Tick` events, never by reading the clock.

use chrono::{DateTime, Duration, Utc};

/// Source of "now", fixed in tests so timestamps are reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn default_clock() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Move a fixed clock forward by whole seconds. No effect on the system clock.
    pub fn advance_seconds(&mut self, seconds: u32) {
        if let Clock::Fixed(t) = self {
            *t += Duration::seconds(i64::from(seconds));
        }
    }
}

/// When an attempt started at `start` with a limit of `seconds` runs out.
#[must_use]
pub fn deadline_after(start: DateTime<Utc>, seconds: u32) -> DateTime<Utc> {
    start + Duration::seconds(i64::from(seconds))
}

/// Whole seconds from `from` to `to`, zero if `to` is earlier.
#[must_use]
pub fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    u32::try_from((to - from).num_seconds().max(0)).unwrap_or(u32::MAX)
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
