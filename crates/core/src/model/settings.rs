use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("attempt seconds must be > 0")]
    InvalidAttemptSeconds,

    #[error("recall seconds must be > 0")]
    InvalidRecallSeconds,

    #[error("default memorize seconds must be > 0")]
    InvalidMemorizeSeconds,
}

/// Timing rules applied to one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    attempt_seconds: u32,
    recall_seconds: u32,
    default_memorize_seconds: u32,
}

impl SessionSettings {
    pub const DEFAULT_ATTEMPT_SECONDS: u32 = 20 * 60;
    pub const DEFAULT_RECALL_SECONDS: u32 = 45;
    pub const DEFAULT_MEMORIZE_SECONDS: u32 = 30;

    /// # Errors
    ///
    /// Returns `SettingsError` if any duration is zero.
    pub fn new(
        attempt_seconds: u32,
        recall_seconds: u32,
        default_memorize_seconds: u32,
    ) -> Result<Self, SettingsError> {
        if attempt_seconds == 0 {
            return Err(SettingsError::InvalidAttemptSeconds);
        }
        if recall_seconds == 0 {
            return Err(SettingsError::InvalidRecallSeconds);
        }
        if default_memorize_seconds == 0 {
            return Err(SettingsError::InvalidMemorizeSeconds);
        }
        Ok(Self {
            attempt_seconds,
            recall_seconds,
            default_memorize_seconds,
        })
    }

    /// Same settings with a different whole-attempt limit.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidAttemptSeconds` for zero.
    pub fn with_attempt_seconds(self, attempt_seconds: u32) -> Result<Self, SettingsError> {
        Self::new(
            attempt_seconds,
            self.recall_seconds,
            self.default_memorize_seconds,
        )
    }

    #[must_use]
    pub fn attempt_seconds(&self) -> u32 {
        self.attempt_seconds
    }

    /// Fixed recall budget, independent of how long memorization lasted.
    #[must_use]
    pub fn recall_seconds(&self) -> u32 {
        self.recall_seconds
    }

    /// Used when the backend omits a memorization duration.
    #[must_use]
    pub fn default_memorize_seconds(&self) -> u32 {
        self.default_memorize_seconds
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            attempt_seconds: Self::DEFAULT_ATTEMPT_SECONDS,
            recall_seconds: Self::DEFAULT_RECALL_SECONDS,
            default_memorize_seconds: Self::DEFAULT_MEMORIZE_SECONDS,
        }
    }
}
