use std::env;

use thiserror::Error;
use url::Url;

use assess_core::model::{SessionSettings, SettingsError};

pub const BASE_URL_VAR: &str = "ASSESS_API_BASE_URL";
pub const TOKEN_VAR: &str = "ASSESS_API_TOKEN";
pub const ATTEMPT_SECONDS_VAR: &str = "ASSESS_ATTEMPT_SECONDS";
pub const RECALL_SECONDS_VAR: &str = "ASSESS_RECALL_SECONDS";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Where the assessment backend lives.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: Url,
    pub token: Option<String>,
}

impl BackendConfig {
    /// Read the backend location from the environment.
    ///
    /// Returns `Ok(None)` when no base URL is set, meaning no remote backend is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the base URL does not parse.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`BackendConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the base URL does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let Some(raw) = non_blank(lookup(BASE_URL_VAR)) else {
            return Ok(None);
        };
        let base_url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
            var: BASE_URL_VAR,
            source,
        })?;
        Ok(Some(Self {
            base_url,
            token: non_blank(lookup(TOKEN_VAR)),
        }))
    }

    /// `{base}/tests/{slug}/{leaf}`, regardless of a trailing slash on the base.
    #[must_use]
    pub fn endpoint(&self, slug: &str, leaf: &str) -> String {
        format!(
            "{}/tests/{slug}/{leaf}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

/// Session timing from the environment, falling back to the defaults.
///
/// # Errors
///
/// Returns `ConfigError` when a variable is not a number or a duration is zero.
pub fn session_settings_from_env() -> Result<SessionSettings, ConfigError> {
    session_settings_from_lookup(|key| env::var(key).ok())
}

/// # Errors
///
/// See [`session_settings_from_env`].
pub fn session_settings_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SessionSettings, ConfigError> {
    let attempt = seconds(&lookup, ATTEMPT_SECONDS_VAR)?
        .unwrap_or(SessionSettings::DEFAULT_ATTEMPT_SECONDS);
    let recall = seconds(&lookup, RECALL_SECONDS_VAR)?
        .unwrap_or(SessionSettings::DEFAULT_RECALL_SECONDS);
    Ok(SessionSettings::new(
        attempt,
        recall,
        SessionSettings::DEFAULT_MEMORIZE_SECONDS,
    )?)
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u32>, ConfigError> {
    let Some(value) = non_blank(lookup(var)) else {
        return Ok(None);
    };
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidSeconds { var, value })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
