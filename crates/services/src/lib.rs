#![forbid(unsafe_code)]

pub mod attempts;
pub mod backend;
pub mod config;
pub mod error;

pub use assess_core::Clock;

pub use attempts::{
    AttemptRunner, AttemptService, AttemptSnapshot, RunnerCommand, RunnerHandle, RunnerUpdate,
};
pub use backend::HttpBackend;
pub use config::{BackendConfig, ConfigError, session_settings_from_env};
pub use error::{AttemptError, RunnerClosed};
