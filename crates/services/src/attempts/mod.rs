mod runner;
mod view;
mod workflow;

// Public API of the attempt subsystem.
pub use crate::error::AttemptError;
pub use runner::{AttemptRunner, RunnerCommand, RunnerHandle, RunnerUpdate};
pub use view::AttemptSnapshot;
pub use workflow::AttemptService;
