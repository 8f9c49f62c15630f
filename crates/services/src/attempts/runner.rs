//! Drives one attempt in real time from a single task.
//!
//! The task owns the `TestSession`. A one-second interval feeds `Tick` events and a
//! command channel feeds user events; both go through `TestSession::dispatch`, so the
//! session never sees two events at once. When the attempt ends the runner delivers it
//! through the `AttemptService` and waits for `Resubmit` if delivery fails.
//!
//! Dropping the `RunnerHandle` abandons the attempt: the task is aborted and nothing is
//! delivered. Only [`RunnerHandle::finish`] lets an attempt run out its clock unattended.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use assess_core::session::{SessionError, SessionEvent, SessionStatus, TestSession, Transition};
use storage::repository::SubmissionReceipt;

use super::view::AttemptSnapshot;
use super::workflow::AttemptService;
use crate::error::{AttemptError, RunnerClosed};

const COMMAND_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerCommand {
    Dispatch(SessionEvent),
    /// Retry delivery after `RunnerUpdate::SubmitFailed`.
    Resubmit,
}

#[derive(Debug)]
pub enum RunnerUpdate {
    Changed {
        transition: Transition,
        snapshot: AttemptSnapshot,
    },
    Refused(SessionError),
    SubmitFailed(AttemptError),
    Submitted(SubmissionReceipt),
}

pub struct AttemptRunner {
    service: AttemptService,
    session: TestSession,
    period: Duration,
}

impl AttemptRunner {
    #[must_use]
    pub fn new(service: AttemptService, session: TestSession) -> Self {
        Self {
            service,
            session,
            period: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Start the runner task.
    ///
    /// Updates are sent on the returned receiver; dropping it is fine.
    #[must_use]
    pub fn spawn(self) -> (RunnerHandle, mpsc::UnboundedReceiver<RunnerUpdate>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(commands_rx, updates_tx));
        (
            RunnerHandle {
                commands: Some(commands_tx),
                task,
            },
            updates_rx,
        )
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<RunnerCommand>,
        updates: mpsc::UnboundedSender<RunnerUpdate>,
    ) -> TestSession {
        let mut interval = time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;

        loop {
            let status = self.session.status();
            if status == SessionStatus::Submitted
                || (status == SessionStatus::AwaitingSubmission && !commands_open)
            {
                break;
            }

            tokio::select! {
                _ = interval.tick(), if status == SessionStatus::InProgress => {
                    self.apply(SessionEvent::Tick, &updates).await;
                }
                command = commands.recv(), if commands_open => match command {
                    Some(RunnerCommand::Dispatch(event)) => self.apply(event, &updates).await,
                    Some(RunnerCommand::Resubmit) => self.deliver(&updates).await,
                    None => commands_open = false,
                },
                else => break,
            }
        }

        tracing::debug!(
            attempt_id = %self.session.attempt_id(),
            status = ?self.session.status(),
            "attempt runner stopped"
        );
        self.session
    }

    async fn apply(&mut self, event: SessionEvent, updates: &mpsc::UnboundedSender<RunnerUpdate>) {
        match self.session.dispatch(event) {
            Ok(transition) => {
                let _ = updates.send(RunnerUpdate::Changed {
                    transition,
                    snapshot: AttemptSnapshot::of(&self.session),
                });
                if matches!(transition, Transition::AwaitingSubmission { .. }) {
                    self.deliver(updates).await;
                }
            }
            Err(err) => {
                let _ = updates.send(RunnerUpdate::Refused(err));
            }
        }
    }

    async fn deliver(&mut self, updates: &mpsc::UnboundedSender<RunnerUpdate>) {
        let update = match self.service.submit(&mut self.session).await {
            Ok(receipt) => RunnerUpdate::Submitted(receipt),
            Err(err) => RunnerUpdate::SubmitFailed(err),
        };
        let _ = updates.send(update);
    }
}

/// Control side of a spawned [`AttemptRunner`]. Dropping it aborts the runner.
pub struct RunnerHandle {
    commands: Option<mpsc::Sender<RunnerCommand>>,
    task: JoinHandle<TestSession>,
}

impl RunnerHandle {
    /// # Errors
    ///
    /// Returns `RunnerClosed` once the runner task has stopped.
    pub async fn send(&self, command: RunnerCommand) -> Result<(), RunnerClosed> {
        let commands = self.commands.as_ref().ok_or(RunnerClosed)?;
        commands.send(command).await.map_err(|_| RunnerClosed)
    }

    /// # Errors
    ///
    /// Returns `RunnerClosed` once the runner task has stopped.
    pub async fn dispatch(&self, event: SessionEvent) -> Result<(), RunnerClosed> {
        self.send(RunnerCommand::Dispatch(event)).await
    }

    /// # Errors
    ///
    /// Returns `RunnerClosed` once the runner task has stopped.
    pub async fn resubmit(&self) -> Result<(), RunnerClosed> {
        self.send(RunnerCommand::Resubmit).await
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop sending commands and wait for the attempt to end, returning the session.
    ///
    /// An attempt still in progress keeps ticking until its clock runs out and is then
    /// delivered.
    ///
    /// # Errors
    ///
    /// Returns `RunnerClosed` if the runner task panicked or was aborted.
    pub async fn finish(mut self) -> Result<TestSession, RunnerClosed> {
        self.commands = None;
        (&mut self.task).await.map_err(|_| RunnerClosed)
    }

    /// Stop the runner without delivering anything and wait until it is gone.
    pub async fn abandon(mut self) {
        self.commands = None;
        self.task.abort();
        if let Ok(session) = (&mut self.task).await {
            tracing::debug!(attempt_id = %session.attempt_id(), "runner ended before abandon");
        }
        tracing::info!("attempt abandoned");
    }
}

impl Drop for RunnerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
