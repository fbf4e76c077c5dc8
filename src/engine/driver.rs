// src/engine/driver.rs

use std::fmt;
use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{ChainConfig, StepConfig};
use crate::engine::cleanup::{CleanupExecutor, CleanupReport};
use crate::engine::detector::{Completion, CompletionDetector};
use crate::engine::Timings;
use crate::exec::{LaunchResult, Launcher, ProcessSpawner, ProcessTable};
use crate::notify::Notifier;
use crate::system::SystemControl;
use crate::types::AfterChainDone;

/// Where the driver is in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    NotStarted,
    /// Running the step at this position.
    Running(usize),
    Completed,
}

/// End-of-chain actions forced from outside the chain file (command line).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainDirectives {
    pub shutdown: bool,
    pub close: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Invalid configuration; the message says why.
    Skipped(String),
    /// No launch attempt survived the launch window.
    LaunchFailed,
    Completed {
        completion: Completion,
        cleanup: CleanupReport,
    },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub idx: usize,
    pub name: String,
    pub status: StepStatus,
}

/// Summary of one chain run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainReport {
    pub chain: String,
    /// `false` when the chain configuration was missing.
    pub found: bool,
    pub steps: Vec<StepReport>,
    pub cancelled: bool,
    pub shutdown_requested: bool,
    pub close_requested: bool,
}

/// Runs the steps of a chain one after another.
///
/// All collaborators are injected so the same driver runs against the real
/// OS in production and against fakes in tests. Per step:
/// notify start → launch → wait for completion → cleanup → notify done →
/// cool-down (except after the last step).
pub struct ChainDriver {
    table: Arc<dyn ProcessTable>,
    spawner: Arc<dyn ProcessSpawner>,
    notifier: Arc<dyn Notifier>,
    system: Arc<dyn SystemControl>,
    timings: Timings,
    cancel: CancellationToken,
    state: ChainState,
}

impl fmt::Debug for ChainDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainDriver")
            .field("timings", &self.timings)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ChainDriver {
    pub fn new(
        table: Arc<dyn ProcessTable>,
        spawner: Arc<dyn ProcessSpawner>,
        notifier: Arc<dyn Notifier>,
        system: Arc<dyn SystemControl>,
    ) -> Self {
        Self {
            table,
            spawner,
            notifier,
            system,
            timings: Timings::default(),
            cancel: CancellationToken::new(),
            state: ChainState::NotStarted,
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Token that stops the current wait when cancelled (Ctrl-C).
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Run `chain` (or nothing, if it couldn't be loaded) and then the
    /// end-of-chain actions.
    ///
    /// `name` is the chain identifier the run was requested with; it is used
    /// in notifications and when `chain` is `None`.
    pub async fn run(
        &mut self,
        name: &str,
        chain: Option<&ChainConfig>,
        directives: ChainDirectives,
    ) -> ChainReport {
        let mut report = ChainReport {
            chain: name.to_string(),
            found: chain.is_some(),
            ..ChainReport::default()
        };

        match chain {
            Some(chain) => {
                info!(chain = %name, steps = chain.len(), "chain started");
                self.run_steps(name, chain, &mut report).await;
                if report.cancelled {
                    warn!(chain = %name, "chain cancelled");
                } else {
                    info!(chain = %name, "all scripts finished");
                }
            }
            None => {
                error!(chain = %name, "chain configuration does not exist");
            }
        }
        self.state = ChainState::Completed;

        let after = chain.map(|c| c.after_chain_done).unwrap_or_default();
        self.finish(after, directives, &mut report).await;
        report
    }

    async fn run_steps(&mut self, name: &str, chain: &ChainConfig, report: &mut ChainReport) {
        let total = chain.steps.len();

        for (i, step) in chain.steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            self.state = ChainState::Running(i);
            let display = step.script_display();

            if step.notify_start {
                self.notify(&format!("chain {name} started: {display}")).await;
            }

            let status = self.run_step(step).await;
            if status == StepStatus::Cancelled {
                report.cancelled = true;
            }
            report.steps.push(StepReport {
                idx: i,
                name: display.clone(),
                status,
            });

            if step.notify_done {
                self.notify(&format!("chain {name} finished: {display}")).await;
            }

            if report.cancelled {
                break;
            }

            if i + 1 < total {
                info!(
                    chain = %name,
                    cooldown = ?self.timings.step_cooldown,
                    "starting next script after cool-down"
                );
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                    _ = sleep(self.timings.step_cooldown) => {}
                }
            }
        }
    }

    /// Launch, wait and clean up one step.
    async fn run_step(&self, step: &StepConfig) -> StepStatus {
        let launcher = Launcher::new(self.spawner.as_ref(), &self.timings, &self.cancel);

        let mut launched = match launcher.launch(step).await {
            LaunchResult::Launched(launched) => launched,
            LaunchResult::Skipped(reason) => return StepStatus::Skipped(reason.to_string()),
            LaunchResult::Failed => return StepStatus::LaunchFailed,
            LaunchResult::Cancelled => return StepStatus::Cancelled,
        };

        let detector = CompletionDetector::new(self.table.as_ref(), &self.timings, &self.cancel);
        let completion = detector.wait_until_done(step, launched.started_at).await;

        let cleanup =
            CleanupExecutor::new(self.table.as_ref()).cleanup(Some(launched.handle.as_mut()), step);
        info!(step = step.idx, ?completion, ?cleanup, "step finished");

        if completion == Completion::Cancelled {
            return StepStatus::Cancelled;
        }
        StepStatus::Completed {
            completion,
            cleanup,
        }
    }

    async fn notify(&self, content: &str) {
        if let Err(err) = self.notifier.send(content).await {
            warn!(error = %err, content, "failed to send notification");
        }
    }

    /// Release the notifier, then shut down and/or close as requested.
    ///
    /// The two actions are independent; both may fire.
    async fn finish(
        &self,
        after: AfterChainDone,
        directives: ChainDirectives,
        report: &mut ChainReport,
    ) {
        if let Err(err) = self.notifier.close().await {
            error!(error = %err, "failed to release notifier");
        }

        if directives.shutdown || after == AfterChainDone::Shutdown {
            report.shutdown_requested = true;
            match self.system.shutdown(self.timings.shutdown_delay) {
                Ok(()) => info!(delay = ?self.timings.shutdown_delay, "system shutdown scheduled"),
                Err(err) => error!(error = %err, "failed to schedule system shutdown"),
            }
        }

        if directives.close || after == AfterChainDone::CloseWindow {
            report.close_requested = true;
            info!(delay = ?self.timings.close_delay, "closing window");
            sleep(self.timings.close_delay).await;
            self.system.exit(0);
        }
    }
}
