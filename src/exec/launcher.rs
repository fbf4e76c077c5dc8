// src/exec/launcher.rs

//! Start a step's process and decide whether the launch "took".
//!
//! Many scripts are started through thin bootstrap executables that spawn
//! the real workload and exit 0 right away, so a launch is judged by
//! survival time rather than by the first exit status:
//!
//! - still running, or exited with code 0: the launch is surviving;
//! - exited non-zero: the handle is dropped and the launch is retried;
//! - surviving for `survival_time` since its own creation: success.
//!
//! The whole thing is bounded by `launch_window` from the first attempt.

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{InvalidStep, StepConfig};
use crate::engine::poll::{PollOutcome, PollPolicy};
use crate::engine::Timings;
use crate::exec::backend::{ChildHandle, LaunchCommand, ProcessSpawner};

/// A launch that survived long enough to be trusted.
pub struct LaunchedProcess {
    pub handle: Box<dyn ChildHandle>,
    /// When the first launch attempt was made. The step timeout counts from
    /// here.
    pub started_at: Instant,
}

impl std::fmt::Debug for LaunchedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchedProcess")
            .field("pid", &self.handle.id())
            .field("started_at", &self.started_at)
            .finish()
    }
}

#[derive(Debug)]
pub enum LaunchResult {
    /// The step failed validation; nothing was started.
    Skipped(InvalidStep),
    Launched(LaunchedProcess),
    /// No attempt survived within the launch window.
    Failed,
    Cancelled,
}

pub struct Launcher<'a> {
    spawner: &'a dyn ProcessSpawner,
    timings: &'a Timings,
    cancel: &'a CancellationToken,
}

impl<'a> Launcher<'a> {
    pub fn new(
        spawner: &'a dyn ProcessSpawner,
        timings: &'a Timings,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            spawner,
            timings,
            cancel,
        }
    }

    pub async fn launch(&self, step: &StepConfig) -> LaunchResult {
        if let Err(reason) = step.validate() {
            warn!(
                step = step.idx,
                script = %step.script_path,
                %reason,
                "invalid step configuration; skipping"
            );
            return LaunchResult::Skipped(reason);
        }

        let command = LaunchCommand::from_step(step);
        let survival_time = self.timings.survival_time;
        let policy = PollPolicy::new(self.timings.poll_interval, self.timings.launch_window);
        let started_at = Instant::now();

        // The handle currently being watched and when it was created.
        let mut attempt: Option<(Box<dyn ChildHandle>, Instant)> = None;

        let outcome = policy
            .run(started_at, self.cancel, |now| {
                let Some((handle, created_at)) = attempt.as_mut() else {
                    match self.spawner.spawn(&command) {
                        Ok(handle) => {
                            info!(
                                step = step.idx,
                                script = %command.program.display(),
                                pid = ?handle.id(),
                                "created script process"
                            );
                            attempt = Some((handle, now));
                        }
                        Err(err) => {
                            error!(
                                step = step.idx,
                                script = %command.program.display(),
                                error = %format!("{err:#}"),
                                "failed to create script process; retrying"
                            );
                        }
                    }
                    return None;
                };

                let surviving = match handle.try_exit_code() {
                    Ok(None) => {
                        debug!(step = step.idx, "script process running");
                        true
                    }
                    Ok(Some(0)) => {
                        debug!(step = step.idx, "script process exited successfully");
                        true
                    }
                    Ok(Some(code)) => {
                        warn!(
                            step = step.idx,
                            exit_code = code,
                            "script process failed; launching again"
                        );
                        false
                    }
                    Err(err) => {
                        warn!(
                            step = step.idx,
                            error = %err,
                            "could not query script process status; assuming it is running"
                        );
                        true
                    }
                };

                if !surviving {
                    attempt = None;
                    return None;
                }

                (now.saturating_duration_since(*created_at) >= survival_time).then_some(())
            })
            .await;

        match outcome {
            PollOutcome::Done(()) => match attempt.take() {
                Some((handle, _)) => {
                    info!(step = step.idx, script = %command.program.display(), "script process launched");
                    LaunchResult::Launched(LaunchedProcess { handle, started_at })
                }
                None => LaunchResult::Failed,
            },
            PollOutcome::Expired => {
                error!(
                    step = step.idx,
                    script = %command.program.display(),
                    window = ?self.timings.launch_window,
                    "script process could not be launched"
                );
                LaunchResult::Failed
            }
            PollOutcome::Cancelled => {
                info!(step = step.idx, "launch cancelled");
                LaunchResult::Cancelled
            }
        }
    }
}
