// src/engine/detector.rs

//! Decide when a launched step is done by watching process names.
//!
//! Two roles are watched: the script's own process and an optional
//! companion ("game"). A role only counts as *closed* after it has been seen
//! at least once and then disappears, so a companion that never started is
//! not mistaken for one that already exited.

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::StepConfig;
use crate::engine::poll::{PollOutcome, PollPolicy};
use crate::engine::Timings;
use crate::exec::ProcessTable;
use crate::types::CompletionPolicy;

/// Why the wait for a step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    ScriptClosed,
    GameClosed,
    /// The step's policy wasn't recognised; treated as done right away.
    UnknownPolicy(String),
    TimedOut,
    Cancelled,
}

impl Completion {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Completion::TimedOut)
    }
}

/// Edge-trigger tracker for one watched process name.
///
/// `unseen -> seen -> closed`. Once seen, a role stays seen for the whole
/// detection window, so `closed` keeps reporting `true` while the process
/// remains absent; callers act on the first such tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoleWatch {
    ever_existed: bool,
}

impl RoleWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observation; returns whether the role is closed.
    pub fn observe(&mut self, currently_exists: bool) -> bool {
        let closed = self.ever_existed && !currently_exists;
        self.ever_existed |= currently_exists;
        closed
    }

    pub fn ever_existed(&self) -> bool {
        self.ever_existed
    }
}

/// Apply a completion policy to this tick's closed flags.
///
/// Returns `None` when the step should keep waiting.
pub fn evaluate_policy(
    policy: &CompletionPolicy,
    game_closed: bool,
    script_closed: bool,
) -> Option<Completion> {
    match policy {
        CompletionPolicy::GameOrScriptClosed => {
            if game_closed {
                Some(Completion::GameClosed)
            } else if script_closed {
                Some(Completion::ScriptClosed)
            } else {
                None
            }
        }
        CompletionPolicy::GameClosed => game_closed.then_some(Completion::GameClosed),
        CompletionPolicy::ScriptClosed => script_closed.then_some(Completion::ScriptClosed),
        CompletionPolicy::Unknown(raw) => Some(Completion::UnknownPolicy(raw.clone())),
    }
}

pub struct CompletionDetector<'a> {
    table: &'a dyn ProcessTable,
    timings: &'a Timings,
    cancel: &'a CancellationToken,
}

impl<'a> CompletionDetector<'a> {
    pub fn new(
        table: &'a dyn ProcessTable,
        timings: &'a Timings,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            table,
            timings,
            cancel,
        }
    }

    /// Poll until the step's policy is satisfied or its timeout (counted
    /// from `started_at`) runs out.
    pub async fn wait_until_done(&self, step: &StepConfig, started_at: Instant) -> Completion {
        let policy = PollPolicy::new(self.timings.poll_interval, step.run_timeout());
        let script_name = step.script_process();
        let game_name = step.game_process();
        let game_display = step.game_display();
        let script_display = step.script_display();

        let mut script = RoleWatch::new();
        let mut game = RoleWatch::new();

        let outcome = policy
            .run(started_at, self.cancel, |_now| {
                let game_seen_before = game.ever_existed();
                let game_exists = game_name.is_some_and(|name| self.table.exists(name));
                let game_closed = game.observe(game_exists);

                if let Some(game_label) = &game_display {
                    if !game.ever_existed() {
                        debug!(step = step.idx, game = %game_label, "waiting for game to start");
                    } else if !game_seen_before {
                        info!(step = step.idx, game = %game_label, "game is running");
                    } else if game_closed {
                        info!(step = step.idx, game = %game_label, "game has exited");
                    }
                } else {
                    debug!(step = step.idx, policy = %step.check_done, "waiting for step to finish");
                }

                let script_seen_before = script.ever_existed();
                let script_exists = script_name.is_some_and(|name| self.table.exists(name));
                let script_closed = script.observe(script_exists);

                if script.ever_existed() && !script_seen_before {
                    info!(step = step.idx, script = %script_display, "script process observed");
                }

                let done = evaluate_policy(&step.check_done, game_closed, script_closed);
                match &done {
                    Some(Completion::GameClosed) => {
                        info!(step = step.idx, game = ?game_display, "game closed; step done");
                    }
                    Some(Completion::ScriptClosed) => {
                        info!(step = step.idx, script = %script_display, "script closed; step done");
                    }
                    Some(Completion::UnknownPolicy(raw)) => {
                        error!(step = step.idx, policy = %raw, "unknown check_done policy; treating step as done");
                    }
                    _ => {}
                }
                done
            })
            .await;

        match outcome {
            PollOutcome::Done(completion) => completion,
            PollOutcome::Expired => {
                error!(
                    step = step.idx,
                    script = %script_display,
                    timeout_secs = step.run_timeout_seconds,
                    "script run timed out"
                );
                Completion::TimedOut
            }
            PollOutcome::Cancelled => {
                info!(step = step.idx, "completion detection cancelled");
                Completion::Cancelled
            }
        }
    }
}
