// src/engine/cleanup.rs

//! Post-step cleanup: kill the launched handle and/or leftover processes.

use tracing::{info, warn};

use crate::config::StepConfig;
use crate::exec::{ChildHandle, ProcessTable};

/// What cleanup actually did, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    /// The launched handle accepted a kill request.
    pub handle_killed: bool,
    /// Processes killed by the script's process name.
    pub script_killed: usize,
    /// Processes killed by the companion's process name.
    pub game_killed: usize,
}

pub struct CleanupExecutor<'a> {
    table: &'a dyn ProcessTable,
}

impl<'a> CleanupExecutor<'a> {
    pub fn new(table: &'a dyn ProcessTable) -> Self {
        Self { table }
    }

    /// Run the step's cleanup settings.
    ///
    /// The script branch and the companion branch are independent; nothing
    /// that fails in one keeps the other from running, and no failure is
    /// returned.
    pub fn cleanup(&self, handle: Option<&mut dyn ChildHandle>, step: &StepConfig) -> CleanupReport {
        let mut report = CleanupReport::default();

        if step.kill_script_after_done {
            info!(step = step.idx, process = ?step.script_process(), "closing script process");

            if let Some(handle) = handle {
                match handle.kill() {
                    Ok(()) => report.handle_killed = true,
                    Err(err) => {
                        warn!(step = step.idx, error = %err, "failed to kill launched script process");
                    }
                }
            }

            if let Some(name) = step.script_process() {
                report.script_killed = self.table.kill(name);
            }
        }

        if step.kill_game_after_done {
            info!(step = step.idx, process = ?step.game_process(), "closing game process");
            if let Some(name) = step.game_process() {
                report.game_killed = self.table.kill(name);
            }
        }

        report
    }
}
