// src/exec/backend.rs

//! Pluggable process spawning abstraction.
//!
//! The launcher talks to a `ProcessSpawner` instead of `tokio::process`
//! directly. This makes it easy to swap in a fake spawner in tests (one that
//! fails on demand or exits after a simulated delay) while keeping the
//! production implementation here.
//!
//! - `TokioSpawner` is the default implementation used by `scriptchain`.
//! - Tests can provide their own `ProcessSpawner` whose children report
//!   whatever exit codes the scenario needs.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;

use crate::config::StepConfig;

/// Everything needed to start one step's process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl LaunchCommand {
    /// `[absolute script_path] + whitespace-split(script_arguments)`, run
    /// from the script's own directory.
    pub fn from_step(step: &StepConfig) -> Self {
        Self {
            program: step.script_location(),
            args: step.argument_tokens(),
            working_dir: step.working_dir(),
        }
    }
}

/// A process started by a [`ProcessSpawner`].
pub trait ChildHandle: Send {
    /// OS pid, if the process is still known to us.
    fn id(&self) -> Option<u32>;

    /// Non-blocking exit check.
    ///
    /// `Ok(None)` while running; `Ok(Some(code))` once exited. Termination
    /// by signal is reported as `-1`.
    fn try_exit_code(&mut self) -> io::Result<Option<i32>>;

    /// Ask the OS to kill the process. Does not wait for it to exit.
    fn kill(&mut self) -> io::Result<()>;
}

/// Trait abstracting how step processes are started.
///
/// Production code uses [`TokioSpawner`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, command: &LaunchCommand) -> Result<Box<dyn ChildHandle>>;
}

/// Real spawner used in production.
///
/// The child inherits stdio so a script's console output shows up in the
/// chain's window. It is **not** killed when the handle is dropped: whether
/// a script outlives its step is decided by the cleanup settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl TokioSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for TokioSpawner {
    fn spawn(&self, command: &LaunchCommand) -> Result<Box<dyn ChildHandle>> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .kill_on_drop(false);
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning process for '{}'", command.program.display()))?;

        Ok(Box::new(TokioChild { child }))
    }
}

struct TokioChild {
    child: tokio::process::Child,
}

impl ChildHandle for TokioChild {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_exit_code(&mut self) -> io::Result<Option<i32>> {
        Ok(self
            .child
            .try_wait()?
            .map(|status| status.code().unwrap_or(-1)))
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }
}
