// src/exec/process_table.rs

//! Name-based view of the OS process table.
//!
//! The engine never tracks scripts by pid: a launcher may hand its work to a
//! freshly spawned process and exit, so "is the script still running" is
//! answered by looking for a process with the configured *name*.
//!
//! Every lookup is best-effort. Processes that vanish between enumeration
//! and inspection, zombies, and processes we may not inspect are simply not
//! matches; nothing here returns an error.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Mutex;

use sysinfo::{
    Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind,
};
use tracing::{debug, warn};

/// Result of killing a single process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillStatus {
    /// A kill signal was delivered.
    Killed,
    /// The process had already exited. Counts as success.
    Gone,
    /// The OS refused (permissions, protected process).
    Denied,
}

/// Query and kill processes by exact name.
///
/// Implementors provide [`find`](ProcessTable::find) and
/// [`kill_pid`](ProcessTable::kill_pid); the name-level operations are
/// provided so the empty-name short-circuit holds for every backend.
pub trait ProcessTable: Send + Sync {
    /// Pids of live processes whose name equals `name` exactly.
    fn find(&self, name: &str) -> Vec<u32>;

    /// Force-terminate one process.
    fn kill_pid(&self, pid: u32) -> KillStatus;

    /// Whether any process named `name` is running.
    ///
    /// An empty name is never running and does not touch the OS.
    fn exists(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        !self.find(name).is_empty()
    }

    /// Force-terminate every process named `name`, returning how many were
    /// killed. Already-exited and protected processes are skipped.
    fn kill(&self, name: &str) -> usize {
        if name.is_empty() {
            return 0;
        }

        let mut killed = 0;
        for pid in self.find(name) {
            match self.kill_pid(pid) {
                KillStatus::Killed => killed += 1,
                KillStatus::Gone => {
                    debug!(process = %name, pid, "process already gone before kill");
                }
                KillStatus::Denied => {
                    warn!(process = %name, pid, "not allowed to kill process; skipping");
                }
            }
        }
        killed
    }
}

/// Production [`ProcessTable`] backed by `sysinfo`.
///
/// The `System` snapshot is reused between calls and refreshed on every
/// lookup, dropping dead entries.
#[derive(Debug)]
pub struct SystemProcessTable {
    system: Mutex<System>,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    fn with_system<T>(&self, f: impl FnOnce(&mut System) -> T) -> T {
        // A panic while holding the lock leaves a snapshot that the next
        // refresh overwrites anyway.
        let mut guard = self
            .system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcessTable {
    fn find(&self, name: &str) -> Vec<u32> {
        let wanted = OsStr::new(name);
        self.with_system(|system| {
            system.refresh_processes_specifics(
                ProcessesToUpdate::All,
                true,
                ProcessRefreshKind::nothing()
                    .with_exe(UpdateKind::OnlyIfNotSet)
                    .with_cmd(UpdateKind::OnlyIfNotSet),
            );
            system
                .processes()
                .iter()
                .filter(|(_, process)| {
                    process.status() != ProcessStatus::Zombie && has_name(process, wanted)
                })
                .map(|(pid, _)| pid.as_u32())
                .collect()
        })
    }

    fn kill_pid(&self, pid: u32) -> KillStatus {
        let pid = Pid::from_u32(pid);
        self.with_system(|system| {
            let Some(process) = system.process(pid) else {
                return KillStatus::Gone;
            };
            if process.kill() {
                return KillStatus::Killed;
            }

            // The signal failed: either the process exited in the meantime
            // or we are not allowed to touch it.
            system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            match system.process(pid) {
                Some(process) if process.status() != ProcessStatus::Zombie => KillStatus::Denied,
                _ => KillStatus::Gone,
            }
        })
    }
}

/// Whether `process` goes by `wanted`.
///
/// On Linux `name()` is the kernel's `comm`, cut to 15 bytes, so the file
/// name of the executable and of `argv[0]` are checked as well.
fn has_name(process: &Process, wanted: &OsStr) -> bool {
    if process.name() == wanted {
        return true;
    }
    if process
        .exe()
        .and_then(Path::file_name)
        .is_some_and(|file| file == wanted)
    {
        return true;
    }
    process
        .cmd()
        .first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .is_some_and(|file| file == wanted)
}
