// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for starting the step scripts with
//! `tokio::process::Command` and for looking processes up by name.
//!
//! - [`backend`] provides the `ProcessSpawner` / `ChildHandle` traits and
//!   the concrete `TokioSpawner` used in production, which tests can replace
//!   with a fake implementation.
//! - [`launcher`] runs the launch/retry loop with its survival heuristic.
//! - [`process_table`] provides the `ProcessTable` trait (exists / kill by
//!   name) and the `sysinfo`-backed `SystemProcessTable`.

pub mod backend;
pub mod launcher;
pub mod process_table;

pub use backend::{ChildHandle, LaunchCommand, ProcessSpawner, TokioSpawner};
pub use launcher::{LaunchResult, LaunchedProcess, Launcher};
pub use process_table::{KillStatus, ProcessTable, SystemProcessTable};
