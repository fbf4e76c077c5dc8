// src/engine/mod.rs

//! Execution engine for scriptchain.
//!
//! This module ties together:
//! - the bounded poll loop shared by launcher and detector ([`poll`])
//! - completion detection by process name ([`detector`])
//! - post-step cleanup ([`cleanup`])
//! - the chain driver that runs steps one after another ([`driver`])
//!
//! Launching itself lives in [`crate::exec`].

use std::time::Duration;

/// Every wait the engine performs.
///
/// The defaults are what a real chain uses; tests shrink them or run on a
/// paused tokio clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Cadence of launch checks and process-table polling.
    pub poll_interval: Duration,
    /// How long launch attempts may keep failing before a step is abandoned.
    pub launch_window: Duration,
    /// How long a launched handle must survive to count as started.
    pub survival_time: Duration,
    /// Pause between two steps.
    pub step_cooldown: Duration,
    /// Delay handed to the OS shutdown command.
    pub shutdown_delay: Duration,
    /// Pause before the process exits for a close-window directive.
    pub close_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            launch_window: Duration::from_secs(20),
            survival_time: Duration::from_secs(5),
            step_cooldown: Duration::from_secs(10),
            shutdown_delay: Duration::from_secs(60),
            close_delay: Duration::from_secs(5),
        }
    }
}

pub mod cleanup;
pub mod detector;
pub mod driver;
pub mod poll;

pub use cleanup::{CleanupExecutor, CleanupReport};
pub use detector::{evaluate_policy, Completion, CompletionDetector, RoleWatch};
pub use driver::{ChainDirectives, ChainDriver, ChainReport, ChainState, StepReport, StepStatus};
pub use poll::{PollOutcome, PollPolicy};
