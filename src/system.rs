// src/system.rs

//! End-of-chain host actions: OS shutdown and process exit.

use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::errors::Result;

/// Host-level side effects the chain driver may trigger when a chain ends.
pub trait SystemControl: Send + Sync {
    /// Ask the OS to power off after `delay`. Returns once the request is
    /// issued; the shutdown itself happens later.
    fn shutdown(&self, delay: Duration) -> Result<()>;

    /// Terminate the current process.
    fn exit(&self, code: i32);
}

/// Production [`SystemControl`] acting on the real machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSystem;

impl HostSystem {
    pub fn new() -> Self {
        Self
    }
}

impl SystemControl for HostSystem {
    fn shutdown(&self, delay: Duration) -> Result<()> {
        let args = shutdown_args(delay);
        info!(?args, "requesting system shutdown");

        Command::new("shutdown")
            .args(&args)
            .stdin(Stdio::null())
            .spawn()
            .context("spawning shutdown command")?;
        Ok(())
    }

    fn exit(&self, code: i32) {
        info!(code, "exiting");
        std::process::exit(code);
    }
}

/// Arguments for the platform `shutdown` command.
///
/// Windows takes seconds; the Unix command only takes whole minutes, so the
/// delay is rounded up there.
pub fn shutdown_args(delay: Duration) -> Vec<String> {
    let secs = delay.as_secs();
    if cfg!(windows) {
        vec!["/s".to_string(), "/t".to_string(), secs.to_string()]
    } else if secs == 0 {
        vec!["-h".to_string(), "now".to_string()]
    } else {
        vec!["-h".to_string(), format!("+{}", secs.div_ceil(60))]
    }
}
