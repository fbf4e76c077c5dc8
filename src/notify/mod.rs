// src/notify/mod.rs

//! Notification adapters.
//!
//! The chain driver reports step starts and finishes through a [`Notifier`]
//! it receives at construction. Delivery failures are logged by the driver
//! and never stop a chain.

mod desktop;
mod noop;

pub use desktop::DesktopNotifier;
pub use noop::NoOpNotifier;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("close failed: {0}")]
    CloseFailed(String),
}

/// Adapter for sending notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message.
    async fn send(&self, content: &str) -> Result<(), NotifyError>;

    /// Release whatever the notifier holds; called once at the end of a chain.
    async fn close(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}
