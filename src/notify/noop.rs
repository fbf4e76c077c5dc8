// src/notify/noop.rs

//! No-op notification adapter.

use async_trait::async_trait;

use super::{Notifier, NotifyError};

/// Notification adapter that silently discards all notifications.
///
/// Used when notifications are disabled on the command line.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifier;

impl NoOpNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn send(&self, _content: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
