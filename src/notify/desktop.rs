// src/notify/desktop.rs

//! Desktop notification adapter using notify-rust.

use async_trait::async_trait;
use tracing::debug;

use super::{Notifier, NotifyError};

const DEFAULT_SUMMARY: &str = "scriptchain";

#[derive(Clone, Debug)]
pub struct DesktopNotifier {
    summary: String,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            summary: DEFAULT_SUMMARY.to_string(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn send(&self, content: &str) -> Result<(), NotifyError> {
        let summary = self.summary.clone();
        let body = content.to_string();

        // `show()` blocks on some platforms; keep it off the runtime threads.
        let shown = tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .summary(&summary)
                .body(&body)
                .show()
                .map(|_| ())
                .map_err(|e| NotifyError::SendFailed(e.to_string()))
        })
        .await
        .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        if shown.is_ok() {
            debug!(content, "desktop notification sent");
        }
        shown
    }
}
