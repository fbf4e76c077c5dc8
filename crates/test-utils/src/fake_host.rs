use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use scriptchain::errors::{Result, ScriptChainError};
use scriptchain::notify::{Notifier, NotifyError};
use scriptchain::system::SystemControl;

#[derive(Default)]
struct NotifierState {
    sent: Vec<String>,
    closes: usize,
    fail_send: bool,
    fail_close: bool,
}

/// Records every message; can be told to fail.
#[derive(Clone, Default)]
pub struct FakeNotifier {
    inner: Arc<Mutex<NotifierState>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.inner.lock().unwrap().fail_send = true;
        notifier
    }

    pub fn with_failing_close(self) -> Self {
        self.inner.lock().unwrap().fail_close = true;
        self
    }

    /// Messages passed to `send`, including ones that "failed".
    pub fn sent(&self) -> Vec<String> {
        self.inner.lock().unwrap().sent.clone()
    }

    pub fn closes(&self) -> usize {
        self.inner.lock().unwrap().closes
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, content: &str) -> std::result::Result<(), NotifyError> {
        let mut state = self.inner.lock().unwrap();
        state.sent.push(content.to_string());
        if state.fail_send {
            return Err(NotifyError::SendFailed("simulated send failure".to_string()));
        }
        Ok(())
    }

    async fn close(&self) -> std::result::Result<(), NotifyError> {
        let mut state = self.inner.lock().unwrap();
        state.closes += 1;
        if state.fail_close {
            return Err(NotifyError::CloseFailed("simulated close failure".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct SystemState {
    shutdowns: Vec<Duration>,
    exits: Vec<i32>,
    fail_shutdown: bool,
}

/// Records shutdown and exit requests instead of acting on them.
#[derive(Clone, Default)]
pub struct FakeSystem {
    inner: Arc<Mutex<SystemState>>,
}

impl FakeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_shutdown(self) -> Self {
        self.inner.lock().unwrap().fail_shutdown = true;
        self
    }

    pub fn shutdowns(&self) -> Vec<Duration> {
        self.inner.lock().unwrap().shutdowns.clone()
    }

    pub fn exits(&self) -> Vec<i32> {
        self.inner.lock().unwrap().exits.clone()
    }
}

impl SystemControl for FakeSystem {
    fn shutdown(&self, delay: Duration) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.shutdowns.push(delay);
        if state.fail_shutdown {
            return Err(ScriptChainError::Other(anyhow::anyhow!(
                "simulated shutdown failure"
            )));
        }
        Ok(())
    }

    fn exit(&self, code: i32) {
        self.inner.lock().unwrap().exits.push(code);
    }
}
