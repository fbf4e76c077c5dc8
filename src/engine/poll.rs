// src/engine/poll.rs

//! Bounded sleep-and-poll loop shared by the launcher and the detector.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

/// How a [`PollPolicy::run`] loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The tick closure reported success.
    Done(T),
    /// `max_duration` passed without success.
    Expired,
    /// The cancellation token fired.
    Cancelled,
}

/// Tick interval plus an overall deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_duration: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_duration: Duration) -> Self {
        Self {
            interval,
            max_duration,
        }
    }

    /// Call `tick` once per interval until it returns `Some`.
    ///
    /// Each iteration runs `tick(now)` first and only then checks the
    /// deadline (measured from `started_at`), so a success on the last tick
    /// wins over expiry and at least one tick always runs. Sleeping uses the
    /// tokio clock, so a paused test runtime fast-forwards through it.
    pub async fn run<T, F>(
        &self,
        started_at: Instant,
        cancel: &CancellationToken,
        mut tick: F,
    ) -> PollOutcome<T>
    where
        F: FnMut(Instant) -> Option<T>,
    {
        loop {
            if cancel.is_cancelled() {
                return PollOutcome::Cancelled;
            }

            let now = Instant::now();
            if let Some(value) = tick(now) {
                return PollOutcome::Done(value);
            }

            if now.saturating_duration_since(started_at) >= self.max_duration {
                return PollOutcome::Expired;
            }

            tokio::select! {
                _ = cancel.cancelled() => return PollOutcome::Cancelled,
                _ = sleep(self.interval) => {}
            }
        }
    }
}
