//! # Request pacing
//!
//! GitHub limits how many API calls a token can make. The dashboard stays under
//! that limit by spacing its requests: every HTTP request the
//! [`GitHubProvider`] sends, each page of a listing included, first passes a
//! shared [`RequestGate`]. The gate enforces a minimum interval between any two
//! requests, no matter how many repositories are polled in parallel.
//!
//! [`GitHubProvider`]: crate::github::GitHubProvider

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[cfg(test)]
#[path = "pacing_tests.rs"]
mod tests;

/// A global minimum-interval gate for outgoing API calls.
///
/// Waiters are served in FIFO order. A gate with a zero interval never waits,
/// which is what tests use.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use pr_dashboard_developer_platforms::pacing::RequestGate;
///
/// # #[tokio::main]
/// # async fn main() {
/// let gate = RequestGate::unthrottled();
/// gate.wait().await;
/// assert_eq!(gate.min_interval(), Duration::ZERO);
/// # }
/// ```
#[derive(Debug)]
pub struct RequestGate {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestGate {
    /// Creates a gate that separates calls by at least `min_interval`.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Creates a gate that lets every call through immediately.
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the next call is allowed and records it as made.
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        // The lock is held while sleeping so concurrent callers queue up behind
        // each other instead of all firing once the interval has passed.
        let mut last_request = self.last_request.lock().await;
        if let Some(previous) = *last_request {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                debug!(
                    delay_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "Delaying API call to respect the request interval"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_request = Some(Instant::now());
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::unthrottled()
    }
}
