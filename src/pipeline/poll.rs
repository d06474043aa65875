// ABOUTME: Bounded polling loop for conditions with no push notification.
// ABOUTME: Probes immediately, then once per interval until ready or deadline.

use std::future::Future;
use std::time::{Duration, Instant};

/// Result of a single probe attempt.
///
/// `Error` is distinguished from `NotYetReady` for diagnostics but is retried
/// the same way: a transient probe failure must not abort the wait before the
/// deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult<T> {
    Ready(T),
    NotYetReady,
    Error(String),
}

/// Final result of a bounded poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Success(T),
    TimedOut,
}

/// Invoke `probe` once immediately, then once per `interval`, until it
/// returns `Ready` or the deadline elapses.
///
/// The deadline is the only cancellation mechanism. No probe fires past the
/// deadline boundary. Waiting is cooperative via `tokio::time::sleep`.
pub async fn poll<T, F, Fut>(
    mut probe: F,
    interval: Duration,
    deadline: Duration,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollResult<T>>,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;
    let mut errors: u32 = 0;

    loop {
        attempts += 1;
        match probe().await {
            PollResult::Ready(value) => {
                tracing::debug!(attempts, "probe ready");
                return PollOutcome::Success(value);
            }
            PollResult::NotYetReady => {
                tracing::debug!(attempts, "probe not yet ready");
            }
            PollResult::Error(reason) => {
                errors += 1;
                tracing::warn!(attempts, errors, "probe error: {reason}");
            }
        }

        if started.elapsed() >= deadline {
            return PollOutcome::TimedOut;
        }
        tokio::time::sleep(interval).await;
        // The sleep may overshoot; never probe past the deadline.
        if started.elapsed() >= deadline {
            return PollOutcome::TimedOut;
        }
    }
}
