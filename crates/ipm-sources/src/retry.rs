use std::thread;
use std::time::Duration;

use ipm_core::Backoff;
use tracing::warn;

use crate::error::SourceResult;

/// Retry schedule for transient source failures.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: usize,
    /// Waits between attempts
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    /// Three retries after 1 s, 10 s and 100 s.
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Backoff::new(Duration::from_secs(1), 10, Duration::from_secs(100)),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            retries: 0,
            backoff: Backoff::new(Duration::ZERO, 1, Duration::ZERO),
        }
    }

    /// Runs `op` under this policy, sleeping on the current thread.
    pub fn run<T>(&self, op: impl FnMut() -> SourceResult<T>) -> SourceResult<T> {
        with_retry(self, thread::sleep, op)
    }
}

/// Runs `op`, retrying transient failures on `policy`'s schedule.
///
/// Non-transient errors and the error of the last attempt are returned as-is.
pub fn with_retry<T>(
    policy: &RetryPolicy,
    mut sleep: impl FnMut(Duration),
    mut op: impl FnMut() -> SourceResult<T>,
) -> SourceResult<T> {
    let mut delays = policy.backoff.clone();
    let mut attempt = 0;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt < policy.retries => {
                let delay = delays.next().unwrap_or_default();
                attempt += 1;
                warn!(error = %e, attempt, retries = policy.retries, ?delay, "source error, retrying");
                sleep(delay);
            }
            Err(e) => return Err(e),
        }
    }
}
