//! Exponential delay schedule.
//!
//! Used for busy polling of slow engine commands and for retrying transient
//! data-source failures. The schedule is a plain iterator so callers decide
//! how to wait, and tests can inspect the delays without sleeping.

use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct Backoff {
    next: Duration,
    factor: u32,
    cap: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, factor: u32, cap: Duration) -> Self {
        Self {
            next: initial.min(cap),
            factor: factor.max(1),
            cap,
        }
    }

    /// Busy-poll schedule for slow engine commands: 1 ms, doubling, capped at 2 s.
    pub fn busy_poll() -> Self {
        Self::new(Duration::from_millis(1), 2, Duration::from_secs(2))
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = current.saturating_mul(self.factor).min(self.cap);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_poll_doubles_then_caps() {
        let delays: Vec<u128> = Backoff::busy_poll().take(14).map(|d| d.as_millis()).collect();
        assert_eq!(
            delays,
            vec![1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2000, 2000, 2000]
        );
    }

    #[test]
    fn initial_delay_never_exceeds_cap() {
        let mut b = Backoff::new(Duration::from_secs(10), 10, Duration::from_secs(3));
        assert_eq!(b.next(), Some(Duration::from_secs(3)));
        assert_eq!(b.next(), Some(Duration::from_secs(3)));
    }
}
