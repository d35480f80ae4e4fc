//! # Reconnect Backoff
//!
//! Shared reconnect discipline for every bus-facing component: exponential
//! delay growth with a capped ceiling, reset to the initial delay on a
//! successful (re)connect.

use std::time::Duration;

/// Exponential backoff state for a reconnect loop.
///
/// ```
/// use shared_bus::ReconnectPolicy;
/// use std::time::Duration;
///
/// let mut policy = ReconnectPolicy::default();
/// assert_eq!(policy.next_delay(), Duration::from_millis(500));
/// assert_eq!(policy.next_delay(), Duration::from_secs(1));
/// policy.reset();
/// assert_eq!(policy.next_delay(), Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    initial: Duration,
    /// Ceiling the delay never exceeds.
    max: Duration,
    /// Next delay to hand out.
    current: Duration,
}

impl ReconnectPolicy {
    /// Create a policy with explicit bounds.
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// The delay to sleep before the next attempt; doubles on each call,
    /// capped at the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Restore the initial delay after a successful connect.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// The configured ceiling.
    #[must_use]
    pub fn max_delay(&self) -> Duration {
        self.max
    }
}

impl Default for ReconnectPolicy {
    /// 500ms initial delay, capped at 30s.
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(30))
    }
}
