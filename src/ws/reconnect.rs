//! Bounded reconnection policy for the push channel.
//!
//! The default policy never reconnects: an unexpected close leaves the
//! client `Disconnected` until the caller connects again. Setting
//! `max_retries` above zero enables exponential backoff between attempts.

use std::time::Duration;

/// Reconnection policy with exponential backoff.
///
/// # Default Values
///
/// - `max_retries`: 0 (disabled)
/// - `initial_delay`: 500ms
/// - `max_delay`: 10 seconds
/// - `multiplier`: 2.0
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Attempts after an unexpected close before giving up.
    pub max_retries: u32,
    /// Delay before the first attempt.
    pub initial_delay: Duration,
    /// Cap on the delay between attempts.
    pub max_delay: Duration,
    /// Growth factor applied per attempt.
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    /// A policy that never reconnects.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A policy retrying up to `max_retries` times.
    #[must_use]
    pub fn bounded(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
            ..Self::default()
        }
    }

    /// Returns `true` if at least one retry is allowed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Delay before attempt number `attempt` (zero-based):
    /// `initial_delay × multiplier^attempt`, capped at `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1.0)
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));
        let initial_ms = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);
        // Float-to-int `as` saturates, so an infinite factor lands on the cap.
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay_ms = (initial_ms as f64 * factor) as u64;
        Duration::from_millis(delay_ms).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disabled() {
        assert!(!ReconnectPolicy::default().is_enabled());
    }

    #[test]
    fn delay_grows_exponentially() {
        let policy =
            ReconnectPolicy::bounded(5, Duration::from_millis(100), Duration::from_secs(30));
        assert!(policy.is_enabled());
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn delay_is_capped() {
        let policy = ReconnectPolicy::bounded(50, Duration::from_secs(1), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(5));
    }
}
