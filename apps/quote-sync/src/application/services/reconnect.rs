//! Reconnection Policy
//!
//! Fixed-delay retry for the push channel. Every close waits the same
//! delay before the next attempt; there is no backoff growth and no
//! attempt limit, so a best-effort live display keeps trying forever.

use std::time::Duration;

/// Default wait between a close and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Configuration for reconnection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Wait before each reconnection attempt.
    pub delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

impl ReconnectConfig {
    /// Create a configuration with a custom delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

/// Reconnection policy with a constant delay.
///
/// # Example
///
/// ```rust
/// use quote_sync::application::services::reconnect::{ReconnectConfig, ReconnectPolicy};
/// use std::time::Duration;
///
/// let mut policy = ReconnectPolicy::new(ReconnectConfig::new(Duration::from_millis(250)));
///
/// assert_eq!(policy.next_delay(), Duration::from_millis(250));
/// assert_eq!(policy.next_delay(), Duration::from_millis(250));
/// assert_eq!(policy.attempt_count(), 2);
///
/// // Simulate successful connection
/// policy.reset();
/// assert_eq!(policy.attempt_count(), 0);
/// ```
#[derive(Debug)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    attempt_count: u32,
}

impl ReconnectPolicy {
    /// Create a new reconnection policy.
    #[must_use]
    pub const fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempt_count: 0,
        }
    }

    /// Record another attempt and return how long to wait before it.
    #[must_use]
    pub const fn next_delay(&mut self) -> Duration {
        self.attempt_count = self.attempt_count.saturating_add(1);
        self.config.delay
    }

    /// Reset the attempt counter after a successful connection.
    pub const fn reset(&mut self) {
        self.attempt_count = 0;
    }

    /// Consecutive attempts since the last successful connection.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_one_second() {
        let config = ReconnectConfig::default();
        assert_eq!(config.delay, Duration::from_secs(1));
    }

    #[test]
    fn delay_never_grows() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::new(Duration::from_millis(100)));

        for _ in 0..50 {
            assert_eq!(policy.next_delay(), Duration::from_millis(100));
        }
        assert_eq!(policy.attempt_count(), 50);
    }

    #[test]
    fn unlimited_attempts() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::default());

        for _ in 0..10_000 {
            let _ = policy.next_delay();
        }
        assert_eq!(policy.attempt_count(), 10_000);
    }

    #[test]
    fn reset_clears_attempts() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::default());
        let _ = policy.next_delay();
        let _ = policy.next_delay();
        assert_eq!(policy.attempt_count(), 2);

        policy.reset();
        assert_eq!(policy.attempt_count(), 0);
        assert_eq!(policy.next_delay(), Duration::from_secs(1));
    }
}
