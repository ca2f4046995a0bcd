//! Configuration for channels and polling endpoints.
//!
//! Timeouts are signed milliseconds: `0` means a single non-blocking
//! attempt, a negative value means wait indefinitely.

use crate::domain::timeout::Timeout;
use crate::error::ConfigurationError;
use crate::{DEFAULT_MAX_MESSAGES_PER_POLL, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pollable channel configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Maximum buffered messages; `None` is unbounded.
    pub capacity: Option<usize>,
}

impl ChannelConfig {
    /// Bounded channel holding at most `capacity` messages.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
        }
    }

    /// Reject a zero capacity: such a channel could never accept a send.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.capacity == Some(0) {
            return Err(ConfigurationError::InvalidConfig(
                "channel capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Polling endpoint configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Send timeout used when forwarding a pulled message.
    pub send_timeout_ms: i64,
    /// Period between poll ticks.
    pub poll_interval_ms: u64,
    /// Delay before the first tick.
    pub initial_delay_ms: u64,
    /// Upper bound on messages moved per endpoint per tick.
    pub max_messages_per_poll: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: 0,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            initial_delay_ms: 0,
            max_messages_per_poll: DEFAULT_MAX_MESSAGES_PER_POLL,
        }
    }
}

impl PollerConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "poll_interval_ms cannot be 0".to_string(),
            ));
        }
        if self.max_messages_per_poll == 0 {
            return Err(ConfigurationError::InvalidConfig(
                "max_messages_per_poll cannot be 0".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn send_timeout(&self) -> Timeout {
        Timeout::from_millis(self.send_timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Builder-style method to set the send timeout
    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Timeout) -> Self {
        self.send_timeout_ms = timeout.as_millis();
        self
    }

    /// Builder-style method to set the poll interval
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Builder-style method to set the initial delay
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Builder-style method to set the per-tick message bound
    #[must_use]
    pub fn with_max_messages_per_poll(mut self, max: usize) -> Self {
        self.max_messages_per_poll = max;
        self
    }
}
