//! # Shared Channels - In-Process Messaging Core
//!
//! Lets independent components exchange discrete messages through named
//! channels, optionally intercepted, optionally filtered, and optionally
//! driven by a timed polling loop that bridges a pull-based source to a
//! push-based consumer.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  receive()  ┌──────────────────┐  send(timeout)  ┌──────────┐
//! │ Pollable     │ ──────────► │ Exchange         │ ──────────────► │ Endpoint │
//! │ Source       │             │ Template         │                 │ (target) │
//! └──────────────┘             └──────────────────┘                 └──────────┘
//!                                      ▲
//!                                      │ visit_endpoint() per tick
//!                              ┌──────────────────┐
//!                              │ Endpoint Poller  │
//!                              └──────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - A buffered message is removed exactly once, by a receive or a purge.
//! - `clear`/`purge` work on an atomic snapshot of a channel's buffer.
//! - Interceptors run in registration order and are never reordered.
//! - Timeouts and vetoes are `false`/`None`; only structural
//!   misconfiguration is an error ([`ConfigurationError`]).

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod channel;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod ports;

// Re-export main types
pub use channel::{
    BufferedChannel, ChannelPurger, ChannelStats, InterceptorChain, MessageSelectingInterceptor,
    MessageStream, PriorityChannel, QueueChannel, TracingInterceptor,
};
pub use config::{ChannelConfig, PollerConfig};
pub use domain::{
    HeaderValueSelector, Message, MessageBuilder, MessageHeaders, MessagePriority,
    MessageSelector, MessageSelectorChain, Timeout, UnexpiredMessageSelector, VotingStrategy,
};
pub use endpoint::{
    BridgeEndpoint, ChannelSource, EndpointPoller, EndpointVisitor, FnSource,
    MessageExchangeTemplate, PollingTask,
};
pub use error::ConfigurationError;
pub use ports::{
    ChannelInterceptor, MessageChannel, MessageEndpoint, MessageSource, PollableChannel,
    PollableSource, SubscribableSource,
};

/// Default period between poll ticks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default upper bound on messages moved per endpoint per tick.
pub const DEFAULT_MAX_MESSAGES_PER_POLL: usize = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_poll_interval() {
        assert_eq!(DEFAULT_POLL_INTERVAL_MS, 1000);
    }

    #[test]
    fn test_default_max_messages() {
        assert_eq!(DEFAULT_MAX_MESSAGES_PER_POLL, 1);
    }
}
