//! Error types for the messaging core.
//!
//! Only structural misconfiguration is an error. A send or receive that
//! times out, or an interceptor that vetoes a message, is reported through
//! the `bool` / `Option` result of the operation instead.

use thiserror::Error;

/// Structural misuse of channels, purgers or endpoints.
///
/// These are never retried. They surface to the caller with the offending
/// endpoint or channel identified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A purger was built without any channel.
    #[error("at least one channel is required")]
    NoChannels,

    /// A purger was handed an absent channel reference.
    #[error("channel at position {index} must not be absent")]
    MissingChannel { index: usize },

    /// The endpoint has no source to poll.
    #[error("unable to poll for endpoint '{endpoint}', source is absent")]
    MissingSource { endpoint: String },

    /// The endpoint's source only pushes and cannot be polled.
    #[error("unable to poll for endpoint '{endpoint}', source is not pollable")]
    SourceNotPollable { endpoint: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
