//! Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the core consumes: interceptors plugged into channels,
//! sources that feed endpoints, and the endpoints themselves.

use crate::domain::message::Message;
use crate::ports::inbound::MessageChannel;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Observer and guard around a channel's send and receive.
///
/// Every hook has a pass-through default, so implementations only override
/// what they need. Hooks run in registration order.
pub trait ChannelInterceptor<T>: Send + Sync {
    /// Inspect or replace the outgoing message. `None` vetoes the send:
    /// later interceptors and the buffer are skipped and `send` returns
    /// `false`.
    fn pre_send(&self, message: Message<T>, _channel: &str) -> Option<Message<T>> {
        Some(message)
    }

    /// Called after a non-vetoed send with its outcome.
    fn post_send(&self, _message: &Message<T>, _channel: &str, _sent: bool) {}

    /// `false` vetoes the receive before the buffer is consulted.
    fn pre_receive(&self, _channel: &str) -> bool {
        true
    }

    /// Inspect or replace a received message. `None` drops it; the message
    /// has already left the buffer.
    fn post_receive(&self, message: Message<T>, _channel: &str) -> Option<Message<T>> {
        Some(message)
    }
}

/// Pull side of an endpoint. The source owns its receive timeout policy.
#[async_trait]
pub trait PollableSource<T: Send + Sync + 'static>: Send + Sync {
    /// Pull at most one message.
    async fn receive(&self) -> Option<Message<T>>;
}

/// Push-only source: it delivers to subscribers and cannot be polled.
pub trait SubscribableSource<T: Send + Sync + 'static>: Send + Sync {
    /// Register a channel to receive every message the source emits.
    fn subscribe(&self, target: Arc<dyn MessageChannel<T>>) -> bool;
}

/// A source tagged with its retrieval capability.
pub enum MessageSource<T: Send + Sync + 'static> {
    Pollable(Arc<dyn PollableSource<T>>),
    Subscribable(Arc<dyn SubscribableSource<T>>),
}

impl<T: Send + Sync + 'static> MessageSource<T> {
    #[must_use]
    pub fn is_pollable(&self) -> bool {
        matches!(self, Self::Pollable(_))
    }
}

impl<T: Send + Sync + 'static> Clone for MessageSource<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pollable(source) => Self::Pollable(Arc::clone(source)),
            Self::Subscribable(source) => Self::Subscribable(Arc::clone(source)),
        }
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for MessageSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pollable(_) => write!(f, "MessageSource::Pollable"),
            Self::Subscribable(_) => write!(f, "MessageSource::Subscribable"),
        }
    }
}

/// Pairs a source with channel-like send semantics.
///
/// The endpoint's [`MessageChannel::name`] identifies it in errors.
pub trait MessageEndpoint<T: Send + Sync + 'static>: MessageChannel<T> {
    fn source(&self) -> Option<MessageSource<T>>;
}
