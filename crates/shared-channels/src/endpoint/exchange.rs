//! # Message Exchange Template
//!
//! Timeout policy for moving one message between a pull source and a push
//! target. One call performs exactly one receive and at most one send; it
//! never loops or retries.

use crate::config::PollerConfig;
use crate::domain::message::Message;
use crate::domain::timeout::Timeout;
use crate::ports::inbound::MessageChannel;
use crate::ports::outbound::PollableSource;
use tracing::{debug, warn};

/// Applies a send timeout to channel exchanges.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageExchangeTemplate {
    send_timeout: Timeout,
}

impl MessageExchangeTemplate {
    /// Template that waits indefinitely on send.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_send_timeout(send_timeout: Timeout) -> Self {
        Self { send_timeout }
    }

    #[must_use]
    pub fn from_config(config: &PollerConfig) -> Self {
        Self::with_send_timeout(config.send_timeout())
    }

    #[must_use]
    pub fn send_timeout(&self) -> Timeout {
        self.send_timeout
    }

    pub fn set_send_timeout(&mut self, send_timeout: Timeout) {
        self.send_timeout = send_timeout;
    }

    /// Send with the configured timeout.
    pub async fn send<T, C>(&self, message: Message<T>, target: &C) -> bool
    where
        T: Send + Sync + 'static,
        C: MessageChannel<T> + ?Sized,
    {
        target.send(message, self.send_timeout).await
    }

    /// Pull one message; the source applies its own receive policy.
    pub async fn receive<T, S>(&self, source: &S) -> Option<Message<T>>
    where
        T: Send + Sync + 'static,
        S: PollableSource<T> + ?Sized,
    {
        source.receive().await
    }

    /// Pull one message and, if there was one, forward it to `target`.
    ///
    /// # Returns
    ///
    /// `true` only if a message was both received and delivered. A message
    /// that was received but refused by `target` is not re-queued.
    pub async fn receive_and_forward<T, S, C>(&self, source: &S, target: &C) -> bool
    where
        T: Send + Sync + 'static,
        S: PollableSource<T> + ?Sized,
        C: MessageChannel<T> + ?Sized,
    {
        let Some(message) = self.receive(source).await else {
            return false;
        };
        let message_id = message.id();
        let sent = self.send(message, target).await;
        if sent {
            debug!(channel = target.name(), %message_id, "Message forwarded");
        } else {
            warn!(
                channel = target.name(),
                %message_id,
                timeout = %self.send_timeout,
                "Received message could not be forwarded"
            );
        }
        sent
    }
}
