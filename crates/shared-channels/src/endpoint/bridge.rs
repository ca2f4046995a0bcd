//! # Bridge Endpoint
//!
//! Named endpoint that pairs an optional source with a target channel.
//! Sending to the bridge sends to its target.

use crate::domain::message::Message;
use crate::domain::timeout::Timeout;
use crate::ports::inbound::MessageChannel;
use crate::ports::outbound::{MessageEndpoint, MessageSource, PollableSource, SubscribableSource};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub struct BridgeEndpoint<T: Send + Sync + 'static> {
    name: String,
    source: Option<MessageSource<T>>,
    target: Arc<dyn MessageChannel<T>>,
}

impl<T: Send + Sync + 'static> BridgeEndpoint<T> {
    /// Endpoint without a source yet.
    pub fn new(name: impl Into<String>, target: Arc<dyn MessageChannel<T>>) -> Self {
        Self {
            name: name.into(),
            source: None,
            target,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: MessageSource<T>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_pollable_source(self, source: Arc<dyn PollableSource<T>>) -> Self {
        self.with_source(MessageSource::Pollable(source))
    }

    #[must_use]
    pub fn with_subscribable_source(self, source: Arc<dyn SubscribableSource<T>>) -> Self {
        self.with_source(MessageSource::Subscribable(source))
    }

    #[must_use]
    pub fn target(&self) -> &Arc<dyn MessageChannel<T>> {
        &self.target
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for BridgeEndpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeEndpoint")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("target", &self.target.name())
            .finish()
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> MessageChannel<T> for BridgeEndpoint<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: Message<T>, timeout: Timeout) -> bool {
        self.target.send(message, timeout).await
    }
}

impl<T: Send + Sync + 'static> MessageEndpoint<T> for BridgeEndpoint<T> {
    fn source(&self) -> Option<MessageSource<T>> {
        self.source.clone()
    }
}
