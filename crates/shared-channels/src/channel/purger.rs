//! # Channel Purger
//!
//! Removes messages from one or more pollable channels. Any message the
//! selector does *not* accept is removed; without a selector every message
//! is removed.
//!
//! Each channel is drained against a snapshot of its buffer taken at the
//! moment it is visited. Messages arriving later stay, and messages a
//! concurrent receiver took first are simply absent from the result. The
//! purge is not atomic across channels.

use crate::domain::message::Message;
use crate::domain::selector::MessageSelector;
use crate::error::ConfigurationError;
use crate::ports::inbound::PollableChannel;
use std::sync::Arc;
use tracing::debug;

/// Batch purge over a fixed, ordered set of channels.
pub struct ChannelPurger<T: Send + Sync + 'static> {
    channels: Vec<Arc<dyn PollableChannel<T>>>,
    selector: Option<Arc<dyn MessageSelector<T>>>,
}

impl<T: Send + Sync + 'static> ChannelPurger<T> {
    /// Purger that clears every message.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::NoChannels` if `channels` is empty.
    pub fn new(channels: Vec<Arc<dyn PollableChannel<T>>>) -> Result<Self, ConfigurationError> {
        Self::build(channels, None)
    }

    /// Purger that keeps only what `selector` accepts.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::NoChannels` if `channels` is empty.
    pub fn with_selector(
        selector: Arc<dyn MessageSelector<T>>,
        channels: Vec<Arc<dyn PollableChannel<T>>>,
    ) -> Result<Self, ConfigurationError> {
        Self::build(channels, Some(selector))
    }

    /// Purger built from possibly-absent channel references, as handed
    /// over by a wiring layer.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::NoChannels` - `slots` is empty
    /// - `ConfigurationError::MissingChannel` - first absent entry, by
    ///   position; absent entries are never skipped
    pub fn from_slots(
        slots: Vec<Option<Arc<dyn PollableChannel<T>>>>,
        selector: Option<Arc<dyn MessageSelector<T>>>,
    ) -> Result<Self, ConfigurationError> {
        if slots.is_empty() {
            return Err(ConfigurationError::NoChannels);
        }
        let channels = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(ConfigurationError::MissingChannel { index }))
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(channels, selector)
    }

    fn build(
        channels: Vec<Arc<dyn PollableChannel<T>>>,
        selector: Option<Arc<dyn MessageSelector<T>>>,
    ) -> Result<Self, ConfigurationError> {
        if channels.is_empty() {
            return Err(ConfigurationError::NoChannels);
        }
        Ok(Self { channels, selector })
    }

    /// Drain every channel in order and concatenate what was removed.
    pub fn purge(&self) -> Vec<Message<T>> {
        let mut purged = Vec::new();
        for channel in &self.channels {
            let removed = match &self.selector {
                None => channel.clear(),
                Some(selector) => channel.purge(Some(selector.as_ref())),
            };
            debug!(channel = channel.name(), removed = removed.len(), "Purged channel");
            purged.extend(removed);
        }
        purged
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
