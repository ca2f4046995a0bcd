//! Inbound Ports (Driving Ports / API)
//!
//! What producers and consumers call on a channel.

use crate::domain::message::Message;
use crate::domain::selector::MessageSelector;
use crate::domain::timeout::Timeout;
use async_trait::async_trait;

/// A conduit that accepts messages.
#[async_trait]
pub trait MessageChannel<T: Send + Sync + 'static>: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Hand `message` to the channel, waiting up to `timeout`.
    ///
    /// # Returns
    ///
    /// `true` if the message was delivered before the timeout elapsed,
    /// `false` on timeout, interceptor veto or rejection. Dropping the
    /// returned future cancels the wait and leaves the channel untouched.
    async fn send(&self, message: Message<T>, timeout: Timeout) -> bool;
}

/// A channel that buffers messages for consumers to pull.
#[async_trait]
pub trait PollableChannel<T: Send + Sync + 'static>: MessageChannel<T> {
    /// Wait up to `timeout` for a message.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - a message was removed from the buffer
    /// - `None` - timed out, vetoed, or cancelled (not an error)
    async fn receive(&self, timeout: Timeout) -> Option<Message<T>>;

    /// Atomically remove and return every buffered message.
    fn clear(&self) -> Vec<Message<T>>;

    /// Atomically remove and return every buffered message the selector
    /// does *not* accept. Accepted messages stay buffered in order.
    ///
    /// With no selector this is exactly [`PollableChannel::clear`].
    fn purge(&self, selector: Option<&dyn MessageSelector<T>>) -> Vec<Message<T>>;
}
