//! Pollable sources an endpoint can pull from.

use crate::domain::message::Message;
use crate::domain::timeout::Timeout;
use crate::ports::inbound::PollableChannel;
use crate::ports::outbound::PollableSource;
use async_trait::async_trait;
use std::sync::Arc;

/// Pulls from a pollable channel with a fixed receive timeout.
pub struct ChannelSource<T: Send + Sync + 'static> {
    channel: Arc<dyn PollableChannel<T>>,
    receive_timeout: Timeout,
}

impl<T: Send + Sync + 'static> ChannelSource<T> {
    /// Non-blocking source over `channel`.
    #[must_use]
    pub fn new(channel: Arc<dyn PollableChannel<T>>) -> Self {
        Self::with_receive_timeout(channel, Timeout::NonBlocking)
    }

    #[must_use]
    pub fn with_receive_timeout(
        channel: Arc<dyn PollableChannel<T>>,
        receive_timeout: Timeout,
    ) -> Self {
        Self {
            channel,
            receive_timeout,
        }
    }

    #[must_use]
    pub fn receive_timeout(&self) -> Timeout {
        self.receive_timeout
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> PollableSource<T> for ChannelSource<T> {
    async fn receive(&self) -> Option<Message<T>> {
        self.channel.receive(self.receive_timeout).await
    }
}

/// Calls a function for each pull and wraps its payload in a new message.
pub struct FnSource<F> {
    produce: F,
}

impl<F> FnSource<F> {
    pub fn new(produce: F) -> Self {
        Self { produce }
    }
}

#[async_trait]
impl<T, F> PollableSource<T> for FnSource<F>
where
    T: Send + Sync + 'static,
    F: Fn() -> Option<T> + Send + Sync,
{
    async fn receive(&self) -> Option<Message<T>> {
        (self.produce)().map(Message::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::queue::QueueChannel;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_channel_source_pulls() {
        let channel: Arc<QueueChannel<u32>> = Arc::new(QueueChannel::new("in"));
        assert!(channel.try_send(Message::new(3)));
        let source = ChannelSource::new(channel as Arc<dyn PollableChannel<u32>>);

        assert_eq!(source.receive_timeout(), Timeout::NonBlocking);
        assert_eq!(source.receive().await.map(|m| *m.payload()), Some(3));
        assert!(source.receive().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_source_bounded_wait() {
        let channel: Arc<QueueChannel<u32>> = Arc::new(QueueChannel::new("slow"));
        let source = ChannelSource::with_receive_timeout(
            channel as Arc<dyn PollableChannel<u32>>,
            Timeout::Bounded(Duration::from_millis(100)),
        );
        assert!(source.receive().await.is_none());
    }

    #[tokio::test]
    async fn test_fn_source_wraps_payload() {
        let counter = AtomicU32::new(0);
        let source = FnSource::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            (n < 2).then_some(n)
        });

        let first: Option<Message<u32>> = source.receive().await;
        assert_eq!(first.map(|m| *m.payload()), Some(0));
        assert!(source.receive().await.is_some());
        assert!(source.receive().await.is_none());
    }
}
