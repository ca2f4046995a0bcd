//! # Message Stream
//!
//! Exposes a pollable channel as a `tokio_stream::Stream`. Each item is one
//! indefinite `receive`, so the stream only ends if a receive interceptor
//! vetoes or drops a message.

use crate::domain::message::Message;
use crate::domain::timeout::Timeout;
use crate::ports::inbound::PollableChannel;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_stream::Stream;

type PendingReceive<T> = Pin<Box<dyn Future<Output = Option<Message<T>>> + Send>>;

/// Stream of messages pulled from a pollable channel.
pub struct MessageStream<T: Send + Sync + 'static> {
    channel: Arc<dyn PollableChannel<T>>,
    pending: Option<PendingReceive<T>>,
}

impl<T: Send + Sync + 'static> MessageStream<T> {
    #[must_use]
    pub fn new(channel: Arc<dyn PollableChannel<T>>) -> Self {
        Self {
            channel,
            pending: None,
        }
    }

    /// Name of the underlying channel.
    #[must_use]
    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }
}

impl<T: Send + Sync + 'static> Stream for MessageStream<T> {
    type Item = Message<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let pending = this.pending.get_or_insert_with(|| {
            let channel = Arc::clone(&this.channel);
            Box::pin(async move { channel.receive(Timeout::Indefinite).await })
        });
        match pending.as_mut().poll(cx) {
            Poll::Ready(item) => {
                this.pending = None;
                Poll::Ready(item)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::queue::QueueChannel;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_stream_yields_in_order() {
        let channel = Arc::new(QueueChannel::new("stream"));
        for i in 0..3u32 {
            assert!(channel.try_send(Message::new(i)));
        }
        let stream = MessageStream::new(channel as Arc<dyn PollableChannel<u32>>);
        assert_eq!(stream.channel_name(), "stream");

        let items: Vec<u32> = stream.take(3).map(|m| *m.payload()).collect().await;
        assert_eq!(items, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_stream_waits_for_late_message() {
        let channel: Arc<QueueChannel<u32>> = Arc::new(QueueChannel::new("late"));
        let mut stream = MessageStream::new(channel.clone() as Arc<dyn PollableChannel<u32>>);

        let producer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            channel.try_send(Message::new(42))
        });

        let message = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timeout")
            .expect("message");
        assert_eq!(*message.payload(), 42);
        assert!(producer.await.unwrap());
    }
}
