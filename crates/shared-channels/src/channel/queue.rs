//! # Queue Channels
//!
//! Pollable channels backed by an owned, mutex-guarded [`MessageBuffer`].
//!
//! ## Synchronization
//!
//! - The buffer lock is held only for the synchronous push/pop/drain itself,
//!   never across an `.await`. A message is therefore removed exactly once,
//!   and `clear`/`purge` see an atomic snapshot of the buffer.
//! - Waiters register on a [`Notify`] *before* re-checking the buffer, so a
//!   push or pop racing with the check cannot be missed.
//! - Cancelling a `send` or `receive` future (drop, `select!`, abort) stops
//!   the wait without touching the buffer.

use crate::channel::buffer::{FifoBuffer, MessageBuffer, PriorityBuffer};
use crate::channel::interceptor::InterceptorChain;
use crate::config::ChannelConfig;
use crate::domain::message::Message;
use crate::domain::selector::MessageSelector;
use crate::domain::timeout::Timeout;
use crate::error::ConfigurationError;
use crate::ports::inbound::{MessageChannel, PollableChannel};
use crate::ports::outbound::ChannelInterceptor;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::debug;

/// FIFO pollable channel.
pub type QueueChannel<T> = BufferedChannel<T, FifoBuffer<T>>;

/// Pollable channel ordered by message priority (highest first, FIFO among
/// equals). Intentionally not FIFO across priorities.
pub type PriorityChannel<T> = BufferedChannel<T, PriorityBuffer<T>>;

/// Point-in-time traffic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    /// Messages accepted into the buffer.
    pub sent: u64,
    /// Messages handed to receivers.
    pub received: u64,
    /// Sends refused by an interceptor or for lack of capacity.
    pub rejected: u64,
    /// Messages removed by `clear` or `purge`.
    pub purged: u64,
}

#[derive(Default)]
struct Counters {
    sent: AtomicU64,
    received: AtomicU64,
    rejected: AtomicU64,
    purged: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: usize) {
        counter.fetch_add(by as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ChannelStats {
        ChannelStats {
            sent: self.sent.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
        }
    }
}

/// Pollable channel generic over its queue discipline.
///
/// Use the [`QueueChannel`] and [`PriorityChannel`] aliases.
pub struct BufferedChannel<T, B> {
    name: String,
    buffer: Mutex<B>,
    capacity: Option<usize>,
    not_empty: Notify,
    not_full: Notify,
    interceptors: InterceptorChain<T>,
    counters: Counters,
    _payload: PhantomData<fn() -> T>,
}

impl<T, B> BufferedChannel<T, B>
where
    T: Send + Sync + 'static,
    B: MessageBuffer<T> + Default,
{
    /// Unbounded channel.
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), None)
    }

    /// Channel honouring `config`.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidConfig` if the configuration is invalid.
    pub fn with_config(
        name: impl Into<String>,
        config: &ChannelConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self::build(name.into(), config.capacity))
    }

    fn build(name: String, capacity: Option<usize>) -> Self {
        Self {
            name,
            buffer: Mutex::new(B::default()),
            capacity,
            not_empty: Notify::new(),
            not_full: Notify::new(),
            interceptors: InterceptorChain::new(),
            counters: Counters::default(),
            _payload: PhantomData,
        }
    }

    /// Builder-style interceptor registration.
    #[must_use]
    pub fn with_interceptor(self, interceptor: Arc<dyn ChannelInterceptor<T>>) -> Self {
        self.interceptors.add(interceptor);
        self
    }

    /// Append an interceptor. Operations already in flight keep the chain
    /// they started with.
    pub fn add_interceptor(&self, interceptor: Arc<dyn ChannelInterceptor<T>>) {
        self.interceptors.add(interceptor);
    }

    #[must_use]
    pub fn interceptors(&self) -> &InterceptorChain<T> {
        &self.interceptors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Free slots, `None` when unbounded.
    #[must_use]
    pub fn remaining_capacity(&self) -> Option<usize> {
        self.capacity
            .map(|capacity| capacity.saturating_sub(self.len()))
    }

    #[must_use]
    pub fn stats(&self) -> ChannelStats {
        self.counters.snapshot()
    }

    /// Single non-blocking send attempt, interceptors included.
    pub fn try_send(&self, message: Message<T>) -> bool {
        let chain = self.interceptors.snapshot();
        let Some(message) = chain.pre_send(message, &self.name) else {
            Counters::bump(&self.counters.rejected, 1);
            return false;
        };
        let sent = self.offer(&message);
        if !sent {
            Counters::bump(&self.counters.rejected, 1);
        }
        chain.post_send(&message, &self.name, sent);
        sent
    }

    /// Single non-blocking receive attempt, interceptors included.
    pub fn try_receive(&self) -> Option<Message<T>> {
        let chain = self.interceptors.snapshot();
        if !chain.pre_receive(&self.name) {
            return None;
        }
        let message = self.poll()?;
        chain.post_receive(message, &self.name)
    }

    /// Push if there is room. Holds the lock only for the push.
    fn offer(&self, message: &Message<T>) -> bool {
        {
            let mut buffer = self.buffer.lock();
            if self.capacity.is_some_and(|capacity| buffer.len() >= capacity) {
                return false;
            }
            buffer.push(message.clone());
        }
        Counters::bump(&self.counters.sent, 1);
        self.not_empty.notify_waiters();
        true
    }

    /// Pop the next message if any.
    fn poll(&self) -> Option<Message<T>> {
        let message = self.buffer.lock().pop()?;
        Counters::bump(&self.counters.received, 1);
        self.not_full.notify_waiters();
        Some(message)
    }

    /// Offer until accepted or the timeout lapses. Only the final refusal
    /// counts as a rejection.
    async fn enqueue(&self, message: &Message<T>, timeout: Timeout) -> bool {
        let deadline = timeout.deadline();
        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.offer(message) {
                return true;
            }
            if !timeout.may_wait() {
                Counters::bump(&self.counters.rejected, 1);
                return false;
            }
            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        debug!(channel = %self.name, %timeout, "Send timed out, channel full");
                        Counters::bump(&self.counters.rejected, 1);
                        return false;
                    }
                }
                None => notified.await,
            }
        }
    }

    async fn dequeue(&self, timeout: Timeout) -> Option<Message<T>> {
        let deadline = timeout.deadline();
        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(message) = self.poll() {
                return Some(message);
            }
            if !timeout.may_wait() {
                return None;
            }
            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return None;
                    }
                }
                None => notified.await,
            }
        }
    }

    fn record_purged(&self, removed: &[Message<T>]) {
        if removed.is_empty() {
            return;
        }
        Counters::bump(&self.counters.purged, removed.len());
        self.not_full.notify_waiters();
        debug!(channel = %self.name, removed = removed.len(), "Channel purged");
    }
}

#[async_trait]
impl<T, B> MessageChannel<T> for BufferedChannel<T, B>
where
    T: Send + Sync + 'static,
    B: MessageBuffer<T> + Default,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: Message<T>, timeout: Timeout) -> bool {
        let chain = self.interceptors.snapshot();
        let Some(message) = chain.pre_send(message, &self.name) else {
            Counters::bump(&self.counters.rejected, 1);
            return false;
        };
        let sent = self.enqueue(&message, timeout).await;
        chain.post_send(&message, &self.name, sent);
        sent
    }
}

#[async_trait]
impl<T, B> PollableChannel<T> for BufferedChannel<T, B>
where
    T: Send + Sync + 'static,
    B: MessageBuffer<T> + Default,
{
    async fn receive(&self, timeout: Timeout) -> Option<Message<T>> {
        let chain = self.interceptors.snapshot();
        if !chain.pre_receive(&self.name) {
            return None;
        }
        let message = self.dequeue(timeout).await?;
        chain.post_receive(message, &self.name)
    }

    fn clear(&self) -> Vec<Message<T>> {
        let removed = self.buffer.lock().drain_all();
        self.record_purged(&removed);
        removed
    }

    fn purge(&self, selector: Option<&dyn MessageSelector<T>>) -> Vec<Message<T>> {
        let Some(selector) = selector else {
            return self.clear();
        };
        let removed = self.buffer.lock().drain_rejected(selector);
        self.record_purged(&removed);
        removed
    }
}
