//! # Message Buffers
//!
//! Queue disciplines behind a pollable channel. A buffer is never shared:
//! the owning channel serializes every call through its own lock, so these
//! types need no synchronization of their own.

use crate::domain::message::{Message, MessagePriority};
use crate::domain::selector::MessageSelector;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Storage and ordering policy for buffered messages.
pub trait MessageBuffer<T>: Send {
    /// Append a message.
    fn push(&mut self, message: Message<T>);

    /// Remove the next message in delivery order.
    fn pop(&mut self) -> Option<Message<T>>;

    /// Number of buffered messages.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove everything, in delivery order.
    fn drain_all(&mut self) -> Vec<Message<T>>;

    /// Remove the messages `selector` rejects, in delivery order. Accepted
    /// messages keep their relative order.
    fn drain_rejected(&mut self, selector: &dyn MessageSelector<T>) -> Vec<Message<T>>;
}

/// First in, first out.
pub struct FifoBuffer<T> {
    queue: VecDeque<Message<T>>,
}

impl<T> Default for FifoBuffer<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<T: Send + Sync> MessageBuffer<T> for FifoBuffer<T> {
    fn push(&mut self, message: Message<T>) {
        self.queue.push_back(message);
    }

    fn pop(&mut self) -> Option<Message<T>> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn drain_all(&mut self) -> Vec<Message<T>> {
        self.queue.drain(..).collect()
    }

    fn drain_rejected(&mut self, selector: &dyn MessageSelector<T>) -> Vec<Message<T>> {
        let mut rejected = Vec::new();
        let mut retained = VecDeque::with_capacity(self.queue.len());
        for message in self.queue.drain(..) {
            if selector.accept(&message) {
                retained.push_back(message);
            } else {
                rejected.push(message);
            }
        }
        self.queue = retained;
        rejected
    }
}

struct PriorityEntry<T> {
    priority: MessagePriority,
    sequence: u64,
    message: Message<T>,
}

impl<T> PartialEq for PriorityEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for PriorityEntry<T> {}

impl<T> PartialOrd for PriorityEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for PriorityEntry<T> {
    // Max-heap: higher priority first, then earlier arrival.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Highest [`MessagePriority`] first, FIFO among equal priorities.
pub struct PriorityBuffer<T> {
    heap: BinaryHeap<PriorityEntry<T>>,
    next_sequence: u64,
}

impl<T> Default for PriorityBuffer<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }
}

impl<T> PriorityBuffer<T> {
    fn drain_ordered(&mut self) -> Vec<PriorityEntry<T>> {
        let mut entries = std::mem::take(&mut self.heap).into_sorted_vec();
        entries.reverse();
        entries
    }
}

impl<T: Send + Sync> MessageBuffer<T> for PriorityBuffer<T> {
    fn push(&mut self, message: Message<T>) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.heap.push(PriorityEntry {
            priority: message.headers().priority(),
            sequence,
            message,
        });
    }

    fn pop(&mut self) -> Option<Message<T>> {
        self.heap.pop().map(|entry| entry.message)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn drain_all(&mut self) -> Vec<Message<T>> {
        self.drain_ordered()
            .into_iter()
            .map(|entry| entry.message)
            .collect()
    }

    fn drain_rejected(&mut self, selector: &dyn MessageSelector<T>) -> Vec<Message<T>> {
        let (retained, rejected): (Vec<_>, Vec<_>) = self
            .drain_ordered()
            .into_iter()
            .partition(|entry| selector.accept(&entry.message));
        self.heap = retained.into_iter().collect();
        rejected.into_iter().map(|entry| entry.message).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::MessageBuilder;

    fn payloads<T: Copy>(messages: &[Message<T>]) -> Vec<T> {
        messages.iter().map(|m| *m.payload()).collect()
    }

    fn prioritized(payload: u32, priority: MessagePriority) -> Message<u32> {
        MessageBuilder::with_payload(payload).priority(priority).build()
    }

    #[test]
    fn test_fifo_order() {
        let mut buffer = FifoBuffer::default();
        for i in 0..3u32 {
            buffer.push(Message::new(i));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.pop().map(|m| *m.payload()), Some(0));
        assert_eq!(payloads(&buffer.drain_all()), vec![1, 2]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fifo_drain_rejected_keeps_order() {
        let mut buffer = FifoBuffer::default();
        for i in 0..6u32 {
            buffer.push(Message::new(i));
        }
        let even = |m: &Message<u32>| m.payload() % 2 == 0;
        assert_eq!(payloads(&buffer.drain_rejected(&even)), vec![1, 3, 5]);
        assert_eq!(payloads(&buffer.drain_all()), vec![0, 2, 4]);
    }

    #[test]
    fn test_priority_order() {
        let mut buffer = PriorityBuffer::default();
        buffer.push(prioritized(1, MessagePriority::Low));
        buffer.push(prioritized(2, MessagePriority::Highest));
        buffer.push(prioritized(3, MessagePriority::Normal));
        buffer.push(prioritized(4, MessagePriority::Highest));
        buffer.push(Message::new(5));

        let order: Vec<u32> = std::iter::from_fn(|| buffer.pop().map(|m| *m.payload())).collect();
        assert_eq!(order, vec![2, 4, 3, 5, 1]);
    }

    #[test]
    fn test_priority_drain_rejected() {
        let mut buffer = PriorityBuffer::default();
        buffer.push(prioritized(1, MessagePriority::Low));
        buffer.push(prioritized(2, MessagePriority::High));
        buffer.push(prioritized(3, MessagePriority::High));
        buffer.push(prioritized(4, MessagePriority::Lowest));

        let keep_odd = |m: &Message<u32>| m.payload() % 2 == 1;
        assert_eq!(payloads(&buffer.drain_rejected(&keep_odd)), vec![2, 4]);
        assert_eq!(payloads(&buffer.drain_all()), vec![3, 1]);
    }
}
