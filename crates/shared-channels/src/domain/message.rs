//! # Message Envelope
//!
//! An immutable payload plus headers. Deriving a message (adding a header,
//! changing priority) always produces a new value with a fresh id; nothing
//! is mutated in place.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Delivery priority honoured by priority-ordered channels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MessagePriority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
}

/// Metadata carried alongside a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHeaders {
    /// Unique per built message.
    pub id: Uuid,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Correlates related messages (e.g. request and reply).
    pub correlation_id: Option<Uuid>,
    /// Milliseconds since the Unix epoch after which the message is stale.
    pub expiration_date: Option<u64>,
    /// Absent means [`MessagePriority::Normal`].
    pub priority: Option<MessagePriority>,
    /// Free-form attributes.
    pub attributes: BTreeMap<String, Value>,
}

impl MessageHeaders {
    fn fresh() -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: current_millis(),
            correlation_id: None,
            expiration_date: None,
            priority: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Look up a free-form attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Effective priority.
    #[must_use]
    pub fn priority(&self) -> MessagePriority {
        self.priority.unwrap_or_default()
    }

    /// Whether the expiration date lies strictly before `now_millis`.
    #[must_use]
    pub fn is_expired_at(&self, now_millis: u64) -> bool {
        self.expiration_date.is_some_and(|exp| exp < now_millis)
    }
}

/// An immutable message.
///
/// Cloning shares the payload. Messages have no structural equality; use
/// [`Message::id`] or [`Message::same_identity`] to compare them.
pub struct Message<T> {
    headers: Arc<MessageHeaders>,
    payload: Arc<T>,
}

impl<T> Message<T> {
    /// Build a message with fresh headers around `payload`.
    pub fn new(payload: T) -> Self {
        MessageBuilder::with_payload(payload).build()
    }

    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    #[must_use]
    pub fn headers(&self) -> &MessageHeaders {
        &self.headers
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.headers.id
    }

    /// True when both handles refer to the same built message.
    #[must_use]
    pub fn same_identity(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.headers, &b.headers)
    }

    /// Derive a new message with one extra (or replaced) attribute.
    #[must_use]
    pub fn with_header(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        MessageBuilder::from_message(self).header(key, value).build()
    }
}

impl<T> Clone for Message<T> {
    fn clone(&self) -> Self {
        Self {
            headers: Arc::clone(&self.headers),
            payload: Arc::clone(&self.payload),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Message<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.headers.id)
            .field("payload", &self.payload)
            .finish()
    }
}

/// Builder for [`Message`].
///
/// # Example
///
/// ```
/// use shared_channels::{MessageBuilder, MessagePriority};
///
/// let message = MessageBuilder::with_payload("order-17")
///     .header("region", "eu-west")
///     .priority(MessagePriority::High)
///     .build();
/// assert_eq!(*message.payload(), "order-17");
/// ```
pub struct MessageBuilder<T> {
    headers: MessageHeaders,
    payload: Arc<T>,
}

impl<T> MessageBuilder<T> {
    /// Start from a payload with empty headers.
    pub fn with_payload(payload: T) -> Self {
        Self {
            headers: MessageHeaders::fresh(),
            payload: Arc::new(payload),
        }
    }

    /// Start from an existing message: payload and headers are copied, the
    /// id and timestamp are regenerated on `build`.
    pub fn from_message(message: &Message<T>) -> Self {
        let mut headers = MessageHeaders::clone(&message.headers);
        headers.id = Uuid::new_v4();
        headers.timestamp = current_millis();
        Self {
            headers,
            payload: Arc::clone(&message.payload),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.attributes.insert(key.into(), value.into());
        self
    }

    pub fn correlation_id(mut self, id: Uuid) -> Self {
        self.headers.correlation_id = Some(id);
        self
    }

    pub fn expiration_date(mut self, millis_since_epoch: u64) -> Self {
        self.headers.expiration_date = Some(millis_since_epoch);
        self
    }

    pub fn priority(mut self, priority: MessagePriority) -> Self {
        self.headers.priority = Some(priority);
        self
    }

    pub fn build(self) -> Message<T> {
        Message {
            headers: Arc::new(self.headers),
            payload: self.payload,
        }
    }
}

/// Current Unix time in milliseconds.
pub(crate) fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_has_fresh_headers() {
        let a = Message::new(1u32);
        let b = Message::new(1u32);
        assert_ne!(a.id(), b.id());
        assert!(a.headers().attributes.is_empty());
        assert_eq!(a.headers().priority(), MessagePriority::Normal);
    }

    #[test]
    fn test_with_header_derives_new_message() {
        let original = MessageBuilder::with_payload("x").header("a", 1).build();
        let derived = original.with_header("b", "two");

        assert!(original.headers().get("b").is_none());
        assert_eq!(derived.headers().get("a"), Some(&Value::from(1)));
        assert_eq!(derived.headers().get("b"), Some(&Value::from("two")));
        assert_ne!(original.id(), derived.id());
        assert!(!Message::same_identity(&original, &derived));
    }

    #[test]
    fn test_header_override() {
        let original = MessageBuilder::with_payload(()).header("k", 1).build();
        let derived = original.with_header("k", 2);
        assert_eq!(derived.headers().get("k"), Some(&Value::from(2)));
        assert_eq!(original.headers().get("k"), Some(&Value::from(1)));
    }

    #[test]
    fn test_clone_preserves_identity() {
        let message = Message::new(String::from("payload"));
        let copy = message.clone();
        assert!(Message::same_identity(&message, &copy));
        assert_eq!(copy.payload(), "payload");
    }

    #[test]
    fn test_from_message_keeps_correlation() {
        let correlation = Uuid::new_v4();
        let original = MessageBuilder::with_payload(5)
            .correlation_id(correlation)
            .priority(MessagePriority::Low)
            .build();
        let derived = MessageBuilder::from_message(&original).build();
        assert_eq!(derived.headers().correlation_id, Some(correlation));
        assert_eq!(derived.headers().priority(), MessagePriority::Low);
    }

    #[test]
    fn test_expiration() {
        let message = MessageBuilder::with_payload(()).expiration_date(100).build();
        assert!(message.headers().is_expired_at(101));
        assert!(!message.headers().is_expired_at(100));
        assert!(!Message::new(()).headers().is_expired_at(u64::MAX));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(MessagePriority::Highest > MessagePriority::High);
        assert!(MessagePriority::Low > MessagePriority::Lowest);
    }

    #[test]
    fn test_headers_serialize() {
        let message = MessageBuilder::with_payload(()).header("trace", "abc").build();
        let json = serde_json::to_value(message.headers()).unwrap();
        assert_eq!(json["attributes"]["trace"], "abc");
    }
}
