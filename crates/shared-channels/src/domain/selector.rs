//! # Message Selectors
//!
//! Pure predicates over messages. Channels use them when purging (matching
//! messages are retained), interceptors use them to veto sends.

use crate::domain::message::{current_millis, Message};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A side-effect free predicate over a message.
///
/// Implementations must be safe to call repeatedly and concurrently. Any
/// `Fn(&Message<T>) -> bool + Send + Sync` closure is a selector.
pub trait MessageSelector<T>: Send + Sync {
    /// `true` to accept (retain) the message, `false` to reject it.
    fn accept(&self, message: &Message<T>) -> bool;
}

impl<T, F> MessageSelector<T> for F
where
    F: Fn(&Message<T>) -> bool + Send + Sync,
{
    fn accept(&self, message: &Message<T>) -> bool {
        self(message)
    }
}

/// Accepts messages whose attribute `key` equals `expected`.
#[derive(Debug, Clone)]
pub struct HeaderValueSelector {
    key: String,
    expected: Value,
}

impl HeaderValueSelector {
    pub fn new(key: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            expected: expected.into(),
        }
    }
}

impl<T> MessageSelector<T> for HeaderValueSelector {
    fn accept(&self, message: &Message<T>) -> bool {
        message.headers().get(&self.key) == Some(&self.expected)
    }
}

/// Rejects messages whose expiration date has passed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnexpiredMessageSelector;

impl<T> MessageSelector<T> for UnexpiredMessageSelector {
    fn accept(&self, message: &Message<T>) -> bool {
        !message.headers().is_expired_at(current_millis())
    }
}

/// How a [`MessageSelectorChain`] combines its members' votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VotingStrategy {
    /// Every selector must accept.
    #[default]
    All,
    /// At least one selector must accept.
    Any,
    /// Strictly more than half must accept.
    Majority,
    /// At least half must accept.
    MajorityOrTie,
}

/// Combines several selectors under a [`VotingStrategy`].
///
/// With no members, `All` accepts and every other strategy rejects.
pub struct MessageSelectorChain<T> {
    strategy: VotingStrategy,
    selectors: Vec<Arc<dyn MessageSelector<T>>>,
}

impl<T> MessageSelectorChain<T> {
    #[must_use]
    pub fn new(strategy: VotingStrategy) -> Self {
        Self {
            strategy,
            selectors: Vec::new(),
        }
    }

    /// Append a selector; evaluation follows insertion order.
    #[must_use]
    pub fn with(mut self, selector: Arc<dyn MessageSelector<T>>) -> Self {
        self.selectors.push(selector);
        self
    }

    #[must_use]
    pub fn strategy(&self) -> VotingStrategy {
        self.strategy
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl<T> MessageSelector<T> for MessageSelectorChain<T> {
    fn accept(&self, message: &Message<T>) -> bool {
        match self.strategy {
            VotingStrategy::All => self.selectors.iter().all(|s| s.accept(message)),
            VotingStrategy::Any => self.selectors.iter().any(|s| s.accept(message)),
            VotingStrategy::Majority | VotingStrategy::MajorityOrTie => {
                let total = self.selectors.len();
                if total == 0 {
                    return false;
                }
                let accepted = self.selectors.iter().filter(|s| s.accept(message)).count();
                if self.strategy == VotingStrategy::Majority {
                    accepted * 2 > total
                } else {
                    accepted * 2 >= total
                }
            }
        }
    }
}
