//! Domain layer: messages, selectors and wait policy.

pub mod message;
pub mod selector;
pub mod timeout;

pub use message::{Message, MessageBuilder, MessageHeaders, MessagePriority};
pub use selector::{
    HeaderValueSelector, MessageSelector, MessageSelectorChain, UnexpiredMessageSelector,
    VotingStrategy,
};
pub use timeout::Timeout;
