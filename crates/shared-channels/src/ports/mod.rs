//! Ports module
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::{MessageChannel, PollableChannel};
pub use outbound::{
    ChannelInterceptor, MessageEndpoint, MessageSource, PollableSource, SubscribableSource,
};
