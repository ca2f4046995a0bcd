//! Channel implementations: buffers, pollable queue channels, the
//! interceptor chain, purging and stream adaptation.

pub mod buffer;
pub mod interceptor;
pub mod purger;
pub mod queue;
pub mod stream;

pub use buffer::{FifoBuffer, MessageBuffer, PriorityBuffer};
pub use interceptor::{
    InterceptorChain, InterceptorList, MessageSelectingInterceptor, TracingInterceptor,
};
pub use purger::ChannelPurger;
pub use queue::{BufferedChannel, ChannelStats, PriorityChannel, QueueChannel};
pub use stream::MessageStream;
