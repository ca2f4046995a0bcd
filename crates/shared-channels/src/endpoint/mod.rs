//! Endpoints: the exchange template, the poller that drives it, sources,
//! bridge endpoints and the timed polling loop.

pub mod bridge;
pub mod exchange;
pub mod poller;
pub mod source;
pub mod task;

pub use bridge::BridgeEndpoint;
pub use exchange::MessageExchangeTemplate;
pub use poller::{EndpointPoller, EndpointVisitor};
pub use source::{ChannelSource, FnSource};
pub use task::PollingTask;
