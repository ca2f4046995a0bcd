//! # Endpoint Poller
//!
//! Stateless driver invoked once per poll tick. Each visit checks that the
//! endpoint has a pollable source, then moves at most one message from that
//! source into the endpoint.
//!
//! ## Failure Semantics
//!
//! - Missing or push-only source: `Err(ConfigurationError)`, not retried.
//! - Empty source or refused forward: `Ok(false)`, nothing happened.

use crate::config::PollerConfig;
use crate::domain::timeout::Timeout;
use crate::endpoint::exchange::MessageExchangeTemplate;
use crate::error::ConfigurationError;
use crate::ports::outbound::{MessageEndpoint, MessageSource};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

/// Something that acts on endpoints one at a time.
#[async_trait]
pub trait EndpointVisitor<T: Send + Sync + 'static>: Send + Sync {
    /// # Returns
    ///
    /// `Ok(true)` if a message was moved, `Ok(false)` if nothing happened.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` naming the endpoint when it cannot be driven.
    async fn visit_endpoint(
        &self,
        endpoint: &dyn MessageEndpoint<T>,
    ) -> Result<bool, ConfigurationError>;
}

/// Polls an endpoint's source and forwards into the endpoint.
#[derive(Debug, Clone, Copy)]
pub struct EndpointPoller {
    template: MessageExchangeTemplate,
}

impl EndpointPoller {
    /// Poller whose forwards never block.
    #[must_use]
    pub fn new() -> Self {
        Self::with_template(MessageExchangeTemplate::with_send_timeout(Timeout::NonBlocking))
    }

    #[must_use]
    pub fn with_template(template: MessageExchangeTemplate) -> Self {
        Self { template }
    }

    #[must_use]
    pub fn from_config(config: &PollerConfig) -> Self {
        Self::with_template(MessageExchangeTemplate::from_config(config))
    }

    #[must_use]
    pub fn template(&self) -> &MessageExchangeTemplate {
        &self.template
    }

    /// Visit every endpoint in order. A misconfigured endpoint is logged
    /// and reported in its slot; the others are still polled.
    pub async fn visit_all<T: Send + Sync + 'static>(
        &self,
        endpoints: &[Arc<dyn MessageEndpoint<T>>],
    ) -> Vec<Result<bool, ConfigurationError>> {
        let mut outcomes = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let outcome = self.visit_endpoint(endpoint.as_ref()).await;
            if let Err(err) = &outcome {
                error!(endpoint = endpoint.name(), error = %err, "Endpoint poll failed");
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}

impl Default for EndpointPoller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> EndpointVisitor<T> for EndpointPoller {
    async fn visit_endpoint(
        &self,
        endpoint: &dyn MessageEndpoint<T>,
    ) -> Result<bool, ConfigurationError> {
        match endpoint.source() {
            None => Err(ConfigurationError::MissingSource {
                endpoint: endpoint.name().to_string(),
            }),
            Some(MessageSource::Subscribable(_)) => Err(ConfigurationError::SourceNotPollable {
                endpoint: endpoint.name().to_string(),
            }),
            Some(MessageSource::Pollable(source)) => Ok(self
                .template
                .receive_and_forward(source.as_ref(), endpoint)
                .await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::bridge::BridgeEndpoint;
    use crate::ports::inbound::MessageChannel;
    use crate::ports::outbound::mocks::{MockPushSource, MockSource, RecordingChannel};

    fn recording(accept: bool) -> (Arc<RecordingChannel<u32>>, Arc<dyn MessageChannel<u32>>) {
        let channel = Arc::new(RecordingChannel::new(accept));
        (channel.clone(), channel)
    }

    fn endpoint(bridge: BridgeEndpoint<u32>) -> Arc<dyn MessageEndpoint<u32>> {
        Arc::new(bridge)
    }

    #[test]
    fn test_default_send_timeout_is_non_blocking() {
        assert_eq!(
            EndpointPoller::new().template().send_timeout(),
            Timeout::NonBlocking
        );
    }

    #[tokio::test]
    async fn test_visit_moves_one_message() {
        let (recorded, target) = recording(true);
        let orders = endpoint(
            BridgeEndpoint::new("orders", target)
                .with_pollable_source(Arc::new(MockSource::new(vec![1, 2]))),
        );
        let poller = EndpointPoller::new();

        assert_eq!(poller.visit_endpoint(orders.as_ref()).await, Ok(true));
        assert_eq!(recorded.received.lock().len(), 1);
        assert_eq!(poller.visit_endpoint(orders.as_ref()).await, Ok(true));
        assert_eq!(poller.visit_endpoint(orders.as_ref()).await, Ok(false));
    }

    #[tokio::test]
    async fn test_missing_source_names_endpoint() {
        let (_, target) = recording(true);
        let orphan = endpoint(BridgeEndpoint::new("orphan", target));
        let result = EndpointPoller::new().visit_endpoint(orphan.as_ref()).await;
        assert_eq!(
            result,
            Err(ConfigurationError::MissingSource {
                endpoint: "orphan".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_push_only_source_rejected() {
        let (_, target) = recording(true);
        let pushy = endpoint(
            BridgeEndpoint::new("pushy", target).with_subscribable_source(Arc::new(MockPushSource)),
        );
        let result = EndpointPoller::new().visit_endpoint(pushy.as_ref()).await;
        assert_eq!(
            result,
            Err(ConfigurationError::SourceNotPollable {
                endpoint: "pushy".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_refused_forward_is_not_an_error() {
        let (_, target) = recording(false);
        let busy = endpoint(
            BridgeEndpoint::new("busy", target)
                .with_pollable_source(Arc::new(MockSource::new(vec![7]))),
        );
        let result = EndpointPoller::new().visit_endpoint(busy.as_ref()).await;
        assert_eq!(result, Ok(false));
    }

    #[tokio::test]
    async fn test_visit_all_isolates_failures() {
        let (recorded, target) = recording(true);
        let broken = endpoint(BridgeEndpoint::new("broken", target.clone()));
        let healthy = endpoint(
            BridgeEndpoint::new("healthy", target)
                .with_pollable_source(Arc::new(MockSource::new(vec![1]))),
        );

        let outcomes = EndpointPoller::new().visit_all(&[broken, healthy]).await;
        assert!(matches!(
            outcomes[0],
            Err(ConfigurationError::MissingSource { .. })
        ));
        assert_eq!(outcomes[1], Ok(true));
        assert_eq!(recorded.received.lock().len(), 1);
    }
}
