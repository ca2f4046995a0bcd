//! # Polling Task
//!
//! Timed loop that drives an [`EndpointPoller`] over a fixed set of
//! endpoints on the tokio runtime.
//!
//! ```text
//! initial_delay ──► tick ──► visit each endpoint (≤ max_messages_per_poll)
//!                    ▲                               │
//!                    └──────── poll_interval ────────┘
//! ```
//!
//! A misconfigured endpoint is logged on every tick and skipped for that
//! tick; the remaining endpoints keep being polled.

use crate::config::PollerConfig;
use crate::endpoint::poller::{EndpointPoller, EndpointVisitor};
use crate::error::ConfigurationError;
use crate::ports::outbound::MessageEndpoint;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Handle to a running polling loop.
pub struct PollingTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl PollingTask {
    /// Start polling `endpoints` on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidConfig` if `config` fails validation.
    pub fn spawn<T: Send + Sync + 'static>(
        endpoints: Vec<Arc<dyn MessageEndpoint<T>>>,
        config: &PollerConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let poller = EndpointPoller::from_config(config);
        let max_messages = config.max_messages_per_poll;
        let start = Instant::now() + config.initial_delay();
        let mut ticker = tokio::time::interval_at(start, config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let (shutdown, mut stop) = watch::channel(false);
        info!(
            endpoints = endpoints.len(),
            interval_ms = config.poll_interval_ms,
            "Polling task started"
        );

        let handle = tokio::spawn(async move {
            let mut moved = 0u64;
            loop {
                tokio::select! {
                    biased;
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        moved += poll_tick(&poller, &endpoints, max_messages).await;
                    }
                }
            }
            info!(moved, "Polling task stopped");
            moved
        });

        Ok(Self { shutdown, handle })
    }

    /// Stop the loop and return how many messages it moved in total.
    pub async fn shutdown(self) -> u64 {
        // The receiver only disappears once the loop has already exited.
        let _ = self.shutdown.send(true);
        match self.handle.await {
            Ok(moved) => moved,
            Err(err) => {
                warn!(error = %err, "Polling task did not finish cleanly");
                0
            }
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// One tick: drain up to `max_messages` from each endpoint in order.
async fn poll_tick<T: Send + Sync + 'static>(
    poller: &EndpointPoller,
    endpoints: &[Arc<dyn MessageEndpoint<T>>],
    max_messages: usize,
) -> u64 {
    let mut moved = 0u64;
    for endpoint in endpoints {
        for _ in 0..max_messages {
            match poller.visit_endpoint(endpoint.as_ref()).await {
                Ok(true) => moved += 1,
                Ok(false) => break,
                Err(err) => {
                    error!(endpoint = endpoint.name(), error = %err, "Endpoint poll failed");
                    break;
                }
            }
        }
    }
    if moved > 0 {
        debug!(moved, "Poll tick complete");
    }
    moved
}
