//! Periodic snapshot poller
//!
//! Pulls a fresh snapshot from the source on a fixed cadence and forwards
//! successes to the hub. Failures are logged and absorbed; a failed fetch
//! never stops the loop, and retry is simply the next tick, which bounds
//! provider load.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::hub::Hub;
use crate::source::SnapshotSource;

/// Periodic poll loop feeding the hub
///
/// The poller is the hub's sole steady-state producer and holds no
/// subscriber state.
pub struct Poller {
    source: Arc<dyn SnapshotSource>,
    hub: Arc<Hub>,
    poll_interval: Duration,
    fetch_timeout: Duration,
}

impl Poller {
    /// Create a poller
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        hub: Arc<Hub>,
        poll_interval: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            hub,
            poll_interval,
            fetch_timeout,
        }
    }

    /// Spawn the poll loop as a background task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Run the poll loop forever
    pub async fn run(self) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match timeout(self.fetch_timeout, self.source.fetch()).await {
                Ok(Ok(snapshot)) => {
                    tracing::debug!(vehicles = snapshot.len(), "Publishing polled snapshot");
                    self.hub.publish(snapshot).await;
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Snapshot fetch failed, retrying next tick");
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = self.fetch_timeout.as_millis() as u64,
                        "Snapshot fetch timed out, retrying next tick"
                    );
                }
            }
        }
    }
}
