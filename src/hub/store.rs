//! Broadcast hub implementation
//!
//! The central registry of live subscribers and the single fan-out path for
//! published snapshots.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;

use crate::model::VehicleSnapshot;

use super::config::HubConfig;
use super::error::HubError;
use super::subscriber::{SubscriberHandle, SubscriberId, Subscription};
use super::update::VehicleUpdate;

/// Central broadcaster for vehicle snapshots
///
/// Thread-safe via `RwLock`: a publish iterates the registry under the read
/// side, so it sees one consistent view, while registrations and removals
/// take the write side and wait their turn. A subscriber registered during an
/// in-flight publish receives every snapshot published after its
/// registration completes, and none before.
pub struct Hub {
    registry: RwLock<Registry>,

    config: HubConfig,

    next_subscriber_id: AtomicU64,

    /// Snapshots published since startup
    published: AtomicU64,

    /// Subscribers evicted for falling behind
    evicted: AtomicU64,
}

#[derive(Default)]
struct Registry {
    entries: HashMap<SubscriberId, SubscriberHandle>,
    closed: bool,
}

impl Hub {
    /// Create a hub with default configuration
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a hub with custom configuration
    pub fn with_config(config: HubConfig) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            config,
            next_subscriber_id: AtomicU64::new(1),
            published: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    /// Get the hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Register a new subscriber
    ///
    /// Allocates an id and a bounded outbound queue and returns the receive
    /// half. Fails once the hub has been closed.
    pub async fn register(&self) -> Result<Subscription, HubError> {
        let mut registry = self.registry.write().await;

        if registry.closed {
            return Err(HubError::Closed);
        }

        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        registry.entries.insert(id, SubscriberHandle { tx });

        tracing::info!(
            subscriber_id = id,
            subscribers = registry.entries.len(),
            "Subscriber registered"
        );

        Ok(Subscription { id, updates: rx })
    }

    /// Remove a subscriber
    ///
    /// Dropping the stored handle closes the subscriber's queue; its writer
    /// task sees the closed queue and closes the transport. Safe to call from
    /// the writer, the reader, or the hub itself concurrently: only the first
    /// call finds the entry, later calls are no-ops. Returns whether this
    /// call removed the subscriber.
    pub async fn unregister(&self, id: SubscriberId) -> bool {
        let mut registry = self.registry.write().await;

        if registry.entries.remove(&id).is_some() {
            tracing::info!(
                subscriber_id = id,
                subscribers = registry.entries.len(),
                "Subscriber unregistered"
            );
            true
        } else {
            false
        }
    }

    /// Broadcast a snapshot to every registered subscriber
    ///
    /// The snapshot is encoded once, then enqueued non-blocking onto each
    /// subscriber's bounded queue. A full queue means the consumer has
    /// stalled past its allowance: the subscriber is evicted and its
    /// transport closed rather than slowing delivery to healthy subscribers.
    /// Publish order is preserved per subscriber by its queue; there is no
    /// ordering across subscribers.
    pub async fn publish(&self, snapshot: VehicleSnapshot) {
        let update = match VehicleUpdate::new(snapshot) {
            Ok(update) => update,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode snapshot, dropping publish");
                return;
            }
        };

        let mut stalled = Vec::new();
        let mut gone = Vec::new();
        {
            let registry = self.registry.read().await;
            for (id, subscriber) in registry.entries.iter() {
                match subscriber.tx.try_send(update.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => stalled.push(*id),
                    Err(TrySendError::Closed(_)) => gone.push(*id),
                }
            }
        }

        for id in stalled {
            tracing::warn!(
                subscriber_id = id,
                capacity = self.config.queue_capacity,
                "Outbound queue full, evicting slow subscriber"
            );
            if self.unregister(id).await {
                self.evicted.fetch_add(1, Ordering::Relaxed);
            }
        }

        for id in gone {
            // Connection already died but has not unregistered yet; reap it.
            self.unregister(id).await;
        }

        self.published.fetch_add(1, Ordering::Relaxed);
    }

    /// Shut the hub down
    ///
    /// Unregisters every subscriber at once: each connection drains what is
    /// already queued, then closes its transport. Registration is refused
    /// afterwards. This is the only cancel-all operation.
    pub async fn close(&self) {
        let mut registry = self.registry.write().await;
        registry.closed = true;

        let dropped = registry.entries.len();
        registry.entries.clear();

        tracing::info!(subscribers = dropped, "Hub closed");
    }

    /// Number of currently registered subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.registry.read().await.entries.len()
    }

    /// Lifetime counters
    pub fn stats(&self) -> HubStats {
        HubStats {
            published: self.published.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

/// Hub-wide counters
#[derive(Debug, Clone, Copy, Default)]
pub struct HubStats {
    /// Snapshots published since startup
    pub published: u64,
    /// Subscribers evicted for falling behind
    pub evicted: u64,
}
