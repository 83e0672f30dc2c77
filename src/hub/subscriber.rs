//! Subscriber handle types

use tokio::sync::mpsc;

use super::update::VehicleUpdate;

/// Unique identifier for one live subscriber connection
pub type SubscriberId = u64;

/// Hub-side state for one subscriber
///
/// Dropping the handle closes the outbound queue, which the connection's
/// writer observes as its signal to close the transport. Queue membership in
/// the registry is the subscriber's liveness: present means eligible for
/// broadcasts, removed means delivery has stopped for good.
#[derive(Debug)]
pub(super) struct SubscriberHandle {
    pub(super) tx: mpsc::Sender<VehicleUpdate>,
}

/// Connection-side half of a registration
///
/// Carries the subscriber's id and the receive end of its bounded outbound
/// queue. The queue closing means the subscriber was evicted or the hub shut
/// down; either way the connection drains what is left and closes its
/// transport.
#[derive(Debug)]
pub struct Subscription {
    /// Id assigned by the hub
    pub id: SubscriberId,

    /// Receive half of the outbound queue
    pub updates: mpsc::Receiver<VehicleUpdate>,
}
