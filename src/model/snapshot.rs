//! Snapshot type handed to the hub for fan-out

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::vehicle::VehicleState;

/// A complete, immutable point-in-time set of vehicle states
///
/// Each poll produces a new, independent snapshot. Nothing mutates a snapshot
/// after construction, so one can be shared across any number of subscriber
/// queues without copying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// All vehicles as of this poll
    pub vehicles: Vec<VehicleState>,
}

impl VehicleSnapshot {
    /// Create a snapshot stamped with the current time
    pub fn new(vehicles: Vec<VehicleState>) -> Self {
        Self {
            taken_at: Utc::now(),
            vehicles,
        }
    }

    /// Snapshot carrying a single vehicle
    ///
    /// Used by mutation paths that broadcast one changed vehicle through the
    /// same fan-out as full poll results.
    pub fn single(vehicle: VehicleState) -> Self {
        Self::new(vec![vehicle])
    }

    /// Number of vehicles in the snapshot
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether the snapshot contains no vehicles
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Look up a vehicle by its device id
    pub fn get(&self, device_id: &str) -> Option<&VehicleState> {
        self.vehicles.iter().find(|v| v.device_id == device_id)
    }
}
