//! Vehicle telemetry data model
//!
//! Domain types shared by the snapshot sources, the hub, and the wire format
//! delivered to streaming clients (JSON via serde).

pub mod snapshot;
pub mod vehicle;

pub use snapshot::VehicleSnapshot;
pub use vehicle::{DriveStatus, Position, VehicleState};
