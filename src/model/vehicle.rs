//! Vehicle domain types
//!
//! The per-vehicle state that is broadcast to streaming clients. Values are
//! produced by a snapshot source and never mutated after construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Driving status reported by the telemetry provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveStatus {
    /// Engine off
    Off,
    /// Engine on, not moving
    Idle,
    /// In motion
    Driving,
    /// Provider did not report a recognizable status
    #[default]
    Unknown,
}

impl DriveStatus {
    /// Whether the engine is running (idle or driving)
    pub fn is_active(&self) -> bool {
        matches!(self, DriveStatus::Idle | DriveStatus::Driving)
    }
}

/// A point-in-time vehicle location with motion attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// When the point was observed
    pub timestamp: DateTime<Utc>,

    pub latitude: f64,

    pub longitude: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,

    /// Heading in degrees clockwise from north
    #[serde(default)]
    pub heading: u16,

    /// Speed in km/h
    #[serde(default)]
    pub speed: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_on: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_motion: Option<bool>,
}

/// One vehicle as of a single poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Stable provider-assigned key
    pub device_id: String,

    /// Name shown to clients
    pub display_name: String,

    #[serde(default)]
    pub online: bool,

    /// Latest observed point, if the provider has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default)]
    pub drive_status: DriveStatus,
}

impl VehicleState {
    /// Whether the vehicle is currently moving
    ///
    /// Prefers the provider's drive status; falls back to the in-motion flag
    /// on the latest point.
    pub fn is_moving(&self) -> bool {
        self.drive_status == DriveStatus::Driving
            || self
                .position
                .as_ref()
                .and_then(|p| p.in_motion)
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(drive_status: DriveStatus) -> VehicleState {
        VehicleState {
            device_id: "dev-1".into(),
            display_name: "Truck 1".into(),
            online: true,
            position: None,
            drive_status,
        }
    }

    #[test]
    fn test_drive_status_serde_snake_case() {
        let json = serde_json::to_string(&DriveStatus::Driving).unwrap();
        assert_eq!(json, "\"driving\"");

        let parsed: DriveStatus = serde_json::from_str("\"idle\"").unwrap();
        assert_eq!(parsed, DriveStatus::Idle);
    }

    #[test]
    fn test_missing_fields_default() {
        let v: VehicleState =
            serde_json::from_str(r#"{"device_id":"d","display_name":"n"}"#).unwrap();

        assert!(!v.online);
        assert!(v.position.is_none());
        assert_eq!(v.drive_status, DriveStatus::Unknown);
    }

    #[test]
    fn test_is_moving_from_drive_status() {
        assert!(vehicle(DriveStatus::Driving).is_moving());
        assert!(!vehicle(DriveStatus::Idle).is_moving());
        assert!(!vehicle(DriveStatus::Unknown).is_moving());
    }

    #[test]
    fn test_is_moving_from_in_motion_flag() {
        let mut v = vehicle(DriveStatus::Unknown);
        v.position = Some(Position {
            timestamp: Utc::now(),
            latitude: 34.05,
            longitude: -118.24,
            altitude: None,
            heading: 90,
            speed: 42.0,
            fuel_percent: None,
            engine_on: Some(true),
            in_motion: Some(true),
        });

        assert!(v.is_moving());
    }

    #[test]
    fn test_drive_status_is_active() {
        assert!(DriveStatus::Idle.is_active());
        assert!(DriveStatus::Driving.is_active());
        assert!(!DriveStatus::Off.is_active());
        assert!(!DriveStatus::Unknown.is_active());
    }

    #[test]
    fn test_optional_position_fields_omitted() {
        let v = vehicle(DriveStatus::Off);
        let json = serde_json::to_string(&v).unwrap();

        // No position key at all when the provider has no point
        assert!(!json.contains("position"));
    }
}
