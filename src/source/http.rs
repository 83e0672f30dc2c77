//! HTTP snapshot source
//!
//! Client for the tracking provider's REST API: an authenticated device
//! listing with each device's latest position. The provider's wire shape is
//! kept private here and transformed into the domain model.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{DriveStatus, Position, VehicleSnapshot, VehicleState};

use super::{SnapshotSource, SourceError};

/// Snapshot source backed by the provider's REST API
pub struct GpsApiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GpsApiClient {
    /// Create a client with a request-level timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(SourceError::Request)?;

        let base_url = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl SnapshotSource for GpsApiClient {
    async fn fetch(&self) -> Result<VehicleSnapshot, SourceError> {
        let url = format!("{}/device?latest_point=true", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(SourceError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let listing: DeviceListing = response.json().await.map_err(SourceError::Request)?;
        let vehicles = listing
            .result_list
            .into_iter()
            .map(Device::into_vehicle)
            .collect();

        Ok(VehicleSnapshot::new(vehicles))
    }
}

/// Top-level device listing response
#[derive(Debug, Deserialize)]
struct DeviceListing {
    result_list: Vec<Device>,
}

/// One device as the provider reports it
#[derive(Debug, Deserialize)]
struct Device {
    device_id: String,
    display_name: String,
    #[serde(default)]
    online: bool,
    latest_device_point: Option<DevicePoint>,
    #[serde(default)]
    device_state: DeviceDriveState,
}

#[derive(Debug, Deserialize)]
struct DevicePoint {
    #[serde(rename = "dt_tracker")]
    timestamp: DateTime<Utc>,
    lat: f64,
    lng: f64,
    altitude: Option<f64>,
    #[serde(default, rename = "angle")]
    heading: u16,
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    device_point_detail: PointDetail,
}

#[derive(Debug, Default, Deserialize)]
struct PointDetail {
    fuel_percent: Option<f64>,
    #[serde(rename = "vbus_engine_on")]
    engine_on: Option<bool>,
    #[serde(rename = "vbus_in_motion")]
    in_motion: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct DeviceDriveState {
    #[serde(default)]
    drive_status: String,
}

impl Device {
    fn into_vehicle(self) -> VehicleState {
        let drive_status = match self.device_state.drive_status.as_str() {
            "off" => DriveStatus::Off,
            "idle" => DriveStatus::Idle,
            "driving" => DriveStatus::Driving,
            _ => DriveStatus::Unknown,
        };

        VehicleState {
            device_id: self.device_id,
            display_name: self.display_name,
            online: self.online,
            position: self.latest_device_point.map(|point| Position {
                timestamp: point.timestamp,
                latitude: point.lat,
                longitude: point.lng,
                altitude: point.altitude,
                heading: point.heading,
                speed: point.speed,
                fuel_percent: point.device_point_detail.fuel_percent,
                engine_on: point.device_point_detail.engine_on,
                in_motion: point.device_point_detail.in_motion,
            }),
            drive_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "result_list": [
            {
                "device_id": "dev-42",
                "display_name": "Delivery Van",
                "online": true,
                "latest_device_point": {
                    "dt_tracker": "2024-03-01T17:30:00Z",
                    "lat": 34.0522,
                    "lng": -118.2437,
                    "altitude": 89.5,
                    "angle": 270,
                    "speed": 54.3,
                    "device_point_detail": {
                        "fuel_percent": 62.0,
                        "vbus_engine_on": true,
                        "vbus_in_motion": true
                    }
                },
                "device_state": { "drive_status": "driving" }
            },
            {
                "device_id": "dev-43",
                "display_name": "Spare",
                "device_state": { "drive_status": "parked" }
            }
        ]
    }"#;

    #[test]
    fn test_device_listing_maps_to_domain() {
        let listing: DeviceListing = serde_json::from_str(SAMPLE).unwrap();
        let vehicles: Vec<VehicleState> = listing
            .result_list
            .into_iter()
            .map(Device::into_vehicle)
            .collect();

        let van = &vehicles[0];
        assert_eq!(van.device_id, "dev-42");
        assert!(van.online);
        assert_eq!(van.drive_status, DriveStatus::Driving);

        let position = van.position.as_ref().unwrap();
        assert_eq!(position.latitude, 34.0522);
        assert_eq!(position.heading, 270);
        assert_eq!(position.altitude, Some(89.5));
        assert_eq!(position.engine_on, Some(true));
    }

    #[test]
    fn test_unknown_drive_status_and_missing_point() {
        let listing: DeviceListing = serde_json::from_str(SAMPLE).unwrap();
        let spare = listing.result_list.into_iter().nth(1).unwrap().into_vehicle();

        assert_eq!(spare.drive_status, DriveStatus::Unknown);
        assert!(spare.position.is_none());
        assert!(!spare.online);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            GpsApiClient::new("https://example.test/api/", "key", Duration::from_secs(5)).unwrap();

        assert_eq!(client.base_url, "https://example.test/api");
    }
}
