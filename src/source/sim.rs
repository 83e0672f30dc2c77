//! Simulated snapshot source
//!
//! Random-walks a fixed fleet so the server can run without provider
//! credentials. Powers the demo and local development.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tokio::sync::Mutex;

use crate::model::{DriveStatus, Position, VehicleSnapshot, VehicleState};

use super::{SnapshotSource, SourceError};

const BASE_LATITUDE: f64 = 34.0522;
const BASE_LONGITUDE: f64 = -118.2437;

/// In-memory source that drifts a synthetic fleet on every fetch
pub struct SimulatedSource {
    fleet: Mutex<Vec<VehicleState>>,
}

impl SimulatedSource {
    /// Create a fleet of `size` vehicles spread around the base point
    pub fn new(size: usize) -> Self {
        let mut rng = rand::thread_rng();

        let fleet = (0..size)
            .map(|i| VehicleState {
                device_id: format!("sim-{:03}", i + 1),
                display_name: format!("Unit {}", i + 1),
                online: true,
                position: Some(Position {
                    timestamp: Utc::now(),
                    latitude: BASE_LATITUDE + rng.gen_range(-0.05..0.05),
                    longitude: BASE_LONGITUDE + rng.gen_range(-0.05..0.05),
                    altitude: None,
                    heading: rng.gen_range(0..360),
                    speed: 0.0,
                    fuel_percent: Some(rng.gen_range(20.0..100.0)),
                    engine_on: Some(true),
                    in_motion: Some(false),
                }),
                drive_status: DriveStatus::Idle,
            })
            .collect();

        Self {
            fleet: Mutex::new(fleet),
        }
    }
}

#[async_trait]
impl SnapshotSource for SimulatedSource {
    async fn fetch(&self) -> Result<VehicleSnapshot, SourceError> {
        let mut fleet = self.fleet.lock().await;
        let mut rng = rand::thread_rng();

        for vehicle in fleet.iter_mut() {
            if let Some(position) = vehicle.position.as_mut() {
                position.latitude += rng.gen_range(-0.005..0.005);
                position.longitude += rng.gen_range(-0.005..0.005);
                position.heading = rng.gen_range(0..360);
                position.speed = rng.gen_range(0.0..90.0);
                position.in_motion = Some(position.speed > 1.0);
                position.timestamp = Utc::now();
            }

            let moving = vehicle
                .position
                .as_ref()
                .and_then(|p| p.in_motion)
                .unwrap_or(false);
            vehicle.drive_status = if moving {
                DriveStatus::Driving
            } else {
                DriveStatus::Idle
            };
        }

        Ok(VehicleSnapshot::new(fleet.clone()))
    }
}
