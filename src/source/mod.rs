//! Snapshot source boundary
//!
//! A snapshot source supplies the current set of vehicles on demand. The
//! poller and the per-connection initial push both call it; implementations
//! may cross a network boundary and can fail or hang, so callers bound each
//! fetch with `tokio::time::timeout`.

pub mod http;
pub mod sim;

use async_trait::async_trait;

use crate::model::VehicleSnapshot;

pub use http::GpsApiClient;
pub use sim::SimulatedSource;

/// Supplier of the current vehicle fleet state
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch a fresh snapshot of all vehicles
    async fn fetch(&self) -> Result<VehicleSnapshot, SourceError>;
}

/// Error type for snapshot fetches
#[derive(Debug)]
pub enum SourceError {
    /// Transport-level failure talking to the provider
    Request(reqwest::Error),
    /// Provider answered with a non-success status
    Status { status: u16, body: String },
    /// Source cannot currently produce a snapshot
    Unavailable(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Request(e) => write!(f, "request failed: {}", e),
            SourceError::Status { status, body } => {
                write!(f, "provider returned status {}: {}", status, body)
            }
            SourceError::Unavailable(reason) => write!(f, "source unavailable: {}", reason),
        }
    }
}

impl std::error::Error for SourceError {}
