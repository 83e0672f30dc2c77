//! Real-time vehicle telemetry distribution
//!
//! `fleet-stream` fans live vehicle updates, polled from an external GPS
//! provider, out to any number of connected WebSocket clients.
//!
//! # Architecture
//!
//! ```text
//! SnapshotSource ──► Poller ──► Hub ──► per-subscriber queue ──► WebSocket
//!      ▲                        ▲
//!      │ initial push           │ register / unregister
//!      └─────── WsServer ◄── TCP accept + handshake
//! ```
//!
//! - [`source::SnapshotSource`] supplies the current fleet on demand; ships
//!   with an HTTP provider client and a simulator.
//! - [`poller::Poller`] fetches on a fixed cadence and absorbs transient
//!   provider failures.
//! - [`hub::Hub`] owns the subscriber registry and broadcasts every snapshot
//!   with a non-blocking, drop-and-evict backpressure policy.
//! - [`server::WsServer`] accepts WebSocket clients and runs each
//!   connection's delivery lifecycle.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fleet_stream::server::{ServerConfig, WsServer};
//! use fleet_stream::source::SimulatedSource;
//!
//! #[tokio::main]
//! async fn main() -> fleet_stream::Result<()> {
//!     let source = Arc::new(SimulatedSource::new(8));
//!     let server = WsServer::new(ServerConfig::default(), source);
//!     server.run().await
//! }
//! ```

pub mod error;
pub mod hub;
pub mod model;
pub mod poller;
pub mod server;
pub mod source;

pub use error::{Error, Result};
pub use hub::{Hub, HubConfig};
pub use model::{VehicleSnapshot, VehicleState};
pub use poller::Poller;
pub use server::{ServerConfig, WsServer};
pub use source::SnapshotSource;
