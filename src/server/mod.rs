//! WebSocket server boundary
//!
//! Accepts inbound connections, upgrades them to WebSocket transports, and
//! runs each subscriber's delivery lifecycle against the hub.

pub mod config;
pub(crate) mod connection;
pub mod listener;
pub mod session;

pub use config::ServerConfig;
pub use listener::WsServer;
pub use session::{ConnectionPhase, ConnectionSession};
