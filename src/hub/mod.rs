//! Broadcast hub for vehicle telemetry
//!
//! The hub owns the registry of live subscribers and fans every published
//! snapshot out to all of them through per-subscriber bounded queues.
//!
//! # Architecture
//!
//! ```text
//!                             Arc<Hub>
//!                  ┌────────────────────────────┐
//!                  │ subscribers: HashMap<      │
//!                  │   SubscriberId,            │
//!                  │   mpsc::Sender<Update>,    │
//!                  │ >                          │
//!                  └─────────────┬──────────────┘
//!                                │ publish() try_send
//!          ┌─────────────────────┼─────────────────────┐
//!          │                     │                     │
//!          ▼                     ▼                     ▼
//!     [Subscriber]          [Subscriber]          [Subscriber]
//!     updates.recv()        updates.recv()        updates.recv()
//!          │                     │                     │
//!          └──► writer task ──► WebSocket ──► client
//! ```
//!
//! # Backpressure
//!
//! `publish` never blocks on a subscriber. Enqueue is attempted non-blocking;
//! a full queue evicts that subscriber (its queue is released and its
//! transport closed) so a stalled client degrades only itself.
//!
//! # Zero-Copy Design
//!
//! A snapshot is encoded to JSON once per publish. The resulting
//! [`VehicleUpdate`] holds the snapshot behind an `Arc` and the payload in
//! `bytes::Bytes`, so handing it to N subscriber queues is N reference-count
//! bumps, not N copies.

pub mod config;
pub mod error;
pub mod store;
pub mod subscriber;
pub mod update;

pub use config::HubConfig;
pub use error::HubError;
pub use store::{Hub, HubStats};
pub use subscriber::{SubscriberId, Subscription};
pub use update::VehicleUpdate;
