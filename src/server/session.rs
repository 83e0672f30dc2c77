//! Per-connection session state
//!
//! Tracks where a connection is in its lifecycle and what it has delivered.
//! The phase machine only moves forward: a closed session never leaves
//! `Closed`, and there is no paused or reconnecting phase. A client that
//! reconnects becomes a brand-new subscriber.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Lifecycle phase of a subscriber connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Transport handshake done, not yet in the hub registry
    Connecting,
    /// In the registry, receiving broadcasts
    Registered,
    /// Outbound queue closed (eviction or hub shutdown), flushing the
    /// close frame
    Draining,
    /// Terminal; no transition leaves this phase
    Closed,
}

/// State and delivery counters for one connection
#[derive(Debug)]
pub struct ConnectionSession {
    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current lifecycle phase
    pub phase: ConnectionPhase,

    /// When the handshake completed
    pub connected_at: Instant,

    /// Snapshots delivered to the transport
    pub messages_sent: u64,

    /// Payload bytes delivered to the transport
    pub bytes_sent: u64,
}

impl ConnectionSession {
    /// Create a session in the `Connecting` phase
    pub fn new(peer_addr: SocketAddr) -> Self {
        Self {
            peer_addr,
            phase: ConnectionPhase::Connecting,
            connected_at: Instant::now(),
            messages_sent: 0,
            bytes_sent: 0,
        }
    }

    /// Enter `Registered` once the hub accepts the subscriber
    pub fn registered(&mut self) {
        if self.phase == ConnectionPhase::Connecting {
            self.phase = ConnectionPhase::Registered;
        }
    }

    /// Enter `Draining` when the outbound queue closes
    pub fn draining(&mut self) {
        if self.phase != ConnectionPhase::Closed {
            self.phase = ConnectionPhase::Draining;
        }
    }

    /// Enter the terminal `Closed` phase
    pub fn closed(&mut self) {
        self.phase = ConnectionPhase::Closed;
    }

    /// Whether the session reached its terminal phase
    pub fn is_closed(&self) -> bool {
        self.phase == ConnectionPhase::Closed
    }

    /// Record one delivered message
    pub fn message_sent(&mut self, bytes: usize) {
        self.messages_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    /// Time since the handshake completed
    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
