//! Telemetry server listener
//!
//! Handles the TCP accept loop, spawns the poller and per-connection
//! handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::hub::{Hub, HubConfig};
use crate::poller::Poller;
use crate::server::config::ServerConfig;
use crate::server::connection;
use crate::source::SnapshotSource;

/// Telemetry streaming server
///
/// Owns the hub, the snapshot source, and the accept loop. Each accepted
/// socket becomes one subscriber connection.
pub struct WsServer {
    config: ServerConfig,
    hub: Arc<Hub>,
    source: Arc<dyn SnapshotSource>,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl WsServer {
    /// Create a new server with the given configuration and snapshot source
    pub fn new(config: ServerConfig, source: Arc<dyn SnapshotSource>) -> Self {
        Self::with_hub_config(config, source, HubConfig::default())
    }

    /// Create a new server with custom hub configuration
    pub fn with_hub_config(
        config: ServerConfig,
        source: Arc<dyn SnapshotSource>,
        hub_config: HubConfig,
    ) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            hub: Arc::new(Hub::with_config(hub_config)),
            source,
            connection_semaphore,
        }
    }

    /// Get a reference to the hub
    ///
    /// Mutation paths use this to broadcast a changed vehicle through the
    /// same fan-out and backpressure policy as poll results.
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Run the server
    ///
    /// Binds, starts the poller, and accepts connections until the process
    /// exits.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Telemetry server listening");

        let _poller_handle = self.spawn_poller();

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    ///
    /// On shutdown the poller stops and the hub closes, which disconnects
    /// every subscriber.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Telemetry server listening");

        let poller_handle = self.spawn_poller();

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        };

        poller_handle.abort();
        self.hub.close().await;

        result
    }

    fn spawn_poller(&self) -> tokio::task::JoinHandle<()> {
        Poller::new(
            Arc::clone(&self.source),
            Arc::clone(&self.hub),
            self.config.poll_interval,
            self.config.fetch_timeout,
        )
        .spawn()
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::debug!(peer = %peer_addr, error = %e, "Failed to set TCP_NODELAY");
            }
        }

        let hub = Arc::clone(&self.hub);
        let source = Arc::clone(&self.source);
        let config = self.config.clone();

        tokio::spawn(async move {
            connection::handle(socket, peer_addr, hub, source, config).await;
            // Permit lives for the whole connection
            drop(permit);
        });
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VehicleSnapshot;
    use crate::source::SimulatedSource;

    fn server(max_connections: usize) -> WsServer {
        WsServer::new(
            ServerConfig::default().max_connections(max_connections),
            Arc::new(SimulatedSource::new(2)),
        )
    }

    #[test]
    fn test_connection_limit_semaphore() {
        assert!(server(0).connection_semaphore.is_none());

        let limited = server(3);
        let sem = limited.connection_semaphore.as_ref().unwrap();
        assert_eq!(sem.available_permits(), 3);
    }

    #[tokio::test]
    async fn test_hub_accessor_shares_registry() {
        let server = server(0);
        let sub = server.hub().register().await.unwrap();

        assert_eq!(server.hub().subscriber_count().await, 1);
        server.hub().unregister(sub.id).await;
        assert_eq!(server.hub().subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_custom_hub_config_applies() {
        let server = WsServer::with_hub_config(
            ServerConfig::default(),
            Arc::new(SimulatedSource::new(1)),
            HubConfig::default().queue_capacity(2),
        );
        let mut sub = server.hub().register().await.unwrap();

        // Three undrained publishes overflow a capacity-2 queue and evict.
        for _ in 0..3 {
            server.hub().publish(VehicleSnapshot::new(Vec::new())).await;
        }

        assert_eq!(server.hub().subscriber_count().await, 0);
        assert_eq!(server.hub().stats().evicted, 1);

        // What already fit stays drainable before the closed queue reports
        // end of stream.
        assert!(sub.updates.recv().await.is_some());
        assert!(sub.updates.recv().await.is_some());
        assert!(sub.updates.recv().await.is_none());
    }
}
