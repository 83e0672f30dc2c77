//! Subscriber connection lifecycle
//!
//! Bridges one hub subscription to one WebSocket. After the handshake the
//! connection registers with the hub, pushes one immediately-fetched snapshot
//! so the client does not wait out a poll interval, then runs an outbound
//! writer task and an inbound reader loop until either side fails or closes.
//! Both paths converge on a single idempotent unregister; the transport is
//! closed exactly once, by the writer.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::hub::{Hub, SubscriberId, VehicleUpdate};
use crate::server::config::ServerConfig;
use crate::server::session::ConnectionSession;
use crate::source::SnapshotSource;

/// Handle one accepted socket for its whole lifetime
pub(crate) async fn handle(
    socket: TcpStream,
    peer_addr: SocketAddr,
    hub: Arc<Hub>,
    source: Arc<dyn SnapshotSource>,
    config: ServerConfig,
) {
    let mut ws = match tokio_tungstenite::accept_async(socket).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::debug!(peer = %peer_addr, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let mut session = ConnectionSession::new(peer_addr);

    let subscription = match hub.register().await {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::debug!(peer = %peer_addr, error = %e, "Registration refused");
            let _ = ws.close(None).await;
            return;
        }
    };
    session.registered();
    let id = subscription.id;

    tracing::debug!(subscriber_id = id, peer = %peer_addr, "Client connected");

    // One immediately-fetched snapshot so the client has data before the
    // first poll tick reaches it. A failed fetch is not fatal; the client
    // just waits for the next broadcast.
    match timeout(config.fetch_timeout, source.fetch()).await {
        Ok(Ok(snapshot)) => match VehicleUpdate::new(snapshot) {
            Ok(update) => {
                if let Err(e) = ws.send(Message::Text(update.payload_text())).await {
                    tracing::debug!(subscriber_id = id, error = %e, "Initial snapshot write failed");
                    hub.unregister(id).await;
                    return;
                }
                session.message_sent(update.payload.len());
            }
            Err(e) => {
                tracing::warn!(subscriber_id = id, error = %e, "Failed to encode initial snapshot")
            }
        },
        Ok(Err(e)) => {
            tracing::warn!(subscriber_id = id, error = %e, "Initial snapshot fetch failed")
        }
        Err(_) => tracing::warn!(subscriber_id = id, "Initial snapshot fetch timed out"),
    }

    let (sink, stream) = ws.split();
    let writer = tokio::spawn(outbound_loop(
        sink,
        subscription.updates,
        Arc::clone(&hub),
        id,
        session,
    ));

    inbound_loop(stream, &hub, id).await;

    // The reader is done; wait for the writer so the final log line sees its
    // counters. The writer always terminates here: unregistering dropped the
    // queue's send half, so its recv sees a closed queue.
    let session = match writer.await {
        Ok(session) => session,
        Err(_) => return,
    };

    tracing::info!(
        subscriber_id = id,
        peer = %peer_addr,
        messages_sent = session.messages_sent,
        duration_ms = session.duration().as_millis() as u64,
        "Client disconnected"
    );
}

/// Drain the outbound queue to the transport
///
/// Ends on a write error (the subscriber is torn down) or when the queue
/// closes after an eviction or hub shutdown, in which case the close frame is
/// flushed so the client observes an orderly disconnect instead of a dead
/// socket.
async fn outbound_loop(
    mut sink: SplitSink<WebSocketStream<TcpStream>, Message>,
    mut updates: mpsc::Receiver<VehicleUpdate>,
    hub: Arc<Hub>,
    id: SubscriberId,
    mut session: ConnectionSession,
) -> ConnectionSession {
    while let Some(update) = updates.recv().await {
        if let Err(e) = sink.send(Message::Text(update.payload_text())).await {
            tracing::debug!(subscriber_id = id, error = %e, "Transport write failed");
            hub.unregister(id).await;
            session.closed();
            return session;
        }
        session.message_sent(update.payload.len());
    }

    session.draining();
    let _ = sink.send(Message::Close(None)).await;
    let _ = sink.close().await;
    session.closed();
    session
}

/// Watch the transport for client-initiated close or errors
///
/// Clients send no application messages; anything other than a close frame
/// is ignored.
async fn inbound_loop(
    mut stream: SplitStream<WebSocketStream<TcpStream>>,
    hub: &Hub,
    id: SubscriberId,
) {
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(subscriber_id = id, error = %e, "Transport read failed");
                break;
            }
        }
    }

    hub.unregister(id).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DriveStatus, VehicleSnapshot, VehicleState};
    use crate::source::SourceError;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn vehicle(id: &str) -> VehicleState {
        VehicleState {
            device_id: id.into(),
            display_name: format!("Vehicle {id}"),
            online: true,
            position: None,
            drive_status: DriveStatus::Idle,
        }
    }

    struct FixedSource;

    #[async_trait]
    impl SnapshotSource for FixedSource {
        async fn fetch(&self) -> Result<VehicleSnapshot, SourceError> {
            Ok(VehicleSnapshot::single(vehicle("fixed-1")))
        }
    }

    /// Accept one loopback connection, run `handle` on it, and return the
    /// client end of the websocket.
    async fn connect_client(hub: Arc<Hub>) -> WebSocketStream<TcpStream> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (socket, peer_addr) = listener.accept().await.unwrap();
            handle(
                socket,
                peer_addr,
                hub,
                Arc::new(FixedSource),
                ServerConfig::default(),
            )
            .await;
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let (ws, _) = tokio_tungstenite::client_async(format!("ws://{addr}/"), stream)
            .await
            .unwrap();
        ws
    }

    async fn wait_for_count(hub: &Hub, expected: usize) {
        timeout(Duration::from_secs(5), async {
            while hub.subscriber_count().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("subscriber count never settled");
    }

    #[tokio::test]
    async fn test_initial_snapshot_then_broadcasts() {
        let hub = Arc::new(Hub::new());
        let mut ws = connect_client(Arc::clone(&hub)).await;

        // First frame is the immediately-fetched snapshot, ahead of any
        // broadcast.
        let first = ws.next().await.unwrap().unwrap();
        let snapshot: VehicleSnapshot = serde_json::from_str(first.to_text().unwrap()).unwrap();
        assert_eq!(snapshot.vehicles[0].device_id, "fixed-1");

        hub.publish(VehicleSnapshot::single(vehicle("pub-1"))).await;
        let second = ws.next().await.unwrap().unwrap();
        let snapshot: VehicleSnapshot = serde_json::from_str(second.to_text().unwrap()).unwrap();
        assert_eq!(snapshot.vehicles[0].device_id, "pub-1");
    }

    #[tokio::test]
    async fn test_client_close_unregisters() {
        let hub = Arc::new(Hub::new());
        let mut ws = connect_client(Arc::clone(&hub)).await;

        let _ = ws.next().await; // initial snapshot
        wait_for_count(&hub, 1).await;

        ws.close(None).await.unwrap();
        wait_for_count(&hub, 0).await;
    }

    #[tokio::test]
    async fn test_hub_close_closes_transport() {
        let hub = Arc::new(Hub::new());
        let mut ws = connect_client(Arc::clone(&hub)).await;

        let _ = ws.next().await; // initial snapshot
        wait_for_count(&hub, 1).await;

        hub.close().await;

        // The writer drains the closed queue and sends a close frame.
        let saw_close = timeout(Duration::from_secs(5), async {
            loop {
                match ws.next().await {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(_)) => break,
                }
            }
        })
        .await;
        assert!(saw_close.is_ok());
    }

    #[tokio::test]
    async fn test_abrupt_client_drop_unregisters() {
        let hub = Arc::new(Hub::new());
        let ws = connect_client(Arc::clone(&hub)).await;

        wait_for_count(&hub, 1).await;

        // No close handshake, just a dead socket.
        drop(ws);
        wait_for_count(&hub, 0).await;
    }
}
