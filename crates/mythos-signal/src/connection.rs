//! Per-connection handler: register, pump frames both ways, unregister.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use mythos_common::ConnectionId;

use crate::hub::Hub;
use crate::peer::Peer;

/// Handle a single upgraded WebSocket until it closes.
pub async fn handle_connection(socket: WebSocket, addr: SocketAddr, hub: Hub, outbox_capacity: usize) {
    let (mut sink, mut stream) = socket.split();

    let id = ConnectionId::new();
    let (peer, mut rx) = Peer::channel(id.clone(), outbox_capacity);
    tracing::debug!(peer = %addr, conn = %id, "WebSocket accepted");
    hub.connect(peer).await;

    loop {
        tokio::select! {
            // Frames queued by the relay → this client's socket
            Some(frame) = rx.recv() => {
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }

            // Frames from this client → relay core. Pings are answered by
            // the WebSocket layer itself.
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        hub.handle_frame(&id, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                        Ok(text) => hub.handle_frame(&id, text).await,
                        Err(e) => {
                            tracing::warn!(conn = %id, error = %e, "Binary frame is not UTF-8, dropped");
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(conn = %id, error = %e, "WS error");
                        break;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                }
            }
        }
    }

    // From here on the peer reports closed and sends to it are dropped.
    rx.close();
    hub.disconnect(&id).await;
    let _ = sink.close().await;
}
