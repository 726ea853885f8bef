//! Connection handles and the table of every open connection.

use std::collections::HashMap;

use mythos_common::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Non-owning handle to one connection's outbound queue.
///
/// The connection task owns the socket and the receiving half; once it
/// exits the handle reports closed and sends are dropped.
#[derive(Debug, Clone)]
pub struct Peer {
    id: ConnectionId,
    tx: mpsc::Sender<String>,
}

impl Peer {
    pub fn new(id: ConnectionId, tx: mpsc::Sender<String>) -> Self {
        Self { id, tx }
    }

    /// Create a handle plus the receiver the connection's writer drains.
    pub fn channel(id: ConnectionId, capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(id, tx), rx)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue a frame without waiting. Returns false if it was dropped.
    pub fn send(&self, frame: String) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(conn = %self.id, "outbox full, frame dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Every connection the transport currently holds, keyed by id.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    peers: HashMap<ConnectionId, Peer>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, peer: Peer) {
        self.peers.insert(peer.id().clone(), peer);
    }

    pub fn remove(&mut self, id: &ConnectionId) -> Option<Peer> {
        self.peers.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Peer> {
        self.peers.get(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Connections whose outbound side is still alive.
    pub fn open_peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values().filter(|p| p.is_open())
    }

    /// Send `frame` to every open connection except `except`.
    /// Returns how many connections accepted it.
    pub fn broadcast(&self, frame: &str, except: Option<&ConnectionId>) -> usize {
        self.open_peers()
            .filter(|p| except != Some(p.id()))
            .filter(|p| p.send(frame.to_string()))
            .count()
    }
}
