//! Shared handle that serializes every event into the relay core.

use std::sync::Arc;

use mythos_common::ConnectionId;
use tokio::sync::Mutex;

use crate::peer::Peer;
use crate::relay::{Relay, RelaySettings};
use crate::room::Membership;

/// Cloneable handle given to every connection task.
///
/// Connect, frame and close events all take the same lock, so handlers
/// never observe each other half way. Nothing awaits while it is held.
#[derive(Clone)]
pub struct Hub {
    relay: Arc<Mutex<Relay>>,
}

impl Hub {
    pub fn new(settings: RelaySettings) -> Self {
        Self {
            relay: Arc::new(Mutex::new(Relay::new(settings))),
        }
    }

    pub async fn connect(&self, peer: Peer) {
        self.relay.lock().await.connect(peer);
    }

    pub async fn handle_frame(&self, sender: &ConnectionId, text: &str) {
        self.relay.lock().await.handle_frame(sender, text);
    }

    pub async fn disconnect(&self, id: &ConnectionId) -> Membership {
        self.relay.lock().await.disconnect(id)
    }
}
