//! Connection lifecycle: open and close notifications from the transport.

use mythos_common::ConnectionId;
use tracing::info;

use crate::peer::Peer;
use crate::protocol::ServerMessage;
use crate::relay::Relay;
use crate::room::Membership;

impl Relay {
    /// Track a newly opened connection. If a host is already registered
    /// the newcomer is told right away.
    pub fn connect(&mut self, peer: Peer) {
        info!(conn = %peer.id(), "Client connected");

        if let Some(host_id) = self.room.host_id() {
            Self::send_to(
                &peer,
                &ServerMessage::MasterReady {
                    master_id: host_id.clone(),
                },
            );
        }
        self.connections.insert(peer);
    }

    /// Forget a closed connection and notify whoever is affected.
    ///
    /// Returns the membership the connection had when it closed.
    pub fn disconnect(&mut self, id: &ConnectionId) -> Membership {
        self.connections.remove(id);
        info!(conn = %id, "Client disconnected");

        let membership = self.room.membership(id);
        match membership {
            Membership::Host => {
                self.room.clear_host();
                self.room.clear_participants();
                info!(conn = %id, "Host left, room closed");
                self.broadcast(&ServerMessage::MasterDisconnected {}, None);
            }
            Membership::Participant => {
                self.room.remove_participant(id);
                if let Some(host) = self.room.host() {
                    Self::send_to(
                        host,
                        &ServerMessage::PlayerLeft {
                            player_id: id.clone(),
                        },
                    );
                }
            }
            Membership::Unregistered => {}
        }
        membership
    }
}
