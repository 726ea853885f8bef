//! Core relay state: the connection table and the room, owned together.
//!
//! `Relay` is plain data mutated through `&mut self`; callers must
//! serialize access (see [`crate::hub::Hub`]). Behavior is split across
//! `router` (frame parsing and dispatch), `handlers` (one method per event)
//! and `lifecycle` (connect/disconnect).

use mythos_common::ConnectionId;
use serde::Serialize;

use crate::peer::{ConnectionTable, Peer};
use crate::protocol::encode;
use crate::room::Room;

/// Tunables that affect relay behavior.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Text sent in `error_no_master`.
    pub no_master_message: String,
    /// Trace every screen chunk and ack.
    pub relay_trace: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            no_master_message: "Master not found.".into(),
            relay_trace: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Relay {
    pub(crate) connections: ConnectionTable,
    pub(crate) room: Room,
    pub(crate) settings: RelaySettings,
}

impl Relay {
    pub fn new(settings: RelaySettings) -> Self {
        Self {
            connections: ConnectionTable::new(),
            room: Room::new(),
            settings,
        }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn connections(&self) -> &ConnectionTable {
        &self.connections
    }

    /// Send one message to a single peer if it is open.
    pub(crate) fn send_to<T: Serialize>(peer: &Peer, message: &T) -> bool {
        if !peer.is_open() {
            return false;
        }
        encode(message).is_some_and(|frame| peer.send(frame))
    }

    /// Send one message to every open connection except `except`.
    pub(crate) fn broadcast<T: Serialize>(
        &self,
        message: &T,
        except: Option<&ConnectionId>,
    ) -> usize {
        encode(message).map_or(0, |frame| self.connections.broadcast(&frame, except))
    }
}
