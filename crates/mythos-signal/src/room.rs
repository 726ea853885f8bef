//! Room registry: the single host and the participants that joined it.

use std::collections::HashMap;

use mythos_common::ConnectionId;

use crate::peer::Peer;

/// Where a connection stands relative to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Unregistered,
    Host,
    Participant,
}

/// The one room this relay serves.
///
/// An id is never both host and participant.
#[derive(Debug, Default)]
pub struct Room {
    host: Option<Peer>,
    participants: HashMap<ConnectionId, Peer>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `peer` as host, replacing any current host.
    pub fn set_host(&mut self, peer: Peer) -> Option<Peer> {
        self.participants.remove(peer.id());
        self.host.replace(peer)
    }

    pub fn clear_host(&mut self) -> Option<Peer> {
        self.host.take()
    }

    pub fn host(&self) -> Option<&Peer> {
        self.host.as_ref()
    }

    pub fn host_id(&self) -> Option<&ConnectionId> {
        self.host.as_ref().map(Peer::id)
    }

    pub fn is_host(&self, id: &ConnectionId) -> bool {
        self.host_id() == Some(id)
    }

    /// Insert or overwrite a participant.
    pub fn add_participant(&mut self, id: ConnectionId, peer: Peer) {
        self.participants.insert(id, peer);
    }

    pub fn remove_participant(&mut self, id: &ConnectionId) -> Option<Peer> {
        self.participants.remove(id)
    }

    pub fn clear_participants(&mut self) {
        self.participants.clear();
    }

    pub fn is_participant(&self, id: &ConnectionId) -> bool {
        self.participants.contains_key(id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Host if `id` names it, otherwise the participant with that id.
    pub fn resolve_target(&self, id: &ConnectionId) -> Option<&Peer> {
        match &self.host {
            Some(host) if host.id() == id => Some(host),
            _ => self.participants.get(id),
        }
    }

    pub fn membership(&self, id: &ConnectionId) -> Membership {
        if self.is_host(id) {
            Membership::Host
        } else if self.is_participant(id) {
            Membership::Participant
        } else {
            Membership::Unregistered
        }
    }
}
