//! One handler per client event.
//!
//! Every send is best effort: a target that is unknown, closed or backed
//! up is skipped without telling the sender.

use mythos_common::ConnectionId;
use tracing::{debug, info, trace};

use crate::protocol::{
    events, RelayEnvelope, RelayKind, RelayPayload, ScreenChunkAckPayload, ScreenChunkPayload,
    ServerMessage,
};
use crate::relay::Relay;

impl Relay {
    /// `master_create_room`: the sender becomes host and everyone hears
    /// about it, the sender included.
    pub(crate) fn create_room(&mut self, sender: &ConnectionId) {
        let Some(peer) = self.connections.get(sender).cloned() else {
            debug!(conn = %sender, "create_room from unknown connection");
            return;
        };

        if let Some(previous) = self.room.set_host(peer) {
            if previous.id() != sender {
                info!(conn = %sender, previous = %previous.id(), "Host replaced");
            }
        }
        info!(conn = %sender, "Room created");

        self.broadcast(
            &ServerMessage::MasterReady {
                master_id: sender.clone(),
            },
            None,
        );
    }

    /// `player_join_room`: register the sender and tell the host.
    pub(crate) fn join_room(&mut self, sender: &ConnectionId) {
        let Some(host) = self.room.host().cloned() else {
            if let Some(peer) = self.connections.get(sender) {
                Self::send_to(
                    peer,
                    &ServerMessage::ErrorNoMaster {
                        message: self.settings.no_master_message.clone(),
                    },
                );
            }
            return;
        };

        if host.id() == sender {
            debug!(conn = %sender, "host tried to join its own room");
            return;
        }
        let Some(peer) = self.connections.get(sender).cloned() else {
            return;
        };

        self.room.add_participant(sender.clone(), peer);
        info!(conn = %sender, host = %host.id(), "Participant joined");

        Self::send_to(
            &host,
            &ServerMessage::PlayerJoined {
                player_id: sender.clone(),
            },
        );
    }

    /// `webrtc_offer` / `webrtc_answer` / `webrtc_ice_candidate`.
    pub(crate) fn relay_signal(
        &self,
        sender: &ConnectionId,
        kind: RelayKind,
        payload: &RelayPayload,
    ) {
        let Some(target) = self.room.resolve_target(&payload.target_id) else {
            debug!(conn = %sender, target = %payload.target_id, event = kind.event(), "relay target not found");
            return;
        };

        let envelope = RelayEnvelope::forward(
            kind.event(),
            sender,
            Some(payload.target_id.as_str()),
            &payload.fields,
        );
        if Self::send_to(target, &envelope) {
            let detail = payload.summary().unwrap_or_default();
            debug!(
                event = kind.event(),
                from = %sender,
                to = %payload.target_id,
                detail = %detail,
                "Relayed"
            );
        }
    }

    /// `screen_chunk`: targeted when `targetId` is set, otherwise sent to
    /// every other open connection.
    pub(crate) fn relay_screen_chunk(&self, sender: &ConnectionId, chunk: &ScreenChunkPayload) {
        if self.settings.relay_trace {
            let index = chunk.fields.get("index").cloned().unwrap_or_default();
            let total = chunk.fields.get("total").cloned().unwrap_or_default();
            trace!(
                from = %sender,
                target = chunk.target_id.as_deref().unwrap_or("*"),
                %index,
                %total,
                "screen_chunk"
            );
        }

        let envelope = RelayEnvelope::forward(
            events::SCREEN_CHUNK,
            sender,
            chunk.target_id.as_deref(),
            &chunk.fields,
        );
        self.deliver(sender, chunk.target().as_ref(), &envelope);
    }

    /// `screen_chunk_ack`: same routing as a chunk, payload trimmed to
    /// `senderId` and `frame_id`.
    pub(crate) fn relay_screen_chunk_ack(
        &self,
        sender: &ConnectionId,
        ack: &ScreenChunkAckPayload,
    ) {
        if self.settings.relay_trace {
            let frame_id = ack.frame_id.clone().unwrap_or_default();
            trace!(
                from = %sender,
                target = ack.target_id.as_deref().unwrap_or("*"),
                %frame_id,
                "screen_chunk_ack"
            );
        }

        let envelope = RelayEnvelope::ack(sender, ack.frame_id.as_ref());
        self.deliver(sender, ack.target().as_ref(), &envelope);
    }

    fn deliver(&self, sender: &ConnectionId, target: Option<&ConnectionId>, envelope: &RelayEnvelope) {
        match target {
            Some(target) => {
                if let Some(peer) = self.room.resolve_target(target) {
                    Self::send_to(peer, envelope);
                }
            }
            None => {
                self.broadcast(envelope, Some(sender));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::relay::testing::{connect, send, Client};
    use crate::relay::{Relay, RelaySettings};
    use serde_json::{json, Value};

    fn relay() -> Relay {
        Relay::new(RelaySettings::default())
    }

    fn create_room(relay: &mut Relay, host: &Client) {
        send(relay, host, json!({"event": "master_create_room", "data": {}}));
    }

    fn join(relay: &mut Relay, player: &Client) {
        send(relay, player, json!({"event": "player_join_room", "data": {}}));
    }

    /// Host `H` with participants `P1` and `P2`, all inboxes drained.
    fn session(relay: &mut Relay) -> (Client, Client, Client) {
        let mut host = connect(relay, "H");
        let mut p1 = connect(relay, "P1");
        let mut p2 = connect(relay, "P2");
        create_room(relay, &host);
        join(relay, &p1);
        join(relay, &p2);
        host.drain();
        p1.drain();
        p2.drain();
        (host, p1, p2)
    }

    #[test]
    fn create_room_announces_host_to_everyone() {
        let mut relay = relay();
        let mut a = connect(&mut relay, "A");
        let mut b = connect(&mut relay, "B");

        create_room(&mut relay, &a);

        let expected = json!({"event": "master_ready", "data": {"masterId": "A"}});
        assert_eq!(a.drain(), vec![expected.clone()]);
        assert_eq!(b.drain(), vec![expected]);
        assert!(relay.room().is_host(&a.id));
    }

    #[test]
    fn second_create_room_takes_over() {
        let mut relay = relay();
        let mut a = connect(&mut relay, "A");
        let mut b = connect(&mut relay, "B");

        create_room(&mut relay, &a);
        create_room(&mut relay, &b);

        assert!(relay.room().is_host(&b.id));
        let ready_for_b = json!({"event": "master_ready", "data": {"masterId": "B"}});
        assert_eq!(a.drain().last(), Some(&ready_for_b));
        assert_eq!(b.drain().last(), Some(&ready_for_b));
    }

    #[test]
    fn join_without_host_gets_error_only() {
        let mut relay = relay();
        let mut p = connect(&mut relay, "P");
        let mut other = connect(&mut relay, "O");

        join(&mut relay, &p);

        assert_eq!(
            p.drain(),
            vec![json!({"event": "error_no_master", "data": {"message": "Master not found."}})]
        );
        assert!(other.drain().is_empty());
        assert_eq!(relay.room().participant_count(), 0);
        assert!(relay.room().host().is_none());
    }

    #[test]
    fn join_uses_configured_error_text() {
        let mut relay = Relay::new(RelaySettings {
            no_master_message: "Mestre não encontrado.".into(),
            relay_trace: false,
        });
        let mut p = connect(&mut relay, "P");
        join(&mut relay, &p);
        assert_eq!(p.drain()[0]["data"]["message"], json!("Mestre não encontrado."));
    }

    #[test]
    fn join_notifies_only_the_host() {
        let mut relay = relay();
        let mut host = connect(&mut relay, "H");
        let mut p1 = connect(&mut relay, "P1");
        let mut bystander = connect(&mut relay, "X");
        create_room(&mut relay, &host);
        host.drain();
        p1.drain();
        bystander.drain();

        join(&mut relay, &p1);

        assert_eq!(
            host.drain(),
            vec![json!({"event": "player_joined", "data": {"playerId": "P1"}})]
        );
        assert!(p1.drain().is_empty());
        assert!(bystander.drain().is_empty());
        assert!(relay.room().is_participant(&p1.id));
    }

    #[test]
    fn host_joining_itself_is_ignored() {
        let mut relay = relay();
        let mut host = connect(&mut relay, "H");
        create_room(&mut relay, &host);
        host.drain();

        join(&mut relay, &host);

        assert!(host.drain().is_empty());
        assert_eq!(relay.room().participant_count(), 0);
    }

    #[test]
    fn offer_round_trip_to_host() {
        let mut relay = relay();
        let mut b = connect(&mut relay, "B");
        let mut a = connect(&mut relay, "A");
        create_room(&mut relay, &b);
        b.drain();
        a.drain();

        send(
            &mut relay,
            &a,
            json!({"event": "webrtc_offer", "data": {"targetId": "B", "offer": {"sdp": "x"}}}),
        );

        assert_eq!(
            b.drain(),
            vec![json!({
                "event": "webrtc_offer",
                "data": {"targetId": "B", "offer": {"sdp": "x"}, "senderId": "A"}
            })]
        );
        assert!(a.drain().is_empty());
    }

    #[test]
    fn answer_and_candidate_reach_only_the_participant() {
        let mut relay = relay();
        let (mut host, mut p1, mut p2) = session(&mut relay);

        send(
            &mut relay,
            &host,
            json!({"event": "webrtc_answer", "data": {"targetId": "P1", "answer": {"type": "answer", "sdp": "v=0"}}}),
        );
        send(
            &mut relay,
            &host,
            json!({"event": "webrtc_ice_candidate", "data": {"targetId": "P1", "candidate": {"candidate": "c", "sdpMLineIndex": 0}}}),
        );

        let frames = p1.drain();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["event"], json!("webrtc_answer"));
        assert_eq!(frames[0]["data"]["senderId"], json!("H"));
        assert_eq!(frames[0]["data"]["answer"]["sdp"], json!("v=0"));
        assert_eq!(frames[1]["event"], json!("webrtc_ice_candidate"));
        assert_eq!(frames[1]["data"]["candidate"]["sdpMLineIndex"], json!(0));
        assert!(host.drain().is_empty());
        assert!(p2.drain().is_empty());
    }

    #[test]
    fn relay_to_unknown_target_sends_nothing() {
        let mut relay = relay();
        let (mut host, mut p1, mut p2) = session(&mut relay);
        let mut stranger = connect(&mut relay, "S");
        stranger.drain();

        // S is connected but never registered, so it cannot be addressed.
        send(
            &mut relay,
            &p1,
            json!({"event": "webrtc_offer", "data": {"targetId": "S", "offer": {}}}),
        );
        send(
            &mut relay,
            &p1,
            json!({"event": "webrtc_offer", "data": {"targetId": "nobody", "offer": {}}}),
        );

        for client in [&mut host, &mut p1, &mut p2, &mut stranger] {
            assert!(client.drain().is_empty());
        }
    }

    #[test]
    fn relay_without_host_finds_no_target() {
        let mut relay = relay();
        let a = connect(&mut relay, "A");
        let mut b = connect(&mut relay, "B");

        send(
            &mut relay,
            &a,
            json!({"event": "webrtc_ice_candidate", "data": {"targetId": "B", "candidate": "c"}}),
        );

        assert!(b.drain().is_empty());
    }

    #[test]
    fn relay_to_closed_target_is_dropped() {
        let mut relay = relay();
        let (host, p1, mut p2) = session(&mut relay);
        drop(p1);

        send(
            &mut relay,
            &host,
            json!({"event": "webrtc_offer", "data": {"targetId": "P1", "offer": {}}}),
        );

        assert!(p2.drain().is_empty());
    }

    #[test]
    fn screen_chunk_broadcasts_to_everyone_but_sender() {
        let mut relay = relay();
        let (mut host, mut p1, mut p2) = session(&mut relay);
        let mut unregistered = connect(&mut relay, "U");
        unregistered.drain();

        send(
            &mut relay,
            &host,
            json!({"event": "screen_chunk", "data": {"frame_id": 9, "index": 0, "total": 2, "chunk": "AAAA"}}),
        );

        let expected = json!({
            "event": "screen_chunk",
            "data": {"senderId": "H", "frame_id": 9, "index": 0, "total": 2, "chunk": "AAAA"}
        });
        assert!(host.drain().is_empty());
        assert_eq!(p1.drain(), vec![expected.clone()]);
        assert_eq!(p2.drain(), vec![expected.clone()]);
        assert_eq!(unregistered.drain(), vec![expected]);
    }

    #[test]
    fn screen_chunk_with_target_goes_to_target_only() {
        let mut relay = relay();
        let (mut host, mut p1, mut p2) = session(&mut relay);

        send(
            &mut relay,
            &p2,
            json!({"event": "screen_chunk", "data": {"targetId": "H", "index": 1, "total": 2}}),
        );

        assert_eq!(
            host.drain(),
            vec![json!({
                "event": "screen_chunk",
                "data": {"targetId": "H", "senderId": "P2", "index": 1, "total": 2}
            })]
        );
        assert!(p1.drain().is_empty());
        assert!(p2.drain().is_empty());
    }

    #[test]
    fn screen_chunk_to_unresolved_target_is_not_broadcast() {
        let mut relay = relay();
        let (mut host, mut p1, p2) = session(&mut relay);

        send(
            &mut relay,
            &p2,
            json!({"event": "screen_chunk", "data": {"targetId": "ghost", "index": 0}}),
        );

        assert!(host.drain().is_empty());
        assert!(p1.drain().is_empty());
    }

    #[test]
    fn ack_forwards_only_sender_and_frame_id() {
        let mut relay = relay();
        let (mut host, mut p1, mut p2) = session(&mut relay);

        send(
            &mut relay,
            &p1,
            json!({"event": "screen_chunk_ack", "data": {"targetId": "H", "frame_id": "f-3", "received": 12, "extra": true}}),
        );

        assert_eq!(
            host.drain(),
            vec![json!({"event": "screen_chunk_ack", "data": {"senderId": "P1", "frame_id": "f-3"}})]
        );
        assert!(p1.drain().is_empty());
        assert!(p2.drain().is_empty());
    }

    #[test]
    fn ack_without_target_broadcasts_trimmed_payload() {
        let mut relay = relay();
        let (mut host, mut p1, mut p2) = session(&mut relay);

        send(
            &mut relay,
            &p1,
            json!({"event": "screen_chunk_ack", "data": {"frame_id": 4, "note": "drop me"}}),
        );

        let expected = json!({"event": "screen_chunk_ack", "data": {"senderId": "P1", "frame_id": 4}});
        assert_eq!(host.drain(), vec![expected.clone()]);
        assert_eq!(p2.drain(), vec![expected]);
        assert!(p1.drain().is_empty());
    }

    #[test]
    fn broadcast_skips_closed_connections() {
        let mut relay = relay();
        let (host, p1, mut p2) = session(&mut relay);
        drop(p1);

        send(
            &mut relay,
            &host,
            json!({"event": "screen_chunk", "data": {"index": 0}}),
        );

        let frames: Vec<Value> = p2.drain();
        assert_eq!(frames.len(), 1);
    }
}
