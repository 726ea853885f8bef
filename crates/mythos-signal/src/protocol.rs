//! Signaling wire protocol.
//!
//! Every frame is a JSON object `{ "event": <tag>, "data": <object> }`.
//! Inbound payloads are parsed into one struct per tag; payload fields the
//! relay does not interpret are kept verbatim so they can be forwarded.

use mythos_common::{ConnectionId, ProtocolError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event tags used on the wire.
pub mod events {
    pub const MASTER_CREATE_ROOM: &str = "master_create_room";
    pub const PLAYER_JOIN_ROOM: &str = "player_join_room";
    pub const WEBRTC_OFFER: &str = "webrtc_offer";
    pub const WEBRTC_ANSWER: &str = "webrtc_answer";
    pub const WEBRTC_ICE_CANDIDATE: &str = "webrtc_ice_candidate";
    pub const SCREEN_CHUNK: &str = "screen_chunk";
    pub const SCREEN_CHUNK_ACK: &str = "screen_chunk_ack";

    pub const MASTER_READY: &str = "master_ready";
    pub const PLAYER_JOINED: &str = "player_joined";
    pub const ERROR_NO_MASTER: &str = "error_no_master";
    pub const PLAYER_LEFT: &str = "player_left";
    pub const MASTER_DISCONNECTED: &str = "master_disconnected";
}

const TARGET_ID: &str = "targetId";
const SENDER_ID: &str = "senderId";

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Point-to-point negotiation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    Offer,
    Answer,
    IceCandidate,
}

impl RelayKind {
    pub fn event(self) -> &'static str {
        match self {
            RelayKind::Offer => events::WEBRTC_OFFER,
            RelayKind::Answer => events::WEBRTC_ANSWER,
            RelayKind::IceCandidate => events::WEBRTC_ICE_CANDIDATE,
        }
    }
}

/// Payload of an offer, answer or ICE candidate. `targetId` is mandatory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelayPayload {
    #[serde(rename = "targetId")]
    pub target_id: ConnectionId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RelayPayload {
    /// Short description of the negotiation body for diagnostics.
    pub fn summary(&self) -> Option<String> {
        if let Some(offer) = self.fields.get("offer") {
            return Some(format!("offer sdp len={}", sdp_len(offer)));
        }
        if let Some(answer) = self.fields.get("answer") {
            return Some(format!("answer sdp len={}", sdp_len(answer)));
        }
        self.fields.get("candidate").map(|candidate| {
            let text = candidate
                .get("candidate")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| candidate.to_string());
            format!("candidate={text}")
        })
    }
}

fn sdp_len(description: &Value) -> usize {
    description
        .get("sdp")
        .and_then(Value::as_str)
        .map_or(0, str::len)
}

/// Payload of a screen chunk. Without a target it is broadcast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScreenChunkPayload {
    #[serde(rename = "targetId", default)]
    pub target_id: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ScreenChunkPayload {
    pub fn target(&self) -> Option<ConnectionId> {
        non_empty_target(self.target_id.as_deref())
    }
}

/// Payload of a screen chunk acknowledgement. Only `frame_id` is forwarded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScreenChunkAckPayload {
    #[serde(rename = "targetId", default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub frame_id: Option<Value>,
}

impl ScreenChunkAckPayload {
    pub fn target(&self) -> Option<ConnectionId> {
        non_empty_target(self.target_id.as_deref())
    }
}

fn non_empty_target(target: Option<&str>) -> Option<ConnectionId> {
    target.filter(|t| !t.is_empty()).map(ConnectionId::from)
}

/// A parsed client message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    CreateRoom,
    JoinRoom,
    Relay {
        kind: RelayKind,
        payload: RelayPayload,
    },
    ScreenChunk(ScreenChunkPayload),
    ScreenChunkAck(ScreenChunkAckPayload),
}

impl InboundMessage {
    /// Build a message from its tag and payload.
    ///
    /// Returns `Ok(None)` for tags the relay does not handle, including the
    /// server-originated ones.
    pub fn from_parts(event: &str, data: Value) -> Result<Option<Self>, ProtocolError> {
        let message = match event {
            events::MASTER_CREATE_ROOM => InboundMessage::CreateRoom,
            events::PLAYER_JOIN_ROOM => InboundMessage::JoinRoom,
            events::WEBRTC_OFFER => relay(RelayKind::Offer, data)?,
            events::WEBRTC_ANSWER => relay(RelayKind::Answer, data)?,
            events::WEBRTC_ICE_CANDIDATE => relay(RelayKind::IceCandidate, data)?,
            events::SCREEN_CHUNK => InboundMessage::ScreenChunk(payload(event, data)?),
            events::SCREEN_CHUNK_ACK => InboundMessage::ScreenChunkAck(payload(event, data)?),
            _ => return Ok(None),
        };
        Ok(Some(message))
    }
}

fn relay(kind: RelayKind, data: Value) -> Result<InboundMessage, ProtocolError> {
    Ok(InboundMessage::Relay {
        kind,
        payload: payload(kind.event(), data)?,
    })
}

fn payload<T: serde::de::DeserializeOwned>(event: &str, data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Messages the relay originates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    MasterReady {
        #[serde(rename = "masterId")]
        master_id: ConnectionId,
    },
    PlayerJoined {
        #[serde(rename = "playerId")]
        player_id: ConnectionId,
    },
    ErrorNoMaster { message: String },
    PlayerLeft {
        #[serde(rename = "playerId")]
        player_id: ConnectionId,
    },
    MasterDisconnected {},
}

/// A forwarded client message with the sender's id stamped into `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayEnvelope {
    pub event: &'static str,
    pub data: Map<String, Value>,
}

impl RelayEnvelope {
    /// Envelope carrying every original field plus `senderId`.
    ///
    /// The relay's `senderId` wins over any value the client supplied.
    pub fn forward(
        event: &'static str,
        sender: &ConnectionId,
        target_id: Option<&str>,
        fields: &Map<String, Value>,
    ) -> Self {
        let mut data = fields.clone();
        if let Some(target_id) = target_id {
            data.insert(TARGET_ID.into(), Value::String(target_id.to_string()));
        }
        data.insert(SENDER_ID.into(), Value::String(sender.to_string()));
        Self { event, data }
    }

    /// Envelope for an ack: only `senderId` and `frame_id` survive.
    pub fn ack(sender: &ConnectionId, frame_id: Option<&Value>) -> Self {
        let mut data = Map::new();
        data.insert(SENDER_ID.into(), Value::String(sender.to_string()));
        if let Some(frame_id) = frame_id {
            data.insert("frame_id".into(), frame_id.clone());
        }
        Self {
            event: events::SCREEN_CHUNK_ACK,
            data,
        }
    }
}

/// Serialize an outbound message into a text frame.
pub fn encode<T: Serialize>(message: &T) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode outbound frame");
            None
        }
    }
}
