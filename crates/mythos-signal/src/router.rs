//! Inbound frame parsing and dispatch.

use mythos_common::{ConnectionId, ProtocolError};
use serde::Deserialize;
use serde_json::Value;

use crate::protocol::InboundMessage;
use crate::relay::Relay;

#[derive(Debug, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Parse a text frame into a message.
///
/// `Ok(None)` means a well-formed frame with a tag the relay ignores.
pub fn parse_frame(text: &str) -> Result<Option<InboundMessage>, ProtocolError> {
    let raw: RawFrame =
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedFrame(e.to_string()))?;
    InboundMessage::from_parts(&raw.event, raw.data)
}

impl Relay {
    /// Handle one inbound text frame from `sender`. Never fails: bad
    /// frames are logged and dropped and the connection stays open.
    pub fn handle_frame(&mut self, sender: &ConnectionId, text: &str) {
        match parse_frame(text) {
            Ok(Some(message)) => self.dispatch(sender, message),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(conn = %sender, error = %e, frame = %text, "Invalid message");
            }
        }
    }

    pub fn dispatch(&mut self, sender: &ConnectionId, message: InboundMessage) {
        match message {
            InboundMessage::CreateRoom => self.create_room(sender),
            InboundMessage::JoinRoom => self.join_room(sender),
            InboundMessage::Relay { kind, payload } => self.relay_signal(sender, kind, &payload),
            InboundMessage::ScreenChunk(chunk) => self.relay_screen_chunk(sender, &chunk),
            InboundMessage::ScreenChunkAck(ack) => self.relay_screen_chunk_ack(sender, &ack),
        }
    }
}
