//! mythos-signal: WebSocket signaling relay for one host and its participants.
//!
//! Brokers WebRTC negotiation (offer, answer, ICE candidates) and a chunked
//! screen-image fallback between connected endpoints. The relay routes
//! opaque JSON payloads; it never inspects media.

pub mod connection;
mod handlers;
pub mod hub;
mod lifecycle;
pub mod peer;
pub mod protocol;
pub mod relay;
pub mod room;
pub mod router;
pub mod server;

pub use hub::Hub;
pub use peer::{ConnectionTable, Peer};
pub use protocol::{InboundMessage, ServerMessage};
pub use relay::{Relay, RelaySettings};
pub use room::{Membership, Room};
pub use router::parse_frame;
pub use server::{router, serve, ServeOptions};
