pub mod errors;
pub mod id;

pub use errors::{ConfigError, MythosError, ProtocolError};
pub use id::{new_id, ConnectionId};

pub type Result<T> = std::result::Result<T, MythosError>;
