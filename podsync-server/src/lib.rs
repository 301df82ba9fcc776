//! Real-time session coordinator for small WebRTC calls.
//!
//! Tracks which connections belong to which room, elects and transfers the
//! host role, broadcasts membership and media-state changes, and relays
//! offer/answer/ICE messages between peers. Media never passes through here.

pub mod config;
mod error;
pub mod room;
pub mod session;
pub mod signaling;
pub mod transport;

pub use config::*;
pub use error::SessionError;
pub use room::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;
