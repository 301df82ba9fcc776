mod command;
mod connection;
mod event;
mod participant;
mod room;

pub use command::ClientCommand;
pub use connection::ConnectionId;
pub use event::ServerEvent;
pub use participant::{MediaType, ParticipantView};
pub use room::RoomId;
