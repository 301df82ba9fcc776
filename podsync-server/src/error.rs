use crate::room::ROOM_CAPACITY;
use thiserror::Error;

/// Failures of a session or signaling command. The `Display` text is sent
/// verbatim to the originating connection as `error{message}`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Room is full (max {max} participants)", max = ROOM_CAPACITY)]
    RoomFull,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Participant not found")]
    ParticipantNotFound,

    #[error("Malformed command: {0}")]
    MalformedCommand(String),
}
