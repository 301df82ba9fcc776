use crate::model::connection::ConnectionId;
use crate::model::participant::{MediaType, ParticipantView};
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events the server pushes to clients, either unicast or to a room group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    Welcome {
        connection_id: ConnectionId,
    },
    JoinedRoom {
        room_id: RoomId,
        participants: Vec<ParticipantView>,
        is_host: bool,
    },
    ParticipantJoined {
        participant: ParticipantView,
    },
    ParticipantLeft {
        participant_id: ConnectionId,
    },
    HostChanged {
        new_host_id: ConnectionId,
    },
    LeftRoom {
        room_id: RoomId,
    },
    ParticipantsList {
        room_id: RoomId,
        participants: Vec<ParticipantView>,
    },
    ParticipantMediaChanged {
        participant_id: ConnectionId,
        media_type: MediaType,
        enabled: bool,
    },
    Offer {
        sender_id: ConnectionId,
        offer: Value,
        room_id: RoomId,
    },
    Answer {
        sender_id: ConnectionId,
        answer: Value,
        room_id: RoomId,
    },
    IceCandidate {
        sender_id: ConnectionId,
        candidate: Value,
        room_id: RoomId,
    },
    ConnectionRequest {
        sender_id: ConnectionId,
        room_id: RoomId,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Welcome { .. } => "welcome",
            ServerEvent::JoinedRoom { .. } => "joined-room",
            ServerEvent::ParticipantJoined { .. } => "participant-joined",
            ServerEvent::ParticipantLeft { .. } => "participant-left",
            ServerEvent::HostChanged { .. } => "host-changed",
            ServerEvent::LeftRoom { .. } => "left-room",
            ServerEvent::ParticipantsList { .. } => "participants-list",
            ServerEvent::ParticipantMediaChanged { .. } => "participant-media-changed",
            ServerEvent::Offer { .. } => "offer",
            ServerEvent::Answer { .. } => "answer",
            ServerEvent::IceCandidate { .. } => "ice-candidate",
            ServerEvent::ConnectionRequest { .. } => "connection-request",
            ServerEvent::Error { .. } => "error",
        }
    }
}
