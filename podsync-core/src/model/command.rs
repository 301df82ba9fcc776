use crate::model::connection::ConnectionId;
use crate::model::participant::MediaType;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commands a client sends over its connection. The originating
/// connection id is supplied by the transport, never by the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientCommand {
    JoinRoom {
        room_id: RoomId,
        participant_name: String,
        #[serde(default)]
        is_host: bool,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    GetParticipants {
        room_id: RoomId,
    },
    ToggleMedia {
        room_id: RoomId,
        media_type: MediaType,
        enabled: bool,
    },
    Offer {
        room_id: RoomId,
        target_id: ConnectionId,
        /// Accepted for compatibility; relayed events carry the sending
        /// connection's id instead.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<ConnectionId>,
        offer: Value,
    },
    Answer {
        room_id: RoomId,
        target_id: ConnectionId,
        /// Accepted for compatibility; relayed events carry the sending
        /// connection's id instead.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<ConnectionId>,
        answer: Value,
    },
    IceCandidate {
        room_id: RoomId,
        target_id: ConnectionId,
        /// Accepted for compatibility; relayed events carry the sending
        /// connection's id instead.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<ConnectionId>,
        candidate: Value,
    },
    RequestConnection {
        room_id: RoomId,
        target_id: ConnectionId,
    },
}

impl ClientCommand {
    pub fn room_id(&self) -> &RoomId {
        match self {
            ClientCommand::JoinRoom { room_id, .. }
            | ClientCommand::LeaveRoom { room_id }
            | ClientCommand::GetParticipants { room_id }
            | ClientCommand::ToggleMedia { room_id, .. }
            | ClientCommand::Offer { room_id, .. }
            | ClientCommand::Answer { room_id, .. }
            | ClientCommand::IceCandidate { room_id, .. }
            | ClientCommand::RequestConnection { room_id, .. } => room_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::JoinRoom { .. } => "join-room",
            ClientCommand::LeaveRoom { .. } => "leave-room",
            ClientCommand::GetParticipants { .. } => "get-participants",
            ClientCommand::ToggleMedia { .. } => "toggle-media",
            ClientCommand::Offer { .. } => "offer",
            ClientCommand::Answer { .. } => "answer",
            ClientCommand::IceCandidate { .. } => "ice-candidate",
            ClientCommand::RequestConnection { .. } => "request-connection",
        }
    }
}
