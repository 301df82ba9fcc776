use crate::error::SessionError;
use crate::room::RoomStore;
use crate::signaling::EventSink;
use podsync_core::{ConnectionId, RoomId, ServerEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Forwards WebRTC negotiation messages between two peers of a room.
///
/// The relay never touches participant state. Relayed events are always
/// stamped with the originating connection id as `senderId`.
#[derive(Clone)]
pub struct SignalingRelay {
    store: RoomStore,
    sink: Arc<dyn EventSink>,
    strict: bool,
}

impl SignalingRelay {
    /// With `strict` set, offer/answer/ice-candidate also require both peers
    /// to be members of the room; otherwise only the room must exist.
    pub fn new(store: RoomStore, sink: Arc<dyn EventSink>, strict: bool) -> Self {
        Self {
            store,
            sink,
            strict,
        }
    }

    pub fn offer(
        &self,
        sender_id: ConnectionId,
        room_id: &RoomId,
        target_id: ConnectionId,
        offer: Value,
    ) -> Result<(), SessionError> {
        debug!("Offer from {} to {} in room {}", sender_id, target_id, room_id);
        self.check_route(room_id, &sender_id, &target_id, self.strict)?;

        self.sink.unicast(
            &target_id,
            ServerEvent::Offer {
                sender_id,
                offer,
                room_id: room_id.clone(),
            },
        );
        Ok(())
    }

    pub fn answer(
        &self,
        sender_id: ConnectionId,
        room_id: &RoomId,
        target_id: ConnectionId,
        answer: Value,
    ) -> Result<(), SessionError> {
        debug!("Answer from {} to {} in room {}", sender_id, target_id, room_id);
        self.check_route(room_id, &sender_id, &target_id, self.strict)?;

        self.sink.unicast(
            &target_id,
            ServerEvent::Answer {
                sender_id,
                answer,
                room_id: room_id.clone(),
            },
        );
        Ok(())
    }

    /// Candidates that cannot be routed are dropped without telling the sender.
    pub fn ice_candidate(
        &self,
        sender_id: ConnectionId,
        room_id: &RoomId,
        target_id: ConnectionId,
        candidate: Value,
    ) {
        if let Err(e) = self.check_route(room_id, &sender_id, &target_id, self.strict) {
            debug!(
                "Dropping ICE candidate from {} to {}: {}",
                sender_id, target_id, e
            );
            return;
        }

        self.sink.unicast(
            &target_id,
            ServerEvent::IceCandidate {
                sender_id,
                candidate,
                room_id: room_id.clone(),
            },
        );
    }

    pub fn request_connection(
        &self,
        sender_id: ConnectionId,
        room_id: &RoomId,
        target_id: ConnectionId,
    ) -> Result<(), SessionError> {
        debug!(
            "Connection request from {} to {} in room {}",
            sender_id, target_id, room_id
        );
        self.check_route(room_id, &sender_id, &target_id, true)?;

        self.sink.unicast(
            &target_id,
            ServerEvent::ConnectionRequest {
                sender_id,
                room_id: room_id.clone(),
            },
        );
        Ok(())
    }

    fn check_route(
        &self,
        room_id: &RoomId,
        sender_id: &ConnectionId,
        target_id: &ConnectionId,
        require_membership: bool,
    ) -> Result<(), SessionError> {
        let room = self.store.get(room_id).ok_or(SessionError::RoomNotFound)?;
        if require_membership && !(room.contains(sender_id) && room.contains(target_id)) {
            return Err(SessionError::ParticipantNotFound);
        }
        Ok(())
    }
}
