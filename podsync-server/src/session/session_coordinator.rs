use crate::error::SessionError;
use crate::room::RoomStore;
use crate::signaling::EventSink;
use podsync_core::{ConnectionId, MediaType, RoomId, ServerEvent};
use std::sync::Arc;
use tracing::{debug, info};

/// Join/leave/list/media-toggle semantics over the room store.
///
/// Every state change and the events it causes happen under the room's
/// lock, so members observe a room's events in commit order.
#[derive(Clone)]
pub struct SessionCoordinator {
    store: RoomStore,
    sink: Arc<dyn EventSink>,
}

impl SessionCoordinator {
    pub fn new(store: RoomStore, sink: Arc<dyn EventSink>) -> Self {
        Self { store, sink }
    }

    pub fn store(&self) -> &RoomStore {
        &self.store
    }

    pub fn join(
        &self,
        connection_id: ConnectionId,
        room_id: &RoomId,
        display_name: &str,
        requested_host: bool,
    ) -> Result<(), SessionError> {
        info!("{} ({}) joining room {}", display_name, connection_id, room_id);

        let mut room = self.store.get_or_create(room_id);
        let admission = room.admit(connection_id, display_name, requested_host)?;

        self.sink.join_group(&connection_id, room_id);
        self.sink.unicast(
            &connection_id,
            ServerEvent::JoinedRoom {
                room_id: room_id.clone(),
                participants: room.views(),
                is_host: admission.participant.is_host,
            },
        );

        if admission.already_member {
            debug!("{} re-sent join for room {}", connection_id, room_id);
            return Ok(());
        }

        self.sink.broadcast_to_room(
            room_id,
            Some(&connection_id),
            ServerEvent::ParticipantJoined {
                participant: admission.participant,
            },
        );

        if admission.displaced_host.is_some() {
            self.sink.broadcast_to_room(
                room_id,
                Some(&connection_id),
                ServerEvent::HostChanged {
                    new_host_id: connection_id,
                },
            );
            info!("Host of room {} claimed by {}", room_id, connection_id);
        }

        info!(
            "{} joined room {}. Total participants: {}",
            display_name,
            room_id,
            room.len()
        );
        Ok(())
    }

    /// Removes the connection from the room. Returns `false` when the room
    /// or the membership did not exist. An emptied room is deleted before
    /// its lock is released.
    pub fn leave(&self, connection_id: ConnectionId, room_id: &RoomId) -> bool {
        let removed = self
            .store
            .remove_participant(room_id, &connection_id, |departure| {
                info!(
                    "{} leaving room {} after {:?}",
                    departure.participant.display_name,
                    room_id,
                    departure.participant.joined_at.elapsed()
                );

                self.sink.leave_group(&connection_id, room_id);
                self.sink.broadcast_to_room(
                    room_id,
                    Some(&connection_id),
                    ServerEvent::ParticipantLeft {
                        participant_id: connection_id,
                    },
                );

                if let Some(new_host_id) = departure.new_host {
                    self.sink.broadcast_to_room(
                        room_id,
                        Some(&connection_id),
                        ServerEvent::HostChanged { new_host_id },
                    );
                    info!("Host of room {} transferred to {}", room_id, new_host_id);
                }
            });
        if removed.is_none() {
            return false;
        }

        self.sink.unicast(
            &connection_id,
            ServerEvent::LeftRoom {
                room_id: room_id.clone(),
            },
        );
        true
    }

    pub fn list_participants(
        &self,
        connection_id: ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), SessionError> {
        let room = self.store.get(room_id).ok_or(SessionError::RoomNotFound)?;

        self.sink.unicast(
            &connection_id,
            ServerEvent::ParticipantsList {
                room_id: room_id.clone(),
                participants: room.views(),
            },
        );
        Ok(())
    }

    pub fn toggle_media(
        &self,
        connection_id: ConnectionId,
        room_id: &RoomId,
        media_type: MediaType,
        enabled: bool,
    ) -> Result<(), SessionError> {
        let mut room = self
            .store
            .get_mut(room_id)
            .ok_or(SessionError::RoomNotFound)?;
        room.set_media(&connection_id, media_type, enabled)?;

        self.sink.broadcast_to_room(
            room_id,
            Some(&connection_id),
            ServerEvent::ParticipantMediaChanged {
                participant_id: connection_id,
                media_type,
                enabled,
            },
        );

        info!(
            "{} {} {} in room {}",
            connection_id,
            if enabled { "enabled" } else { "disabled" },
            media_type,
            room_id
        );
        Ok(())
    }

    /// Leaves every room the connection belongs to. Safe to call more than
    /// once; returns the number of rooms left.
    pub fn disconnect(&self, connection_id: ConnectionId) -> usize {
        let rooms = self.store.rooms_with_member(&connection_id);
        let mut left = 0;

        for room_id in rooms {
            if self.leave(connection_id, &room_id) {
                left += 1;
            } else {
                debug!(
                    "{} was no longer in room {} during disconnect",
                    connection_id, room_id
                );
            }
        }
        left
    }
}
