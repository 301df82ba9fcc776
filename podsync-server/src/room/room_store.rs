use crate::room::{Departure, Room};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::{Ref, RefMut};
use podsync_core::{ConnectionId, RoomId};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// Point-in-time view of a room, used by sweeps that must not hold locks.
#[derive(Debug, Clone)]
pub struct RoomSummary {
    pub id: RoomId,
    pub participant_count: usize,
    pub created_at: Instant,
}

/// In-memory table of rooms. Each room is mutated under its map shard's
/// write lock, so a `RefMut` is the transaction boundary for one command.
///
/// Do not call back into the store while holding a `Ref`/`RefMut` from it.
#[derive(Clone, Default)]
pub struct RoomStore {
    rooms: Arc<DashMap<RoomId, Room>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, room_id: &RoomId) -> RefMut<'_, RoomId, Room> {
        self.rooms.entry(room_id.clone()).or_insert_with(|| {
            info!("Creating new room: {}", room_id);
            Room::new(room_id.clone())
        })
    }

    pub fn get(&self, room_id: &RoomId) -> Option<Ref<'_, RoomId, Room>> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&self, room_id: &RoomId) -> Option<RefMut<'_, RoomId, Room>> {
        self.rooms.get_mut(room_id)
    }

    pub fn delete(&self, room_id: &RoomId) -> Option<Room> {
        self.rooms.remove(room_id).map(|(_, room)| room)
    }

    /// Removes `id` from the room and, if that empties it, deletes the room
    /// before the lock is released. `on_departure` runs under the same lock.
    ///
    /// Returns `None` when the room or the membership does not exist,
    /// otherwise the departure and whether the room was deleted.
    pub fn remove_participant<F>(
        &self,
        room_id: &RoomId,
        id: &ConnectionId,
        on_departure: F,
    ) -> Option<(Departure, bool)>
    where
        F: FnOnce(&Departure),
    {
        let Entry::Occupied(mut entry) = self.rooms.entry(room_id.clone()) else {
            return None;
        };
        let departure = entry.get_mut().remove(id)?;
        on_departure(&departure);

        let deleted = entry.get().is_empty();
        if deleted {
            entry.remove();
            info!("Deleted empty room: {}", room_id);
        }
        Some((departure, deleted))
    }

    /// Deletes the room only if it is still empty and older than `retention`.
    pub fn delete_if_idle(&self, room_id: &RoomId, now: Instant, retention: Duration) -> bool {
        self.rooms
            .remove_if(room_id, |_, room| {
                room.is_empty() && now.saturating_duration_since(room.created_at()) > retention
            })
            .is_some()
    }

    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.rooms
            .iter()
            .map(|entry| RoomSummary {
                id: entry.key().clone(),
                participant_count: entry.value().len(),
                created_at: entry.value().created_at(),
            })
            .collect()
    }

    pub fn rooms_with_member(&self, id: &ConnectionId) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|entry| entry.value().contains(id))
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
