use crate::error::SessionError;
use podsync_core::{ConnectionId, MediaType, ParticipantView, RoomId};
use tokio::time::Instant;

/// Maximum number of participants a single room may hold.
pub const ROOM_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ConnectionId,
    pub display_name: String,
    pub is_host: bool,
    pub has_video: bool,
    pub has_audio: bool,
    pub joined_at: Instant,
}

impl Participant {
    fn new(id: ConnectionId, display_name: &str, is_host: bool) -> Self {
        Self {
            id,
            display_name: display_name.to_owned(),
            is_host,
            has_video: true,
            has_audio: true,
            joined_at: Instant::now(),
        }
    }

    pub fn view(&self) -> ParticipantView {
        ParticipantView {
            id: self.id,
            name: self.display_name.clone(),
            is_host: self.is_host,
            has_video: self.has_video,
            has_audio: self.has_audio,
        }
    }

    fn set_media(&mut self, media_type: MediaType, enabled: bool) {
        match media_type {
            MediaType::Video => self.has_video = enabled,
            MediaType::Audio => self.has_audio = enabled,
        }
    }
}

/// Result of admitting a connection into a room.
#[derive(Debug, Clone)]
pub struct Admission {
    pub participant: ParticipantView,
    /// Previous host demoted because the joiner asked for the host role.
    pub displaced_host: Option<ConnectionId>,
    /// The connection was already a member; nothing changed.
    pub already_member: bool,
}

/// Result of removing a participant from a room.
#[derive(Debug, Clone)]
pub struct Departure {
    pub participant: Participant,
    pub new_host: Option<ConnectionId>,
}

/// One call. Participants live in a fixed-capacity slot array: insertion
/// order is slot order, and host succession always promotes slot 0.
///
/// Invariant: a non-empty room has exactly one participant with
/// `is_host == true` and `host_id` names it; an empty room has no host.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    participants: heapless::Vec<Participant, ROOM_CAPACITY>,
    host_id: Option<ConnectionId>,
    created_at: Instant,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            participants: heapless::Vec::new(),
            host_id: None,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn host_id(&self) -> Option<ConnectionId> {
        self.host_id
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.participants.is_full()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.participants.iter().any(|p| &p.id == id)
    }

    pub fn participant(&self, id: &ConnectionId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn views(&self) -> Vec<ParticipantView> {
        self.participants.iter().map(Participant::view).collect()
    }

    /// Adds `id` to the room. The first participant of an empty room is
    /// always host; a later joiner that requests the host role takes it over.
    pub fn admit(
        &mut self,
        id: ConnectionId,
        display_name: &str,
        requested_host: bool,
    ) -> Result<Admission, SessionError> {
        if let Some(existing) = self.participant(&id) {
            return Ok(Admission {
                participant: existing.view(),
                displaced_host: None,
                already_member: true,
            });
        }

        if self.is_full() {
            return Err(SessionError::RoomFull);
        }

        let becomes_host = requested_host || self.is_empty();
        let participant = Participant::new(id, display_name, becomes_host);
        let view = participant.view();
        self.participants
            .push(participant)
            .map_err(|_| SessionError::RoomFull)?;

        let displaced_host = if becomes_host {
            for p in self.participants.iter_mut().filter(|p| p.id != id) {
                p.is_host = false;
            }
            self.host_id.replace(id)
        } else {
            None
        };

        Ok(Admission {
            participant: view,
            displaced_host,
            already_member: false,
        })
    }

    /// Removes `id`, promoting the participant in the lowest slot when the
    /// host leaves a room that still has members.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Departure> {
        let index = self.participants.iter().position(|p| &p.id == id)?;
        let participant = self.participants.remove(index);

        let mut new_host = None;
        if self.participants.is_empty() {
            self.host_id = None;
        } else if participant.is_host {
            if let Some(successor) = self.participants.first_mut() {
                successor.is_host = true;
                self.host_id = Some(successor.id);
                new_host = Some(successor.id);
            }
        }

        Some(Departure {
            participant,
            new_host,
        })
    }

    pub fn set_media(
        &mut self,
        id: &ConnectionId,
        media_type: MediaType,
        enabled: bool,
    ) -> Result<(), SessionError> {
        let participant = self
            .participants
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or(SessionError::ParticipantNotFound)?;
        participant.set_media(media_type, enabled);
        Ok(())
    }

    /// Diagnostic check, used by tests: true when the single-host
    /// invariant holds.
    pub fn host_is_consistent(&self) -> bool {
        let hosts: Vec<_> = self.participants.iter().filter(|p| p.is_host).collect();
        match (hosts.as_slice(), self.host_id) {
            ([], None) => self.participants.is_empty(),
            ([host], Some(host_id)) => host.id == host_id,
            _ => false,
        }
    }
}
