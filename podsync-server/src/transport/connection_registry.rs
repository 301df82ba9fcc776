use crate::signaling::EventSink;
use dashmap::DashMap;
use podsync_core::{ConnectionId, RoomId, ServerEvent};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Default)]
struct RegistryInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
    groups: DashMap<RoomId, HashSet<ConnectionId>>,
}

/// Maps live connection ids to their outbound queues and tracks which
/// connections belong to which room broadcast group. Knows nothing else
/// about rooms.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<ServerEvent>) {
        self.inner.connections.insert(connection_id, tx);
    }

    /// Drops the connection's queue and any group memberships it still holds.
    pub fn unregister(&self, connection_id: &ConnectionId) {
        self.inner.connections.remove(connection_id);
        self.inner.groups.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.inner.connections.contains_key(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn group_members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.inner
            .groups
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    fn deliver(&self, connection_id: &ConnectionId, event: ServerEvent) {
        let Some(tx) = self.inner.connections.get(connection_id) else {
            debug!(
                "Dropping {} for disconnected connection {}",
                event.name(),
                connection_id
            );
            return;
        };
        if tx.send(event).is_err() {
            warn!("Outbound queue closed for connection {}", connection_id);
        }
    }
}

impl EventSink for ConnectionRegistry {
    fn unicast(&self, connection_id: &ConnectionId, event: ServerEvent) {
        self.deliver(connection_id, event);
    }

    fn broadcast_to_room(&self, room_id: &RoomId, exclude: Option<&ConnectionId>, event: ServerEvent) {
        let recipients: Vec<ConnectionId> = match self.inner.groups.get(room_id) {
            Some(members) => members
                .iter()
                .filter(|id| Some(*id) != exclude)
                .copied()
                .collect(),
            None => return,
        };

        for id in recipients {
            self.deliver(&id, event.clone());
        }
    }

    fn join_group(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        self.inner
            .groups
            .entry(room_id.clone())
            .or_default()
            .insert(*connection_id);
    }

    fn leave_group(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        if let Some(mut members) = self.inner.groups.get_mut(room_id) {
            members.remove(connection_id);
        }
        self.inner
            .groups
            .remove_if(room_id, |_, members| members.is_empty());
    }
}
