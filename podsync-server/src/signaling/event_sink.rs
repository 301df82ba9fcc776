use podsync_core::{ConnectionId, RoomId, ServerEvent};

/// Outbound side of the transport, as seen by the coordinator and relay.
///
/// Every method is fire-and-forget: it must not block, and a dead or
/// unknown connection is silently skipped. Implementations are called while
/// a room lock is held, so events for one room leave in commit order.
pub trait EventSink: Send + Sync {
    fn unicast(&self, connection_id: &ConnectionId, event: ServerEvent);

    /// Sends to every connection in the room's broadcast group except `exclude`.
    fn broadcast_to_room(&self, room_id: &RoomId, exclude: Option<&ConnectionId>, event: ServerEvent);

    fn join_group(&self, connection_id: &ConnectionId, room_id: &RoomId);

    fn leave_group(&self, connection_id: &ConnectionId, room_id: &RoomId);
}
