use podsync_core::{ConnectionId, RoomId};

use crate::integration::{create_test_session, init_tracing};

#[test]
fn test_disconnect_twice_is_a_no_op_the_second_time() {
    init_tracing();
    let session = create_test_session(false);
    let room = RoomId::from("room1");
    let alice = ConnectionId::new();
    let bob = ConnectionId::new();
    session.coordinator.join(alice, &room, "Alice", false).unwrap();
    session.coordinator.join(bob, &room, "Bob", false).unwrap();
    session.sink.clear();

    assert_eq!(session.coordinator.disconnect(alice), 1);
    assert_eq!(session.coordinator.disconnect(alice), 0);

    assert_eq!(session.sink.count("participant-left"), 1);
    assert_eq!(session.sink.count("host-changed"), 1);
    assert_eq!(session.store.get(&room).unwrap().host_id(), Some(bob));
}

#[test]
fn test_disconnect_leaves_every_room() {
    init_tracing();
    let session = create_test_session(false);
    let alice = ConnectionId::new();
    let bob = ConnectionId::new();
    let first = RoomId::from("first");
    let second = RoomId::from("second");
    session.coordinator.join(alice, &first, "Alice", false).unwrap();
    session.coordinator.join(bob, &first, "Bob", false).unwrap();
    session.coordinator.join(alice, &second, "Alice", false).unwrap();

    assert_eq!(session.coordinator.disconnect(alice), 2);

    assert!(session.store.get(&second).is_none());
    assert!(!session.store.get(&first).unwrap().contains(&alice));
    assert!(session.store.rooms_with_member(&alice).is_empty());
}

#[test]
fn test_disconnect_without_membership() {
    init_tracing();
    let session = create_test_session(false);

    assert_eq!(session.coordinator.disconnect(ConnectionId::new()), 0);
    assert!(session.sink.deliveries().is_empty());
}
