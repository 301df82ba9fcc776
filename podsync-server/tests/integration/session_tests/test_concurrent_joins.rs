use podsync_core::{ConnectionId, RoomId, ServerEvent};
use podsync_server::{ROOM_CAPACITY, SessionError};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::integration::{create_test_session, init_tracing};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_respect_capacity_and_single_host() {
    init_tracing();
    let session = create_test_session(false);
    let room = RoomId::from("busy");

    let mut tasks = Vec::new();
    for i in 0..(ROOM_CAPACITY * 3) {
        let coordinator = session.coordinator.clone();
        let room = room.clone();
        tasks.push(tokio::spawn(async move {
            coordinator.join(ConnectionId::new(), &room, &format!("p{i}"), i % 2 == 0)
        }));
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => admitted += 1,
            Err(SessionError::RoomFull) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, ROOM_CAPACITY);
    assert_eq!(rejected, ROOM_CAPACITY * 2);
    let stored = session.store.get(&room).unwrap();
    assert_eq!(stored.len(), ROOM_CAPACITY);
    assert!(stored.host_is_consistent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_churn_keeps_invariants() {
    init_tracing();
    let session = create_test_session(false);
    let room = RoomId::from("churn");

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let coordinator = session.coordinator.clone();
        let room = room.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..50 {
                let id = ConnectionId::new();
                if coordinator.join(id, &room, "p", false).is_ok() {
                    tokio::task::yield_now().await;
                    coordinator.leave(id, &room);
                }
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // Every participant left again, so the room must be gone.
    assert!(session.store.get(&room).is_none());
    assert_eq!(
        session.sink.count("participant-joined"),
        session.sink.count("participant-left")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_observer_sees_joins_in_slot_order() {
    init_tracing();
    let session = create_test_session(false);
    let room = RoomId::from("ordered");
    let observer = ConnectionId::new();
    session.coordinator.join(observer, &room, "Observer", false).unwrap();

    let mut tasks = Vec::new();
    for i in 0..(ROOM_CAPACITY - 1) {
        let coordinator = session.coordinator.clone();
        let room = room.clone();
        tasks.push(tokio::spawn(async move {
            coordinator.join(ConnectionId::new(), &room, &format!("p{i}"), false)
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let seen: Vec<ConnectionId> = session
        .sink
        .events_for(&observer)
        .into_iter()
        .filter_map(|event| match event {
            ServerEvent::ParticipantJoined { participant } => Some(participant.id),
            _ => None,
        })
        .collect();
    let slots: Vec<ConnectionId> = session
        .store
        .get(&room)
        .unwrap()
        .views()
        .into_iter()
        .skip(1)
        .map(|view| view.id)
        .collect();

    assert_eq!(seen.len(), ROOM_CAPACITY - 1);
    assert_eq!(seen, slots);
}

#[test]
fn test_emptied_room_is_never_observable() {
    init_tracing();
    let session = create_test_session(false);
    let room = RoomId::from("flicker");
    let reader = ConnectionId::new();
    let done = AtomicBool::new(false);

    let (empty_rooms, empty_lists) = std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..5_000 {
                let id = ConnectionId::new();
                session.coordinator.join(id, &room, "p", false).unwrap();
                session.coordinator.leave(id, &room);
            }
            done.store(true, Ordering::Release);
        });

        let mut empty_rooms = 0;
        let mut empty_lists = 0;
        while !done.load(Ordering::Acquire) {
            if session.store.get(&room).is_some_and(|stored| stored.is_empty()) {
                empty_rooms += 1;
            }

            if session.coordinator.list_participants(reader, &room).is_ok() {
                for event in session.sink.take_events_for(&reader) {
                    if let ServerEvent::ParticipantsList { participants, .. } = event {
                        if participants.is_empty() {
                            empty_lists += 1;
                        }
                    }
                }
            }
        }
        (empty_rooms, empty_lists)
    });

    assert_eq!(empty_rooms, 0);
    assert_eq!(empty_lists, 0);
    assert!(session.store.get(&room).is_none());
}
