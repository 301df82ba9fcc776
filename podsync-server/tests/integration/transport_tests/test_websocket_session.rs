use axum::http::HeaderValue;
use futures::{SinkExt, StreamExt};
use podsync_core::{ConnectionId, ServerEvent};
use podsync_server::{RoomStore, SignalingService, router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::integration::init_tracing;
use crate::utils::{join_frame, offer_frame};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = SignalingService::new(RoomStore::new(), false);
    let app = router(service, HeaderValue::from_static("http://localhost:3000"));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn next_event(client: &mut Client) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("invalid event json");
        }
    }
}

async fn connect(addr: SocketAddr) -> (Client, ConnectionId) {
    let (mut client, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    match next_event(&mut client).await {
        ServerEvent::Welcome { connection_id } => (client, connection_id),
        other => panic!("expected welcome, got {other:?}"),
    }
}

async fn send(client: &mut Client, frame: serde_json::Value) {
    client
        .send(Message::Text(frame.to_string().into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_websocket_call_lifecycle() {
    init_tracing();
    let addr = start_server().await;

    let (mut alice, alice_id) = connect(addr).await;
    send(&mut alice, join_frame("room1", "Alice", false)).await;
    assert!(matches!(
        next_event(&mut alice).await,
        ServerEvent::JoinedRoom { is_host: true, .. }
    ));

    let (mut bob, bob_id) = connect(addr).await;
    send(&mut bob, join_frame("room1", "Bob", false)).await;
    assert!(matches!(
        next_event(&mut bob).await,
        ServerEvent::JoinedRoom { is_host: false, .. }
    ));
    assert!(matches!(
        next_event(&mut alice).await,
        ServerEvent::ParticipantJoined { participant } if participant.id == bob_id
    ));

    send(&mut bob, offer_frame("room1", &alice_id, &bob_id)).await;
    assert!(matches!(
        next_event(&mut alice).await,
        ServerEvent::Offer { sender_id, .. } if sender_id == bob_id
    ));

    // Dropping the host's socket transfers the host role.
    alice.close(None).await.unwrap();
    assert_eq!(
        next_event(&mut bob).await,
        ServerEvent::ParticipantLeft {
            participant_id: alice_id
        }
    );
    assert_eq!(
        next_event(&mut bob).await,
        ServerEvent::HostChanged { new_host_id: bob_id }
    );
}

#[tokio::test]
async fn test_malformed_frame_over_websocket() {
    init_tracing();
    let addr = start_server().await;
    let (mut client, _) = connect(addr).await;

    client
        .send(Message::Text("{\"event\":\"offer\"}".into()))
        .await
        .unwrap();

    let ServerEvent::Error { message } = next_event(&mut client).await else {
        panic!("expected error event");
    };
    assert!(message.starts_with("Malformed command"));
}

#[tokio::test]
async fn test_health_endpoint() {
    init_tracing();
    let addr = start_server().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("PodSync Server Running"));
}
