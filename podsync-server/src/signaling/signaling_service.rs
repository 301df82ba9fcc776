use crate::error::SessionError;
use crate::room::RoomStore;
use crate::session::SessionCoordinator;
use crate::signaling::{EventSink, SignalingRelay};
use crate::transport::ConnectionRegistry;
use podsync_core::{ClientCommand, ConnectionId, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

struct SignalingInner {
    registry: ConnectionRegistry,
    coordinator: SessionCoordinator,
    relay: SignalingRelay,
}

/// Entry point for the transport: owns the connection registry and routes
/// decoded commands to the session coordinator or the signaling relay.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(store: RoomStore, strict_signaling: bool) -> Self {
        let registry = ConnectionRegistry::new();
        let sink: Arc<dyn EventSink> = Arc::new(registry.clone());

        Self {
            inner: Arc::new(SignalingInner {
                coordinator: SessionCoordinator::new(store.clone(), sink.clone()),
                relay: SignalingRelay::new(store, sink, strict_signaling),
                registry,
            }),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn store(&self) -> &RoomStore {
        self.inner.coordinator.store()
    }

    /// Registers a new connection and greets it with its id.
    pub fn add_connection(&self, tx: mpsc::UnboundedSender<ServerEvent>) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.inner.registry.register(connection_id, tx);
        self.inner
            .registry
            .unicast(&connection_id, ServerEvent::Welcome { connection_id });
        connection_id
    }

    /// Runs the disconnect path once per dropped connection.
    pub fn remove_connection(&self, connection_id: ConnectionId) {
        let left = self.inner.coordinator.disconnect(connection_id);
        self.inner.registry.unregister(&connection_id);
        info!("Connection {} closed, left {} room(s)", connection_id, left);
    }

    /// Decodes one text frame and dispatches it.
    pub fn handle_text(&self, connection_id: ConnectionId, text: &str) {
        match decode_command(text) {
            Ok(command) => self.handle_command(connection_id, command),
            Err(e) => {
                warn!("Rejected frame from {}: {}", connection_id, e);
                self.send_error(connection_id, &e);
            }
        }
    }

    pub fn handle_command(&self, connection_id: ConnectionId, command: ClientCommand) {
        let name = command.name();
        let coordinator = &self.inner.coordinator;
        let relay = &self.inner.relay;

        let result = match command {
            ClientCommand::JoinRoom {
                room_id,
                participant_name,
                is_host,
            } => coordinator.join(connection_id, &room_id, &participant_name, is_host),
            ClientCommand::LeaveRoom { room_id } => {
                coordinator.leave(connection_id, &room_id);
                Ok(())
            }
            ClientCommand::GetParticipants { room_id } => {
                coordinator.list_participants(connection_id, &room_id)
            }
            ClientCommand::ToggleMedia {
                room_id,
                media_type,
                enabled,
            } => coordinator.toggle_media(connection_id, &room_id, media_type, enabled),
            ClientCommand::Offer {
                room_id,
                target_id,
                offer,
                ..
            } => relay.offer(connection_id, &room_id, target_id, offer),
            ClientCommand::Answer {
                room_id,
                target_id,
                answer,
                ..
            } => relay.answer(connection_id, &room_id, target_id, answer),
            ClientCommand::IceCandidate {
                room_id,
                target_id,
                candidate,
                ..
            } => {
                relay.ice_candidate(connection_id, &room_id, target_id, candidate);
                Ok(())
            }
            ClientCommand::RequestConnection { room_id, target_id } => {
                relay.request_connection(connection_id, &room_id, target_id)
            }
        };

        if let Err(e) = result {
            warn!("{} from {} failed: {}", name, connection_id, e);
            self.send_error(connection_id, &e);
        }
    }

    fn send_error(&self, connection_id: ConnectionId, error: &SessionError) {
        self.inner
            .registry
            .unicast(&connection_id, ServerEvent::error(error.to_string()));
    }
}

/// Parses a JSON text frame into a command, rejecting anything the core
/// should never see.
pub fn decode_command(text: &str) -> Result<ClientCommand, SessionError> {
    let command: ClientCommand = serde_json::from_str(text)
        .map_err(|e| SessionError::MalformedCommand(e.to_string()))?;

    if command.room_id().is_blank() {
        return Err(SessionError::MalformedCommand(
            "roomId must not be empty".to_owned(),
        ));
    }

    if let ClientCommand::JoinRoom {
        participant_name, ..
    } = &command
    {
        if participant_name.trim().is_empty() {
            return Err(SessionError::MalformedCommand(
                "participantName must not be empty".to_owned(),
            ));
        }
    }

    Ok(command)
}
