use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::{ConnectionId, LobbyId, PlayerId, ServerMessage};

/// Per-connection context. The participant identity is fixed at registration;
/// only the lobby membership changes over the connection's lifetime.
#[derive(Debug, Clone)]
pub(crate) struct ClientConnection {
    pub player_id: PlayerId,
    pub lobby_id: Option<LobbyId>,
    pub sender: mpsc::Sender<Arc<ServerMessage>>,
}

/// Process-wide registry of live connections.
///
/// Keyed by connection id, with a secondary player-id index so host actions
/// (kick, ban) can reach their target's socket. Reads are safe against
/// concurrent inserts and removals.
pub(crate) struct ConnectionManager {
    clients: DashMap<ConnectionId, ClientConnection>,
    players: DashMap<PlayerId, ConnectionId>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
            players: DashMap::new(),
        }
    }

    pub fn register(&self, sender: mpsc::Sender<Arc<ServerMessage>>) -> (ConnectionId, PlayerId) {
        let connection_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();
        self.clients.insert(
            connection_id,
            ClientConnection {
                player_id,
                lobby_id: None,
                sender,
            },
        );
        self.players.insert(player_id, connection_id);
        (connection_id, player_id)
    }

    pub fn remove(&self, connection_id: ConnectionId) -> Option<ClientConnection> {
        let (_, connection) = self.clients.remove(&connection_id)?;
        self.players.remove(&connection.player_id);
        Some(connection)
    }

    pub fn get(&self, connection_id: ConnectionId) -> Option<ClientConnection> {
        self.clients.get(&connection_id).map(|c| c.clone())
    }

    pub fn player_of(&self, connection_id: ConnectionId) -> Option<PlayerId> {
        self.clients.get(&connection_id).map(|c| c.player_id)
    }

    pub fn lobby_of(&self, connection_id: ConnectionId) -> Option<LobbyId> {
        self.clients.get(&connection_id).and_then(|c| c.lobby_id)
    }

    pub fn connection_for_player(&self, player_id: PlayerId) -> Option<ConnectionId> {
        self.players.get(&player_id).map(|entry| *entry.value())
    }

    pub fn assign_lobby(&self, connection_id: ConnectionId, lobby_id: LobbyId) {
        if let Some(mut connection) = self.clients.get_mut(&connection_id) {
            connection.lobby_id = Some(lobby_id);
        }
    }

    pub fn clear_lobby(&self, connection_id: ConnectionId) {
        if let Some(mut connection) = self.clients.get_mut(&connection_id) {
            connection.lobby_id = None;
        }
    }

    pub fn sender_of(&self, connection_id: ConnectionId) -> Option<mpsc::Sender<Arc<ServerMessage>>> {
        self.clients.get(&connection_id).map(|c| c.sender.clone())
    }

    /// Snapshot the members of one lobby for a broadcast.
    pub fn lobby_senders(
        &self,
        lobby_id: LobbyId,
    ) -> Vec<(ConnectionId, mpsc::Sender<Arc<ServerMessage>>)> {
        self.clients
            .iter()
            .filter(|entry| entry.lobby_id == Some(lobby_id))
            .map(|entry| (*entry.key(), entry.sender.clone()))
            .collect()
    }

    /// Snapshot every live connection (lobby-list fanout).
    pub fn all_senders(&self) -> Vec<(ConnectionId, mpsc::Sender<Arc<ServerMessage>>)> {
        self.clients
            .iter()
            .map(|entry| (*entry.key(), entry.sender.clone()))
            .collect()
    }
}
