use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::protocol::{ConnectionId, LobbyId, PlayerId, ServerMessage};

mod admin;
mod connection_manager;
mod game_service;
mod lobby_registry;
mod lobby_service;
mod message_router;
mod messaging;
mod phase_scheduler;

#[cfg(test)]
mod lobby_service_tests;

use connection_manager::ConnectionManager;
use lobby_registry::LobbyRegistry;

/// Runtime server configuration, derived from the loaded config file.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub default_max_players: u8,
    pub default_min_players: u8,
    /// Bounded per-connection outbound queue depth, in frames.
    pub outbound_queue_capacity: usize,
    /// Maximum accepted inbound frame size (bytes).
    pub max_message_size: usize,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let cfg = crate::config::Config::default();
        Self::from_config(&cfg)
    }
}

impl ServerConfig {
    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self {
            default_max_players: cfg.server.default_max_players,
            default_min_players: cfg.server.default_min_players,
            outbound_queue_capacity: cfg.server.outbound_queue_capacity,
            max_message_size: cfg.server.max_message_size,
            game: cfg.game.clone(),
        }
    }
}

/// The game server: connection registry, lobby registry, per-lobby phase
/// tickers, and the services that mutate lobbies under their serialisation
/// point (the per-lobby mutex).
pub struct GameServer {
    pub(crate) connection_manager: ConnectionManager,
    pub(crate) lobby_registry: LobbyRegistry,
    config: ServerConfig,
    /// One 1 Hz ticker task per lobby with an armed deadline.
    pub(crate) phase_tickers: DashMap<LobbyId, JoinHandle<()>>,
    /// Connections whose outbound queue failed; a background reaper runs the
    /// disconnect path for them so broadcasts never block the core.
    dead_connection_tx: mpsc::UnboundedSender<ConnectionId>,
    /// Back-reference for spawning ticker tasks from `&self` methods.
    pub(crate) self_ref: Weak<Self>,
}

impl GameServer {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let (dead_connection_tx, dead_connection_rx) = mpsc::unbounded_channel();
        let server = Arc::new_cyclic(|self_ref| Self {
            connection_manager: ConnectionManager::new(),
            lobby_registry: LobbyRegistry::new(),
            config,
            phase_tickers: DashMap::new(),
            dead_connection_tx,
            self_ref: self_ref.clone(),
        });
        tokio::spawn(Self::reap_dead_connections(
            Arc::downgrade(&server),
            dead_connection_rx,
        ));
        server
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Register a new client connection and hand out its identity. The
    /// `(connection, participant)` pair is immutable for the connection's
    /// lifetime.
    pub fn register_connection(
        &self,
        sender: mpsc::Sender<Arc<ServerMessage>>,
    ) -> (ConnectionId, PlayerId) {
        let (connection_id, player_id) = self.connection_manager.register(sender);
        tracing::info!(%connection_id, %player_id, "Client connected");
        (connection_id, player_id)
    }

    /// Tear down a connection: leave its lobby (with host handoff), then drop
    /// it from the registry. Safe to call more than once.
    pub async fn unregister_connection(&self, connection_id: ConnectionId) {
        if let Some(connection) = self.connection_manager.get(connection_id) {
            let player_id = connection.player_id;
            if let Some(lobby_id) = connection.lobby_id {
                self.remove_from_lobby(
                    connection_id,
                    player_id,
                    lobby_id,
                    crate::protocol::HostChangeReason::HostDisconnected,
                )
                .await;
            }
        }
        if self.connection_manager.remove(connection_id).is_some() {
            tracing::info!(%connection_id, "Client disconnected");
        }
    }

    /// Queue a connection for the disconnect path without blocking.
    pub(crate) fn report_dead_connection(&self, connection_id: ConnectionId) {
        let _ = self.dead_connection_tx.send(connection_id);
    }

    async fn reap_dead_connections(
        server: Weak<Self>,
        mut rx: mpsc::UnboundedReceiver<ConnectionId>,
    ) {
        while let Some(connection_id) = rx.recv().await {
            let Some(server) = server.upgrade() else {
                break;
            };
            tracing::warn!(%connection_id, "Dropping connection after send failure");
            server.unregister_connection(connection_id).await;
        }
    }

    /// Test support: register a connection with a caller-owned receiver, as
    /// if a socket had attached.
    pub fn connect_test_client(
        &self,
        sender: mpsc::Sender<Arc<ServerMessage>>,
    ) -> (ConnectionId, PlayerId) {
        self.register_connection(sender)
    }

    /// Direct handle to a lobby's serialisation point (used by integration
    /// tests that drive phase timers with fabricated instants).
    pub fn lobby_handle(
        &self,
        lobby_id: &LobbyId,
    ) -> Option<Arc<tokio::sync::Mutex<crate::lobby::Lobby>>> {
        self.lobby_registry.get(lobby_id)
    }

    /// Number of live lobbies.
    pub fn lobby_count(&self) -> usize {
        self.lobby_registry.len()
    }

    /// Identity allocation for lobbies and drawings shares the UUID space
    /// with connections and players.
    pub(crate) fn allocate_lobby_id(&self) -> LobbyId {
        Uuid::new_v4()
    }
}
