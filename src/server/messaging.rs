use std::sync::Arc;
use std::time::Instant;

use crate::lobby::LobbyError;
use crate::protocol::{ConnectionId, ErrorCode, LobbyId, ServerMessage};

use super::GameServer;

impl GameServer {
    /// Enqueue one frame for one connection. Best-effort: a full or closed
    /// queue marks the connection dead and the reaper runs its disconnect
    /// path; the caller never blocks.
    pub(crate) fn send_to_connection(
        &self,
        connection_id: ConnectionId,
        message: Arc<ServerMessage>,
    ) {
        let Some(sender) = self.connection_manager.sender_of(connection_id) else {
            return;
        };
        if sender.try_send(message).is_err() {
            self.report_dead_connection(connection_id);
        }
    }

    pub(crate) fn send_error(&self, connection_id: ConnectionId, error: &LobbyError) {
        self.send_error_message(connection_id, error.to_string(), Some(error.code()));
    }

    pub(crate) fn send_error_message(
        &self,
        connection_id: ConnectionId,
        message: String,
        error_code: Option<ErrorCode>,
    ) {
        self.send_to_connection(
            connection_id,
            Arc::new(ServerMessage::Error {
                message,
                error_code,
            }),
        );
    }

    /// Fan one frame out to every member of a lobby. Per-recipient failures
    /// only affect that recipient.
    pub(crate) fn broadcast_to_lobby(&self, lobby_id: LobbyId, message: Arc<ServerMessage>) {
        for (connection_id, sender) in self.connection_manager.lobby_senders(lobby_id) {
            if sender.try_send(Arc::clone(&message)).is_err() {
                self.report_dead_connection(connection_id);
            }
        }
    }

    /// Snapshot the lobby at one point in its order and broadcast it. The
    /// lock is released before any frame is queued.
    pub(crate) async fn broadcast_lobby_update(&self, lobby_id: LobbyId) {
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            return;
        };
        let snapshot = {
            let lobby = handle.lock().await;
            lobby.snapshot(Instant::now())
        };
        self.broadcast_to_lobby(
            lobby_id,
            Arc::new(ServerMessage::LobbyUpdate(Box::new(snapshot))),
        );
    }

    /// Send the joinable-lobby listing to every connected client.
    pub(crate) async fn broadcast_lobby_list(&self) {
        let summaries = self.lobby_registry.joinable_summaries().await;
        let message = Arc::new(ServerMessage::LobbyList(summaries));
        for (connection_id, sender) in self.connection_manager.all_senders() {
            if sender.try_send(Arc::clone(&message)).is_err() {
                self.report_dead_connection(connection_id);
            }
        }
    }

    /// Send the joinable-lobby listing to one client.
    pub(crate) async fn send_lobby_list(&self, connection_id: ConnectionId) {
        let summaries = self.lobby_registry.joinable_summaries().await;
        self.send_to_connection(connection_id, Arc::new(ServerMessage::LobbyList(summaries)));
    }
}
