use std::sync::Arc;
use std::time::Instant;

use crate::protocol::{ConnectionId, DrawingId, ErrorCode, LobbyId, PlayerId, ServerMessage};

use super::GameServer;

impl GameServer {
    /// Resolve the caller's participant id and lobby, or answer with the
    /// standard refusal.
    fn require_membership(&self, connection_id: ConnectionId) -> Option<(PlayerId, LobbyId)> {
        let connection = self.connection_manager.get(connection_id)?;
        match connection.lobby_id {
            Some(lobby_id) => Some((connection.player_id, lobby_id)),
            None => {
                self.send_error_message(
                    connection_id,
                    "You are not in a lobby".to_string(),
                    Some(ErrorCode::NotInLobby),
                );
                None
            }
        }
    }

    pub(crate) async fn handle_set_ready(
        &self,
        connection_id: ConnectionId,
        is_ready: bool,
    ) {
        let Some((player_id, lobby_id)) = self.require_membership(connection_id) else {
            return;
        };
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            return;
        };

        let auto_started = {
            let mut lobby = handle.lock().await;
            lobby.set_ready(player_id, is_ready);
            if lobby.settings.auto_start_when_ready && lobby.can_start_game() {
                lobby.begin_theme_voting(Instant::now());
                tracing::info!(%lobby_id, "Auto-starting game - all players ready");
                true
            } else {
                false
            }
        };

        if auto_started {
            self.ensure_phase_ticker(lobby_id);
        }
        self.broadcast_lobby_update(lobby_id).await;
        if auto_started {
            self.broadcast_lobby_list().await;
        }
    }

    pub(crate) async fn handle_start_game(&self, connection_id: ConnectionId) {
        let Some((player_id, lobby_id)) = self.require_membership(connection_id) else {
            return;
        };
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            return;
        };

        let started = {
            let mut lobby = handle.lock().await;
            lobby.start_game(player_id, Instant::now())
        };
        match started {
            Ok(()) => {
                tracing::info!(%lobby_id, host = %player_id, "Game started");
                self.ensure_phase_ticker(lobby_id);
                self.broadcast_lobby_update(lobby_id).await;
                self.broadcast_lobby_list().await;
            }
            Err(err) => self.send_error(connection_id, &err),
        }
    }

    pub(crate) async fn handle_vote_theme(
        &self,
        connection_id: ConnectionId,
        theme: String,
    ) {
        let Some((player_id, lobby_id)) = self.require_membership(connection_id) else {
            return;
        };
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            return;
        };

        let outcome = {
            let mut lobby = handle.lock().await;
            lobby.cast_theme_vote(player_id, &theme)
        };
        match outcome {
            Ok(()) => self.broadcast_lobby_update(lobby_id).await,
            Err(err) => self.send_error(connection_id, &err),
        }
    }

    pub(crate) async fn handle_submit_drawing(
        &self,
        connection_id: ConnectionId,
        drawing: String,
    ) {
        let Some((player_id, lobby_id)) = self.require_membership(connection_id) else {
            return;
        };
        if drawing.is_empty() {
            self.send_error_message(
                connection_id,
                "Drawing payload is required".to_string(),
                Some(ErrorCode::InvalidInput),
            );
            return;
        }
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            return;
        };

        let outcome = {
            let mut lobby = handle.lock().await;
            match lobby.submit_drawing(player_id, drawing) {
                Ok(all_submitted) => {
                    if all_submitted {
                        // Unanimous participation ends the drawing phase
                        // without waiting for the deadline.
                        lobby.begin_voting(Instant::now());
                    }
                    Ok(all_submitted)
                }
                Err(err) => Err(err),
            }
        };

        match outcome {
            Ok(all_submitted) => {
                self.send_to_connection(
                    connection_id,
                    Arc::new(ServerMessage::DrawingSubmitted { success: true }),
                );
                if all_submitted {
                    tracing::info!(%lobby_id, "All drawings in - voting begins early");
                    self.ensure_phase_ticker(lobby_id);
                }
                self.broadcast_lobby_update(lobby_id).await;
            }
            Err(err) => self.send_error(connection_id, &err),
        }
    }

    pub(crate) async fn handle_vote_drawing(
        &self,
        connection_id: ConnectionId,
        drawing_id: Option<DrawingId>,
        author_id: Option<PlayerId>,
    ) {
        let Some((player_id, lobby_id)) = self.require_membership(connection_id) else {
            return;
        };
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            return;
        };

        let outcome = {
            let mut lobby = handle.lock().await;
            lobby
                .resolve_vote_target(drawing_id, author_id)
                .and_then(|target| lobby.cast_drawing_vote(player_id, target))
        };
        match outcome {
            Ok(()) => {
                tracing::debug!(%player_id, %lobby_id, "Drawing vote recorded");
                self.broadcast_lobby_update(lobby_id).await;
            }
            Err(err) => self.send_error(connection_id, &err),
        }
    }
}
