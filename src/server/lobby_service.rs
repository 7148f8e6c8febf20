use std::sync::Arc;
use std::time::Instant;

use subtle::ConstantTimeEq;

use crate::lobby::{Lobby, LobbySettings, Player};
use crate::protocol::{
    ConnectionId, ErrorCode, GameStatus, HostChangeReason, LobbyId, PlayerId, ServerMessage,
    SettingsPatch,
};

use super::GameServer;

/// How a join request authenticates against a private lobby.
enum JoinAuth {
    Public,
    WithPassword(String),
}

impl GameServer {
    pub(crate) async fn handle_create_lobby(
        &self,
        connection_id: ConnectionId,
        player_name: String,
        patch: Option<SettingsPatch>,
    ) {
        let Some(player_id) = self.connection_manager.player_of(connection_id) else {
            return;
        };
        let player_name = player_name.trim().to_string();
        if player_name.is_empty() {
            self.send_error_message(
                connection_id,
                "Player name is required".to_string(),
                Some(ErrorCode::InvalidPlayerName),
            );
            return;
        }
        if self.connection_manager.lobby_of(connection_id).is_some() {
            self.send_error_message(
                connection_id,
                "You are already in a lobby".to_string(),
                Some(ErrorCode::AlreadyInLobby),
            );
            return;
        }

        let mut settings = LobbySettings {
            max_players: self.config().default_max_players,
            min_players: self.config().default_min_players,
            ..LobbySettings::default()
        };
        if let Some(patch) = &patch {
            // Explicit creator limits are hard errors rather than silently
            // skipped fields.
            if let Some(max) = patch.max_players {
                if !(2..=20).contains(&max) {
                    self.send_error_message(
                        connection_id,
                        "Max players must be between 2 and 20".to_string(),
                        Some(ErrorCode::InvalidSettings),
                    );
                    return;
                }
            }
            let effective_max = patch.max_players.unwrap_or(settings.max_players);
            if let Some(min) = patch.min_players {
                if min < 2 || min > effective_max {
                    self.send_error_message(
                        connection_id,
                        "Min players must be between 2 and max players".to_string(),
                        Some(ErrorCode::InvalidSettings),
                    );
                    return;
                }
            }
            if let Err(err) = settings.apply_patch(patch, 0) {
                self.send_error(connection_id, &err);
                return;
            }
        }

        let lobby_id = self.allocate_lobby_id();
        let mut lobby = Lobby::new(lobby_id, settings, self.config().game.clone());
        if let Err(err) = lobby.add_player(Player::new(player_id, player_name.clone())) {
            tracing::error!(%lobby_id, %player_id, error = %err, "Creator rejected by fresh lobby");
            self.send_error(connection_id, &err);
            return;
        }
        let snapshot = lobby.snapshot(Instant::now());
        self.lobby_registry.insert(lobby);
        self.connection_manager.assign_lobby(connection_id, lobby_id);

        tracing::info!(%lobby_id, %player_id, player_name = %player_name, "Lobby created");
        self.send_to_connection(
            connection_id,
            Arc::new(ServerMessage::LobbyJoined(Box::new(snapshot))),
        );
        self.broadcast_lobby_list().await;
    }

    pub(crate) async fn handle_join_lobby(
        &self,
        connection_id: ConnectionId,
        lobby_id: LobbyId,
        player_name: String,
    ) {
        self.join_lobby_inner(connection_id, lobby_id, player_name, JoinAuth::Public)
            .await;
    }

    pub(crate) async fn handle_join_lobby_with_password(
        &self,
        connection_id: ConnectionId,
        lobby_id: LobbyId,
        player_name: String,
        password: String,
    ) {
        self.join_lobby_inner(
            connection_id,
            lobby_id,
            player_name,
            JoinAuth::WithPassword(password),
        )
        .await;
    }

    async fn join_lobby_inner(
        &self,
        connection_id: ConnectionId,
        lobby_id: LobbyId,
        player_name: String,
        auth: JoinAuth,
    ) {
        let Some(player_id) = self.connection_manager.player_of(connection_id) else {
            return;
        };
        let player_name = player_name.trim().to_string();
        if player_name.is_empty() {
            self.send_error_message(
                connection_id,
                "Player name is required".to_string(),
                Some(ErrorCode::InvalidPlayerName),
            );
            return;
        }
        if self.connection_manager.lobby_of(connection_id).is_some() {
            self.send_error_message(
                connection_id,
                "You are already in a lobby".to_string(),
                Some(ErrorCode::AlreadyInLobby),
            );
            return;
        }
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            self.send_error_message(
                connection_id,
                "Lobby not found".to_string(),
                Some(ErrorCode::LobbyNotFound),
            );
            return;
        };

        let snapshot = {
            let mut lobby = handle.lock().await;
            // The lobby may have emptied and been dropped from the registry
            // between lookup and lock; joining a ghost would strand the
            // player in a lobby nobody can list.
            if self.lobby_registry.get(&lobby_id).is_none() {
                self.send_error_message(
                    connection_id,
                    "Lobby not found".to_string(),
                    Some(ErrorCode::LobbyNotFound),
                );
                return;
            }

            if lobby.settings.private_lobby {
                match &auth {
                    JoinAuth::Public => {
                        if lobby.settings.has_password() {
                            self.send_error_message(
                                connection_id,
                                "This lobby requires a password. Please use join with password option."
                                    .to_string(),
                                Some(ErrorCode::PasswordRequired),
                            );
                            return;
                        }
                    }
                    JoinAuth::WithPassword(supplied) => {
                        let Some(expected) = &lobby.settings.lobby_password else {
                            self.send_error_message(
                                connection_id,
                                "Lobby password not set properly".to_string(),
                                Some(ErrorCode::PasswordRequired),
                            );
                            return;
                        };
                        let matches: bool =
                            expected.as_bytes().ct_eq(supplied.as_bytes()).into();
                        if !matches {
                            self.send_error_message(
                                connection_id,
                                "Incorrect lobby password".to_string(),
                                Some(ErrorCode::IncorrectPassword),
                            );
                            return;
                        }
                    }
                }
            }

            if let Err(err) = lobby.add_player(Player::new(player_id, player_name.clone())) {
                self.send_error(connection_id, &err);
                return;
            }
            lobby.snapshot(Instant::now())
        };

        self.connection_manager.assign_lobby(connection_id, lobby_id);
        tracing::info!(%player_id, %lobby_id, player_name = %player_name, "Player joined lobby");

        self.send_to_connection(
            connection_id,
            Arc::new(ServerMessage::LobbyJoined(Box::new(snapshot))),
        );
        self.broadcast_lobby_update(lobby_id).await;
        self.broadcast_lobby_list().await;
    }

    pub(crate) async fn handle_leave_lobby(&self, connection_id: ConnectionId) {
        let Some(connection) = self.connection_manager.get(connection_id) else {
            return;
        };
        let Some(lobby_id) = connection.lobby_id else {
            return;
        };
        self.remove_from_lobby(
            connection_id,
            connection.player_id,
            lobby_id,
            HostChangeReason::HostLeft,
        )
        .await;
    }

    pub(crate) async fn handle_get_lobby_list(&self, connection_id: ConnectionId) {
        self.send_lobby_list(connection_id).await;
    }

    /// Shared exit path for voluntary leaves, disconnects, kicks and bans:
    /// remove the participant, promote a replacement host if needed, drop the
    /// lobby once empty, and keep everyone else informed.
    pub(crate) async fn remove_from_lobby(
        &self,
        connection_id: ConnectionId,
        player_id: PlayerId,
        lobby_id: LobbyId,
        reason: HostChangeReason,
    ) {
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            self.connection_manager.clear_lobby(connection_id);
            return;
        };

        let mut lobby_removed = false;
        let mut host_frame = None;
        {
            let mut lobby = handle.lock().await;
            let outcome = lobby.remove_player(player_id);
            if !outcome.removed {
                self.connection_manager.clear_lobby(connection_id);
                return;
            }
            if outcome.is_empty {
                self.lobby_registry.remove(&lobby_id);
                lobby_removed = true;
            } else {
                // The leaver may have been the last holdout of the drawing
                // phase.
                if lobby.status == GameStatus::Drawing && lobby.all_drawings_submitted() {
                    lobby.begin_voting(Instant::now());
                }
                if let Some((new_host_id, new_host_name)) = outcome.new_host {
                    let message = match reason {
                        HostChangeReason::HostDisconnected => format!(
                            "{new_host_name} is now the lobby host (previous host disconnected)"
                        ),
                        _ => format!(
                            "{new_host_name} is now the lobby host (previous host left)"
                        ),
                    };
                    tracing::info!(
                        %lobby_id,
                        old_host = %player_id,
                        new_host = %new_host_id,
                        ?reason,
                        "Host reassigned"
                    );
                    host_frame = Some(ServerMessage::HostTransferred {
                        new_host_id,
                        new_host_name,
                        message,
                        reason,
                    });
                }
            }
        }

        self.connection_manager.clear_lobby(connection_id);

        if lobby_removed {
            self.stop_phase_ticker(&lobby_id);
            tracing::info!(%lobby_id, "Lobby removed - no players remaining");
        } else {
            if let Some(frame) = host_frame {
                self.broadcast_to_lobby(lobby_id, Arc::new(frame));
            }
            self.broadcast_lobby_update(lobby_id).await;
        }
        self.broadcast_lobby_list().await;
        tracing::info!(%player_id, %lobby_id, "Player left lobby");
    }
}
