use std::sync::Arc;
use std::time::Instant;

use crate::protocol::{
    ConnectionId, ErrorCode, GameStatus, HostChangeReason, PlayerId, ServerMessage, SettingsPatch,
};

use super::GameServer;

impl GameServer {
    pub(crate) async fn handle_kick_player(
        &self,
        connection_id: ConnectionId,
        target_player_id: PlayerId,
    ) {
        self.remove_by_host(connection_id, target_player_id, false).await;
    }

    pub(crate) async fn handle_ban_player(
        &self,
        connection_id: ConnectionId,
        target_player_id: PlayerId,
    ) {
        self.remove_by_host(connection_id, target_player_id, true).await;
    }

    /// Kick or ban a participant on behalf of the host. The target's
    /// connection survives with its lobby membership cleared.
    async fn remove_by_host(
        &self,
        connection_id: ConnectionId,
        target_player_id: PlayerId,
        ban: bool,
    ) {
        let Some(connection) = self.connection_manager.get(connection_id) else {
            return;
        };
        let Some(lobby_id) = connection.lobby_id else {
            self.send_error_message(
                connection_id,
                "You are not in a lobby".to_string(),
                Some(ErrorCode::NotInLobby),
            );
            return;
        };
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            return;
        };

        let outcome = {
            let mut lobby = handle.lock().await;
            let result = if ban {
                lobby.ban_player(connection.player_id, target_player_id)
            } else {
                lobby.kick_player(connection.player_id, target_player_id)
            };
            // Removal may leave every remaining participant with a submitted
            // drawing.
            if result.is_ok()
                && lobby.status == GameStatus::Drawing
                && lobby.all_drawings_submitted()
            {
                lobby.begin_voting(Instant::now());
            }
            result
        };

        let display_name = match outcome {
            Ok((name, _)) => name,
            Err(err) => {
                self.send_error(connection_id, &err);
                return;
            }
        };

        // Detach the target's connection and tell them directly.
        if let Some(target_connection) = self
            .connection_manager
            .connection_for_player(target_player_id)
        {
            self.connection_manager.clear_lobby(target_connection);
            let notice = if ban {
                ServerMessage::BannedFromLobby {
                    message: "You have been banned from the lobby".to_string(),
                }
            } else {
                ServerMessage::KickedFromLobby {
                    message: "You have been kicked from the lobby".to_string(),
                }
            };
            self.send_to_connection(target_connection, Arc::new(notice));
        }

        let broadcast = if ban {
            tracing::info!(%lobby_id, target = %target_player_id, "Player banned");
            ServerMessage::PlayerBanned {
                player_id: target_player_id,
                message: format!("Player {display_name} has been banned"),
            }
        } else {
            tracing::info!(%lobby_id, target = %target_player_id, "Player kicked");
            ServerMessage::PlayerKicked {
                player_id: target_player_id,
                message: format!("Player {display_name} has been kicked"),
            }
        };
        self.broadcast_to_lobby(lobby_id, Arc::new(broadcast));
        self.broadcast_lobby_update(lobby_id).await;
        self.broadcast_lobby_list().await;
    }

    pub(crate) async fn handle_transfer_host(
        &self,
        connection_id: ConnectionId,
        target_player_id: PlayerId,
    ) {
        let Some(connection) = self.connection_manager.get(connection_id) else {
            return;
        };
        let Some(lobby_id) = connection.lobby_id else {
            self.send_error_message(
                connection_id,
                "You are not in a lobby".to_string(),
                Some(ErrorCode::NotInLobby),
            );
            return;
        };
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            return;
        };

        let outcome = {
            let mut lobby = handle.lock().await;
            lobby.transfer_host(connection.player_id, target_player_id)
        };
        match outcome {
            Ok(new_host_name) => {
                tracing::info!(
                    %lobby_id,
                    old_host = %connection.player_id,
                    new_host = %target_player_id,
                    "Host privileges transferred"
                );
                self.broadcast_to_lobby(
                    lobby_id,
                    Arc::new(ServerMessage::HostTransferred {
                        new_host_id: target_player_id,
                        new_host_name,
                        message: "Host privileges transferred".to_string(),
                        reason: HostChangeReason::Transferred,
                    }),
                );
                self.broadcast_lobby_update(lobby_id).await;
            }
            Err(err) => self.send_error(connection_id, &err),
        }
    }

    pub(crate) async fn handle_update_settings(
        &self,
        connection_id: ConnectionId,
        patch: SettingsPatch,
    ) {
        let Some(connection) = self.connection_manager.get(connection_id) else {
            return;
        };
        let Some(lobby_id) = connection.lobby_id else {
            self.send_error_message(
                connection_id,
                "You are not in a lobby".to_string(),
                Some(ErrorCode::NotInLobby),
            );
            return;
        };
        let Some(handle) = self.lobby_registry.get(&lobby_id) else {
            return;
        };

        let outcome = {
            let mut lobby = handle.lock().await;
            lobby
                .update_settings(connection.player_id, &patch)
                .map(|()| lobby.settings.view())
        };
        match outcome {
            Ok(settings) => {
                tracing::info!(%lobby_id, host = %connection.player_id, "Lobby settings updated");
                self.broadcast_lobby_update(lobby_id).await;
                self.send_to_connection(
                    connection_id,
                    Arc::new(ServerMessage::SettingsUpdated {
                        message: "Settings updated successfully".to_string(),
                        settings,
                    }),
                );
                // Capacity or privacy may have changed; refresh the listing.
                self.broadcast_lobby_list().await;
            }
            Err(err) => self.send_error(connection_id, &err),
        }
    }
}
