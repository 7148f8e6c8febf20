
use crate::protocol::{ClientMessage, ConnectionId};

use super::GameServer;

impl GameServer {
    /// Route one decoded inbound action to its service. Actions from the same
    /// connection arrive here in order; each runs to completion under its
    /// lobby's serialisation point before the next is read.
    pub async fn handle_client_message(
        &self,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) {
        match message {
            ClientMessage::CreateLobby {
                player_name,
                settings,
            } => {
                self.handle_create_lobby(connection_id, player_name, settings)
                    .await;
            }
            ClientMessage::JoinLobby {
                lobby_id,
                player_name,
            } => {
                self.handle_join_lobby(connection_id, lobby_id, player_name)
                    .await;
            }
            ClientMessage::JoinLobbyWithPassword {
                lobby_id,
                player_name,
                password,
            } => {
                self.handle_join_lobby_with_password(
                    connection_id,
                    lobby_id,
                    player_name,
                    password,
                )
                .await;
            }
            ClientMessage::LeaveLobby {} => {
                self.handle_leave_lobby(connection_id).await;
            }
            ClientMessage::GetLobbyList {} => {
                self.handle_get_lobby_list(connection_id).await;
            }
            ClientMessage::SetReady { is_ready } => {
                self.handle_set_ready(connection_id, is_ready).await;
            }
            ClientMessage::StartGame {} => {
                self.handle_start_game(connection_id).await;
            }
            ClientMessage::VoteTheme { theme } => {
                self.handle_vote_theme(connection_id, theme).await;
            }
            ClientMessage::SubmitDrawing { drawing } => {
                self.handle_submit_drawing(connection_id, drawing).await;
            }
            ClientMessage::VoteDrawing {
                drawing_id,
                player_id,
            } => {
                self.handle_vote_drawing(connection_id, drawing_id, player_id)
                    .await;
            }
            ClientMessage::KickPlayer { target_player_id } => {
                self.handle_kick_player(connection_id, target_player_id)
                    .await;
            }
            ClientMessage::BanPlayer { target_player_id } => {
                self.handle_ban_player(connection_id, target_player_id).await;
            }
            ClientMessage::TransferHost { target_player_id } => {
                self.handle_transfer_host(connection_id, target_player_id)
                    .await;
            }
            ClientMessage::UpdateLobbySettings { settings } => {
                self.handle_update_settings(connection_id, settings).await;
            }
        }
    }
}
