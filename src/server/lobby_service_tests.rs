use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::protocol::{
    ClientMessage, ConnectionId, ErrorCode, GameStatus, HostChangeReason, LobbyId, PlayerId,
    ServerMessage, SettingsPatch,
};

use super::{GameServer, ServerConfig};

type Frames = mpsc::Receiver<Arc<ServerMessage>>;

fn server() -> Arc<GameServer> {
    GameServer::new(ServerConfig::default())
}

fn client(server: &Arc<GameServer>) -> (ConnectionId, PlayerId, Frames) {
    let (tx, rx) = mpsc::channel(64);
    let (connection_id, player_id) = server.connect_test_client(tx);
    (connection_id, player_id, rx)
}

async fn recv_matching<F>(frames: &mut Frames, mut predicate: F) -> Arc<ServerMessage>
where
    F: FnMut(&ServerMessage) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let message = frames.recv().await.expect("frame channel closed");
            if predicate(&message) {
                return message;
            }
        }
    })
    .await
    .expect("timed out waiting for frame")
}

async fn create_lobby(
    server: &Arc<GameServer>,
    connection_id: ConnectionId,
    frames: &mut Frames,
    settings: Option<SettingsPatch>,
) -> LobbyId {
    server
        .handle_client_message(
            connection_id,
            ClientMessage::CreateLobby {
                player_name: "Host".to_string(),
                settings,
            },
        )
        .await;
    let joined = recv_matching(frames, |m| matches!(m, ServerMessage::LobbyJoined(_))).await;
    match joined.as_ref() {
        ServerMessage::LobbyJoined(snapshot) => snapshot.id,
        _ => unreachable!(),
    }
}

async fn join_lobby(
    server: &Arc<GameServer>,
    connection_id: ConnectionId,
    frames: &mut Frames,
    lobby_id: LobbyId,
    name: &str,
) {
    server
        .handle_client_message(
            connection_id,
            ClientMessage::JoinLobby {
                lobby_id,
                player_name: name.to_string(),
            },
        )
        .await;
    recv_matching(frames, |m| matches!(m, ServerMessage::LobbyJoined(_))).await;
}

#[tokio::test]
async fn start_quorum_scenario() {
    let server = server();
    let (conn_a, _player_a, mut frames_a) = client(&server);
    let (conn_b, _player_b, mut frames_b) = client(&server);

    let settings = SettingsPatch {
        min_players: Some(2),
        max_players: Some(4),
        ..SettingsPatch::default()
    };
    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, Some(settings)).await;
    join_lobby(&server, conn_b, &mut frames_b, lobby_id, "B").await;

    server
        .handle_client_message(conn_a, ClientMessage::SetReady { is_ready: true })
        .await;
    server
        .handle_client_message(conn_b, ClientMessage::SetReady { is_ready: true })
        .await;
    server
        .handle_client_message(conn_a, ClientMessage::StartGame {})
        .await;

    let update = recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::LobbyUpdate(s) if s.game_status == GameStatus::ThemeVoting)
    })
    .await;
    match update.as_ref() {
        ServerMessage::LobbyUpdate(snapshot) => {
            assert_eq!(snapshot.game_status, GameStatus::ThemeVoting);
            assert_eq!(snapshot.color_theme_options.len(), 5);
            assert!(snapshot.phase_time_remaining > 0);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn start_game_is_host_only() {
    let server = server();
    let (conn_a, _, mut frames_a) = client(&server);
    let (conn_b, _, mut frames_b) = client(&server);

    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, None).await;
    join_lobby(&server, conn_b, &mut frames_b, lobby_id, "B").await;

    server
        .handle_client_message(conn_a, ClientMessage::SetReady { is_ready: true })
        .await;
    server
        .handle_client_message(conn_b, ClientMessage::SetReady { is_ready: true })
        .await;
    server
        .handle_client_message(conn_b, ClientMessage::StartGame {})
        .await;

    let error = recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::Error { .. })
    })
    .await;
    match error.as_ref() {
        ServerMessage::Error { message, .. } => {
            assert_eq!(message, "Only the host can start the game");
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn host_disconnect_promotes_the_next_participant() {
    let server = server();
    let (conn_a, _player_a, mut frames_a) = client(&server);
    let (conn_b, player_b, mut frames_b) = client(&server);

    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, None).await;
    join_lobby(&server, conn_b, &mut frames_b, lobby_id, "B").await;

    server.unregister_connection(conn_a).await;

    let transferred = recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::HostTransferred { .. })
    })
    .await;
    match transferred.as_ref() {
        ServerMessage::HostTransferred {
            new_host_id,
            reason,
            ..
        } => {
            assert_eq!(*new_host_id, player_b);
            assert_eq!(*reason, HostChangeReason::HostDisconnected);
        }
        _ => unreachable!(),
    }

    let update = recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::LobbyUpdate(_))
    })
    .await;
    match update.as_ref() {
        ServerMessage::LobbyUpdate(snapshot) => {
            assert_eq!(snapshot.host_id, Some(player_b));
            assert_eq!(snapshot.players.len(), 1);
        }
        _ => unreachable!(),
    }
    assert!(server.lobby_registry.get(&lobby_id).is_some(), "lobby survives");
}

#[tokio::test]
async fn last_leaver_removes_the_lobby() {
    let server = server();
    let (conn_a, _, mut frames_a) = client(&server);
    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, None).await;

    server
        .handle_client_message(conn_a, ClientMessage::LeaveLobby {})
        .await;
    assert!(server.lobby_registry.get(&lobby_id).is_none());

    // Joining the dead lobby now fails.
    let (conn_b, _, mut frames_b) = client(&server);
    server
        .handle_client_message(
            conn_b,
            ClientMessage::JoinLobby {
                lobby_id,
                player_name: "B".to_string(),
            },
        )
        .await;
    let error = recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::Error { .. })
    })
    .await;
    match error.as_ref() {
        ServerMessage::Error { message, error_code } => {
            assert_eq!(message, "Lobby not found");
            assert_eq!(*error_code, Some(ErrorCode::LobbyNotFound));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn ban_notifies_detaches_and_blocks_rejoin() {
    let server = server();
    let (conn_a, _, mut frames_a) = client(&server);
    let (conn_b, player_b, mut frames_b) = client(&server);

    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, None).await;
    join_lobby(&server, conn_b, &mut frames_b, lobby_id, "B").await;

    server
        .handle_client_message(
            conn_a,
            ClientMessage::BanPlayer {
                target_player_id: player_b,
            },
        )
        .await;

    recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::BannedFromLobby { .. })
    })
    .await;
    assert_eq!(server.connection_manager.lobby_of(conn_b), None);

    let banned_broadcast = recv_matching(&mut frames_a, |m| {
        matches!(m, ServerMessage::PlayerBanned { .. })
    })
    .await;
    match banned_broadcast.as_ref() {
        ServerMessage::PlayerBanned { player_id, .. } => assert_eq!(*player_id, player_b),
        _ => unreachable!(),
    }

    server
        .handle_client_message(
            conn_b,
            ClientMessage::JoinLobby {
                lobby_id,
                player_name: "B".to_string(),
            },
        )
        .await;
    let error = recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::Error { .. })
    })
    .await;
    match error.as_ref() {
        ServerMessage::Error { message, error_code } => {
            assert_eq!(message, "You have been banned from this lobby");
            assert_eq!(*error_code, Some(ErrorCode::Banned));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn kick_requires_host() {
    let server = server();
    let (conn_a, player_a, mut frames_a) = client(&server);
    let (conn_b, _, mut frames_b) = client(&server);

    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, None).await;
    join_lobby(&server, conn_b, &mut frames_b, lobby_id, "B").await;

    server
        .handle_client_message(
            conn_b,
            ClientMessage::KickPlayer {
                target_player_id: player_a,
            },
        )
        .await;
    let error = recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::Error { .. })
    })
    .await;
    match error.as_ref() {
        ServerMessage::Error { message, .. } => {
            assert_eq!(message, "Only the host can kick players");
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn private_lobby_requires_the_password_flow() {
    let server = server();
    let (conn_a, _, mut frames_a) = client(&server);
    let settings = SettingsPatch {
        private_lobby: Some(true),
        lobby_password: Some("sekrit".to_string()),
        ..SettingsPatch::default()
    };
    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, Some(settings)).await;

    let (conn_b, _, mut frames_b) = client(&server);
    server
        .handle_client_message(
            conn_b,
            ClientMessage::JoinLobby {
                lobby_id,
                player_name: "B".to_string(),
            },
        )
        .await;
    recv_matching(&mut frames_b, |m| {
        matches!(
            m,
            ServerMessage::Error { error_code: Some(ErrorCode::PasswordRequired), .. }
        )
    })
    .await;

    server
        .handle_client_message(
            conn_b,
            ClientMessage::JoinLobbyWithPassword {
                lobby_id,
                player_name: "B".to_string(),
                password: "wrong".to_string(),
            },
        )
        .await;
    recv_matching(&mut frames_b, |m| {
        matches!(
            m,
            ServerMessage::Error { error_code: Some(ErrorCode::IncorrectPassword), .. }
        )
    })
    .await;

    server
        .handle_client_message(
            conn_b,
            ClientMessage::JoinLobbyWithPassword {
                lobby_id,
                player_name: "B".to_string(),
                password: "sekrit".to_string(),
            },
        )
        .await;
    recv_matching(&mut frames_b, |m| matches!(m, ServerMessage::LobbyJoined(_))).await;
}

#[tokio::test]
async fn private_lobbies_stay_listed_but_flagged() {
    let server = server();
    let (conn_a, _, mut frames_a) = client(&server);
    let settings = SettingsPatch {
        private_lobby: Some(true),
        lobby_password: Some("pw".to_string()),
        ..SettingsPatch::default()
    };
    create_lobby(&server, conn_a, &mut frames_a, Some(settings)).await;

    let (conn_b, _, mut frames_b) = client(&server);
    server
        .handle_client_message(conn_b, ClientMessage::GetLobbyList {})
        .await;
    let list = recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::LobbyList(_))
    })
    .await;
    match list.as_ref() {
        ServerMessage::LobbyList(summaries) => {
            assert_eq!(summaries.len(), 1);
            assert!(summaries[0].private_lobby);
            assert!(summaries[0].has_password);
            assert_eq!(summaries[0].player_count, 1);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn game_in_progress_drops_out_of_the_lobby_list() {
    let server = server();
    let (conn_a, _, mut frames_a) = client(&server);
    let (conn_b, _, mut frames_b) = client(&server);

    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, None).await;
    join_lobby(&server, conn_b, &mut frames_b, lobby_id, "B").await;
    server
        .handle_client_message(conn_a, ClientMessage::SetReady { is_ready: true })
        .await;
    server
        .handle_client_message(conn_b, ClientMessage::SetReady { is_ready: true })
        .await;
    server
        .handle_client_message(conn_a, ClientMessage::StartGame {})
        .await;

    let (conn_c, _, mut frames_c) = client(&server);
    server
        .handle_client_message(conn_c, ClientMessage::GetLobbyList {})
        .await;
    let list = recv_matching(&mut frames_c, |m| {
        matches!(m, ServerMessage::LobbyList(_))
    })
    .await;
    match list.as_ref() {
        ServerMessage::LobbyList(summaries) => assert!(summaries.is_empty()),
        _ => unreachable!(),
    }

    // And joining it directly is refused.
    server
        .handle_client_message(
            conn_c,
            ClientMessage::JoinLobby {
                lobby_id,
                player_name: "C".to_string(),
            },
        )
        .await;
    let error = recv_matching(&mut frames_c, |m| {
        matches!(m, ServerMessage::Error { .. })
    })
    .await;
    match error.as_ref() {
        ServerMessage::Error { message, .. } => {
            assert_eq!(message, "Game is already in progress");
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn auto_start_fires_on_the_final_ready_toggle() {
    let server = server();
    let (conn_a, _, mut frames_a) = client(&server);
    let (conn_b, _, mut frames_b) = client(&server);

    let settings = SettingsPatch {
        auto_start_when_ready: Some(true),
        ..SettingsPatch::default()
    };
    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, Some(settings)).await;
    join_lobby(&server, conn_b, &mut frames_b, lobby_id, "B").await;

    server
        .handle_client_message(conn_a, ClientMessage::SetReady { is_ready: true })
        .await;
    server
        .handle_client_message(conn_b, ClientMessage::SetReady { is_ready: true })
        .await;

    recv_matching(&mut frames_a, |m| {
        matches!(m, ServerMessage::LobbyUpdate(s) if s.game_status == GameStatus::ThemeVoting)
    })
    .await;
}

#[tokio::test]
async fn submit_all_drawings_enters_voting_early() {
    let server = server();
    let (conn_a, _, mut frames_a) = client(&server);
    let (conn_b, _, mut frames_b) = client(&server);

    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, None).await;
    join_lobby(&server, conn_b, &mut frames_b, lobby_id, "B").await;
    server
        .handle_client_message(conn_a, ClientMessage::SetReady { is_ready: true })
        .await;
    server
        .handle_client_message(conn_b, ClientMessage::SetReady { is_ready: true })
        .await;
    server
        .handle_client_message(conn_a, ClientMessage::StartGame {})
        .await;

    // Force the drawing phase without waiting out the theme timer.
    {
        let handle = server.lobby_registry.get(&lobby_id).unwrap();
        let mut lobby = handle.lock().await;
        let mut rng = rand::rng();
        lobby.begin_drawing(std::time::Instant::now(), &mut rng);
    }

    server
        .handle_client_message(
            conn_a,
            ClientMessage::SubmitDrawing {
                drawing: "a-canvas".to_string(),
            },
        )
        .await;
    recv_matching(&mut frames_a, |m| {
        matches!(m, ServerMessage::DrawingSubmitted { success: true })
    })
    .await;

    server
        .handle_client_message(
            conn_b,
            ClientMessage::SubmitDrawing {
                drawing: "b-canvas".to_string(),
            },
        )
        .await;

    let update = recv_matching(&mut frames_a, |m| {
        matches!(m, ServerMessage::LobbyUpdate(s) if s.game_status == GameStatus::VotingForDrawings)
    })
    .await;
    match update.as_ref() {
        ServerMessage::LobbyUpdate(snapshot) => {
            assert_eq!(snapshot.current_voting_drawing_index, Some(0));
            assert!(snapshot.current_voting_drawing.is_some());
            assert_eq!(snapshot.drawings.len(), 2);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn settings_update_confirms_and_rebroadcasts() {
    let server = server();
    let (conn_a, _, mut frames_a) = client(&server);
    let (conn_b, _, mut frames_b) = client(&server);

    let lobby_id = create_lobby(&server, conn_a, &mut frames_a, None).await;
    join_lobby(&server, conn_b, &mut frames_b, lobby_id, "B").await;

    server
        .handle_client_message(
            conn_a,
            ClientMessage::UpdateLobbySettings {
                settings: SettingsPatch {
                    max_players: Some(8),
                    ..SettingsPatch::default()
                },
            },
        )
        .await;

    let confirmation = recv_matching(&mut frames_a, |m| {
        matches!(m, ServerMessage::SettingsUpdated { .. })
    })
    .await;
    match confirmation.as_ref() {
        ServerMessage::SettingsUpdated { settings, message } => {
            assert_eq!(message, "Settings updated successfully");
            assert_eq!(settings.max_players, 8);
        }
        _ => unreachable!(),
    }

    recv_matching(&mut frames_b, |m| {
        matches!(m, ServerMessage::LobbyUpdate(s) if s.settings.max_players == 8)
    })
    .await;
}

#[tokio::test]
async fn gameplay_actions_outside_a_lobby_are_refused() {
    let server = server();
    let (conn, _, mut frames) = client(&server);
    server
        .handle_client_message(conn, ClientMessage::SetReady { is_ready: true })
        .await;
    let error = recv_matching(&mut frames, |m| {
        matches!(m, ServerMessage::Error { .. })
    })
    .await;
    match error.as_ref() {
        ServerMessage::Error { message, error_code } => {
            assert_eq!(message, "You are not in a lobby");
            assert_eq!(*error_code, Some(ErrorCode::NotInLobby));
        }
        _ => unreachable!(),
    }
}
