// Protocol module: wire message types, frame decoding, and snapshot shapes

pub mod error_codes;
pub mod messages;
pub mod snapshot;
pub mod types;

pub use error_codes::ErrorCode;

pub use types::{
    ConnectionId, CurrentVotingDrawing, DrawingId, DrawingSnapshot, GameStatus, HostChangeReason,
    LobbyId, LobbySummary, PlayerId, PlayerSnapshot, SpectatorSnapshot,
};

pub use messages::{decode_client_frame, ClientMessage, FrameDecodeError, ServerMessage};

pub use snapshot::{LobbySnapshot, SettingsPatch, SettingsView};

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn decode_accepts_action_discriminator() {
        let frame = r#"{"action":"set_ready","data":{"is_ready":true}}"#;
        let message = decode_client_frame(frame).unwrap();
        assert_eq!(message, ClientMessage::SetReady { is_ready: true });
    }

    #[test]
    fn decode_accepts_type_discriminator() {
        let frame = r#"{"type":"set_ready","data":{"is_ready":false}}"#;
        let message = decode_client_frame(frame).unwrap();
        assert_eq!(message, ClientMessage::SetReady { is_ready: false });
    }

    #[test]
    fn decode_accepts_player_ready_alias() {
        let frame = r#"{"action":"player_ready","data":{"is_ready":true}}"#;
        let message = decode_client_frame(frame).unwrap();
        assert_eq!(message, ClientMessage::SetReady { is_ready: true });
    }

    #[test]
    fn decode_accepts_vote_for_drawing_alias() {
        let drawing_id = Uuid::new_v4();
        let frame = format!(
            r#"{{"action":"vote_for_drawing","data":{{"drawing_id":"{drawing_id}"}}}}"#
        );
        let message = decode_client_frame(&frame).unwrap();
        assert_eq!(
            message,
            ClientMessage::VoteDrawing {
                drawing_id: Some(drawing_id),
                player_id: None,
            }
        );
    }

    #[test]
    fn decode_tolerates_missing_data_object() {
        let message = decode_client_frame(r#"{"action":"leave_lobby"}"#).unwrap();
        assert_eq!(message, ClientMessage::LeaveLobby {});

        let message = decode_client_frame(r#"{"type":"get_lobby_list"}"#).unwrap();
        assert_eq!(message, ClientMessage::GetLobbyList {});
    }

    #[test]
    fn decode_rejects_unknown_action_by_name() {
        let err = decode_client_frame(r#"{"action":"warp_drive","data":{}}"#).unwrap_err();
        match err {
            FrameDecodeError::UnknownAction(action) => assert_eq!(action, "warp_drive"),
            other => panic!("expected UnknownAction, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_malformed_json_and_non_objects() {
        assert!(matches!(
            decode_client_frame("{not json"),
            Err(FrameDecodeError::InvalidJson(_))
        ));
        assert!(matches!(
            decode_client_frame(r#"["action","set_ready"]"#),
            Err(FrameDecodeError::NotAnObject)
        ));
        assert!(matches!(
            decode_client_frame(r#"{"data":{}}"#),
            Err(FrameDecodeError::MissingAction)
        ));
    }

    #[test]
    fn decode_rejects_bad_payload_with_action_context() {
        let err =
            decode_client_frame(r#"{"action":"vote_theme","data":{"theme":42}}"#).unwrap_err();
        match err {
            FrameDecodeError::InvalidPayload { action, .. } => assert_eq!(action, "vote_theme"),
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
    }

    #[test]
    fn settings_patch_accepts_custom_themes_alias() {
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"custom_themes":["A dragon","A lighthouse"]}"#).unwrap();
        assert_eq!(
            patch.custom_prompts,
            Some(vec!["A dragon".to_string(), "A lighthouse".to_string()])
        );
    }

    #[test]
    fn server_messages_use_type_and_data_keys() {
        let message = ServerMessage::ConnectionAck {
            player_id: Uuid::new_v4(),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "connection_ack");
        assert!(value["data"]["player_id"].is_string());

        let message = ServerMessage::Error {
            message: "Lobby not found".to_string(),
            error_code: Some(ErrorCode::LobbyNotFound),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["data"]["message"], "Lobby not found");
        assert_eq!(value["data"]["error_code"], "LOBBY_NOT_FOUND");
    }

    #[test]
    fn lobby_list_frame_is_an_array_payload() {
        let summary = LobbySummary {
            id: Uuid::new_v4(),
            host_id: Some(Uuid::new_v4()),
            player_count: 1,
            max_players: 4,
            status: GameStatus::WaitingForPlayers,
            created_at: chrono::Utc::now(),
            private_lobby: false,
            has_password: false,
        };
        let value = serde_json::to_value(ServerMessage::LobbyList(vec![summary])).unwrap();
        assert_eq!(value["type"], "lobby_list");
        assert!(value["data"].is_array());
        assert_eq!(value["data"][0]["status"], "waiting_for_players");
    }

    proptest::proptest! {
        #[test]
        fn decode_never_panics_on_arbitrary_input(raw in "\\PC*") {
            let _ = decode_client_frame(&raw);
        }
    }

    #[test]
    fn host_change_reasons_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(HostChangeReason::HostDisconnected).unwrap(),
            "host_disconnected"
        );
        assert_eq!(
            serde_json::to_value(HostChangeReason::HostLeft).unwrap(),
            "host_left"
        );
    }
}
