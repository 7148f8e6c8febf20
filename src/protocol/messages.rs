use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error_codes::ErrorCode;
use super::snapshot::{LobbySnapshot, SettingsPatch, SettingsView};
use super::types::{DrawingId, HostChangeReason, LobbyId, LobbySummary, PlayerId};

fn default_player_name() -> String {
    "Anonymous".to_string()
}

/// Message types sent from client to server.
///
/// On the wire each frame is `{ "action": <snake_case tag>, "data": {..} }`;
/// [`decode_client_frame`] also accepts `type` as the discriminator key and
/// the historical action aliases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a new lobby and join it as host.
    CreateLobby {
        #[serde(default = "default_player_name")]
        player_name: String,
        #[serde(default)]
        settings: Option<SettingsPatch>,
    },
    /// Join an existing public lobby.
    JoinLobby {
        lobby_id: LobbyId,
        #[serde(default = "default_player_name")]
        player_name: String,
    },
    /// Join a private lobby, supplying its password.
    JoinLobbyWithPassword {
        lobby_id: LobbyId,
        #[serde(default = "default_player_name")]
        player_name: String,
        #[serde(default)]
        password: String,
    },
    /// Leave the current lobby.
    LeaveLobby {},
    /// Request the joinable-lobby listing.
    GetLobbyList {},
    /// Toggle readiness in the waiting room.
    #[serde(alias = "player_ready")]
    SetReady {
        #[serde(default)]
        is_ready: bool,
    },
    /// Host-only: start the game once quorum is ready.
    StartGame {},
    /// Cast or change a color-theme vote.
    VoteTheme { theme: String },
    /// Submit the drawing for the current prompt (opaque payload).
    SubmitDrawing { drawing: String },
    /// Vote for the drawing currently on display. Either the drawing id or
    /// its author's player id identifies the target.
    #[serde(alias = "vote_for_drawing")]
    VoteDrawing {
        #[serde(default)]
        drawing_id: Option<DrawingId>,
        #[serde(default)]
        player_id: Option<PlayerId>,
    },
    /// Host-only: remove a participant from the lobby.
    KickPlayer { target_player_id: PlayerId },
    /// Host-only: remove a participant and bar them from rejoining.
    BanPlayer { target_player_id: PlayerId },
    /// Host-only: hand the host role to another participant.
    TransferHost { target_player_id: PlayerId },
    /// Host-only: patch lobby settings while waiting for players.
    UpdateLobbySettings { settings: SettingsPatch },
}

/// Message types sent from server to client. Each frame is
/// `{ "type": <snake_case tag>, "data": .. }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame on every connection; carries the assigned participant id.
    ConnectionAck { player_id: PlayerId },
    /// Full snapshot sent to a client that just entered a lobby (boxed to
    /// keep the enum small).
    LobbyJoined(Box<LobbySnapshot>),
    /// Full snapshot broadcast on every visible state change or timer tick.
    LobbyUpdate(Box<LobbySnapshot>),
    /// Joinable-lobby listing.
    LobbyList(Vec<LobbySummary>),
    /// Acknowledges a drawing submission to its author.
    DrawingSubmitted { success: bool },
    /// Broadcast to a lobby after a kick.
    PlayerKicked { player_id: PlayerId, message: String },
    /// Broadcast to a lobby after a ban.
    PlayerBanned { player_id: PlayerId, message: String },
    /// Sent to the kicked participant alone.
    KickedFromLobby { message: String },
    /// Sent to the banned participant alone.
    BannedFromLobby { message: String },
    /// Broadcast whenever the host role moves, voluntarily or not.
    HostTransferred {
        new_host_id: PlayerId,
        new_host_name: String,
        message: String,
        reason: HostChangeReason,
    },
    /// Confirms a settings patch to the host that issued it.
    SettingsUpdated {
        message: String,
        settings: SettingsView,
    },
    /// Any refusal or failure local to this connection.
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<ErrorCode>,
    },
}

/// Inbound actions the dispatcher understands, including aliases. Kept in
/// sync with [`ClientMessage`] so unknown actions can be reported by name
/// before payload decoding.
const KNOWN_ACTIONS: &[&str] = &[
    "create_lobby",
    "join_lobby",
    "join_lobby_with_password",
    "leave_lobby",
    "get_lobby_list",
    "set_ready",
    "player_ready",
    "start_game",
    "vote_theme",
    "submit_drawing",
    "vote_drawing",
    "vote_for_drawing",
    "kick_player",
    "ban_player",
    "transfer_host",
    "update_lobby_settings",
];

/// Why an inbound frame was rejected before reaching the dispatcher.
#[derive(Debug, Error)]
pub enum FrameDecodeError {
    #[error("Invalid JSON format")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Frame must be a JSON object")]
    NotAnObject,
    #[error("Missing action field")]
    MissingAction,
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Invalid payload for action `{action}`: {source}")]
    InvalidPayload {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FrameDecodeError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidJson(_) | Self::NotAnObject => ErrorCode::InvalidJson,
            Self::MissingAction | Self::UnknownAction(_) => ErrorCode::UnknownAction,
            Self::InvalidPayload { .. } => ErrorCode::InvalidInput,
        }
    }
}

/// Decode one inbound text frame.
///
/// Accepts either `action` or `type` as the discriminator key and fills in an
/// empty `data` object when the client omits it.
pub fn decode_client_frame(text: &str) -> Result<ClientMessage, FrameDecodeError> {
    let mut value: serde_json::Value =
        serde_json::from_str(text).map_err(FrameDecodeError::InvalidJson)?;
    let object = value
        .as_object_mut()
        .ok_or(FrameDecodeError::NotAnObject)?;

    if !object.contains_key("action") {
        let tag = object
            .remove("type")
            .ok_or(FrameDecodeError::MissingAction)?;
        object.insert("action".to_string(), tag);
    }

    let action = match object.get("action").and_then(|tag| tag.as_str()) {
        Some(action) => action.to_string(),
        None => return Err(FrameDecodeError::MissingAction),
    };
    if !KNOWN_ACTIONS.contains(&action.as_str()) {
        return Err(FrameDecodeError::UnknownAction(action));
    }

    if !object.contains_key("data") {
        object.insert(
            "data".to_string(),
            serde_json::Value::Object(serde_json::Map::new()),
        );
    }

    serde_json::from_value(value)
        .map_err(|source| FrameDecodeError::InvalidPayload { action, source })
}
