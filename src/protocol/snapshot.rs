use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{
    CurrentVotingDrawing, DrawingId, DrawingSnapshot, GameStatus, LobbyId, PlayerId,
    PlayerSnapshot, SpectatorSnapshot,
};

/// Outbound view of lobby settings. The password itself never leaves the
/// server; clients only learn whether one is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsView {
    pub max_players: u8,
    pub min_players: u8,
    pub theme_voting_time: u64,
    pub drawing_time: u64,
    pub voting_time: u64,
    pub showcase_time_per_drawing: u64,
    pub allow_spectators: bool,
    pub private_lobby: bool,
    pub has_password: bool,
    pub custom_prompts: Vec<String>,
    pub enable_chat: bool,
    pub auto_start_when_ready: bool,
    pub winner_takes_all: bool,
}

/// Partial settings update. Absent fields are left untouched; present fields
/// outside their permitted bounds are skipped silently when applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SettingsPatch {
    pub max_players: Option<u8>,
    pub min_players: Option<u8>,
    pub theme_voting_time: Option<u64>,
    pub drawing_time: Option<u64>,
    pub voting_time: Option<u64>,
    pub showcase_time_per_drawing: Option<u64>,
    pub allow_spectators: Option<bool>,
    pub private_lobby: Option<bool>,
    pub lobby_password: Option<String>,
    #[serde(alias = "custom_themes")]
    pub custom_prompts: Option<Vec<String>>,
    pub enable_chat: Option<bool>,
    pub auto_start_when_ready: Option<bool>,
    pub winner_takes_all: Option<bool>,
}

/// Complete, self-consistent lobby state as sent in `lobby_joined` and
/// `lobby_update` frames.
///
/// Phase-gated collections (`color_theme_options`, `drawings`, `results`, the
/// current-voting block, `showcase_index`) are empty or absent outside their
/// phase rather than omitted from the schema, so clients can bind to a single
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LobbySnapshot {
    pub id: LobbyId,
    pub host_id: Option<PlayerId>,
    pub players: HashMap<PlayerId, PlayerSnapshot>,
    pub spectators: HashMap<PlayerId, SpectatorSnapshot>,
    pub settings: SettingsView,
    pub game_status: GameStatus,
    /// Whole-phase countdown, in seconds. Monotone non-increasing within a
    /// phase.
    pub phase_time_remaining: u64,
    pub prompt: Option<String>,
    pub color_theme: Option<String>,
    pub color_theme_options: Vec<String>,
    pub color_theme_votes: HashMap<String, u32>,
    pub theme_votes: HashMap<PlayerId, String>,
    pub drawings: HashMap<DrawingId, DrawingSnapshot>,
    pub drawing_votes: HashMap<PlayerId, DrawingId>,
    /// Drawings in descending vote order, populated once results exist.
    pub results: Vec<DrawingSnapshot>,
    pub current_voting_drawing: Option<CurrentVotingDrawing>,
    pub current_voting_drawing_index: Option<usize>,
    /// Countdown for the drawing currently on display, in seconds.
    pub voting_display_time_remaining: u64,
    pub showcase_index: Option<usize>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
