use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connected client socket.
pub type ConnectionId = Uuid;
/// Unique identifier for players (participants).
pub type PlayerId = Uuid;
/// Unique identifier for lobbies.
pub type LobbyId = Uuid;
/// Unique identifier for submitted drawings.
pub type DrawingId = Uuid;

/// Phase the lobby's game is currently in.
///
/// Phases advance strictly in declaration order; `Ended` settles briefly and
/// then the lobby resets to `WaitingForPlayers`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    WaitingForPlayers,
    ThemeVoting,
    Drawing,
    VotingForDrawings,
    ShowcasingResults,
    Ended,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaitingForPlayers => "waiting_for_players",
            Self::ThemeVoting => "theme_voting",
            Self::Drawing => "drawing",
            Self::VotingForDrawings => "voting_for_drawings",
            Self::ShowcasingResults => "showcasing_results",
            Self::Ended => "ended",
        }
    }

    /// Whether a round is currently running (anything past the waiting room).
    pub fn in_progress(self) -> bool {
        self != Self::WaitingForPlayers
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-player view embedded in lobby snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub display_name: String,
    pub is_ready: bool,
    pub is_host: bool,
    pub score: i64,
    pub has_submitted_drawing: bool,
}

/// Spectator view embedded in lobby snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpectatorSnapshot {
    pub player_id: PlayerId,
    pub display_name: String,
}

/// A drawing as exposed during the voting and results phases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawingSnapshot {
    pub id: DrawingId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub data: String,
    pub prompt: String,
    pub votes: u32,
}

/// The drawing currently on display during `voting_for_drawings`, including
/// the identities of everyone whose live vote targets it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentVotingDrawing {
    pub drawing_id: DrawingId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub data: String,
    pub prompt: String,
    pub votes: u32,
    pub current_voters: Vec<PlayerId>,
}

/// One entry of the joinable-lobby listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LobbySummary {
    pub id: LobbyId,
    pub host_id: Option<PlayerId>,
    pub player_count: usize,
    pub max_players: u8,
    pub status: GameStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub private_lobby: bool,
    pub has_password: bool,
}

/// Why the `host_transferred` frame was emitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HostChangeReason {
    /// The host handed the role over voluntarily.
    Transferred,
    /// The host left the lobby and the next participant was promoted.
    HostLeft,
    /// The host's connection dropped and the next participant was promoted.
    HostDisconnected,
}
