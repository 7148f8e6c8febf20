use thiserror::Error;

use crate::protocol::ErrorCode;

/// Refusals produced by the lobby core. Every variant's `Display` is the
/// stable, user-visible message carried by the resulting `error` frame; the
/// lobby itself is left unchanged whenever one of these is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LobbyError {
    #[error("You have been banned from this lobby")]
    Banned,
    #[error("Lobby is full, but you can join as a spectator")]
    FullSpectatorsAllowed,
    #[error("Lobby is full")]
    Full,
    #[error("Game is already in progress")]
    GameInProgress,

    #[error("Only the host can start the game")]
    NotHostStart,
    #[error("Cannot start game - need more players or not all players are ready")]
    NotReadyToStart,

    #[error("Theme voting is not active")]
    ThemeVotingInactive,
    #[error("That color theme is not an option")]
    UnknownTheme,

    #[error("Drawing phase is not active")]
    DrawingInactive,
    #[error("You have already submitted a drawing")]
    AlreadySubmitted,

    #[error("Drawing voting is not active")]
    VotingInactive,
    #[error("Drawing not found")]
    DrawingNotFound,
    #[error("You can only vote for the drawing currently on display")]
    NotCurrentDrawing,
    #[error("You cannot vote for your own drawing")]
    OwnDrawing,
    #[error("You have already voted for this drawing")]
    AlreadyVoted,

    #[error("Only the host can kick players")]
    NotHostKick,
    #[error("Only the host can ban players")]
    NotHostBan,
    #[error("Only the host can transfer host privileges")]
    NotHostTransfer,
    #[error("Host cannot kick themselves")]
    SelfKick,
    #[error("Host cannot ban themselves")]
    SelfBan,
    #[error("Player not found in lobby")]
    PlayerNotFound,

    #[error("Only the host can change lobby settings")]
    NotHostSettings,
    #[error("Cannot change settings while game is in progress")]
    SettingsLocked,
    #[error("Cannot set max players below current player count ({0})")]
    MaxBelowCurrentCount(usize),
    #[error("Minimum players cannot exceed maximum players")]
    MinAboveMax,
    #[error("No changes made to settings")]
    NoSettingsChanged,
}

impl LobbyError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Banned => ErrorCode::Banned,
            Self::FullSpectatorsAllowed | Self::Full => ErrorCode::LobbyFull,
            Self::GameInProgress => ErrorCode::GameInProgress,
            Self::NotHostStart
            | Self::NotHostKick
            | Self::NotHostBan
            | Self::NotHostTransfer
            | Self::NotHostSettings => ErrorCode::NotHost,
            Self::NotReadyToStart => ErrorCode::NotEnoughPlayers,
            Self::ThemeVotingInactive | Self::DrawingInactive | Self::VotingInactive => {
                ErrorCode::WrongPhase
            }
            Self::UnknownTheme => ErrorCode::UnknownTheme,
            Self::AlreadySubmitted => ErrorCode::AlreadySubmitted,
            Self::DrawingNotFound => ErrorCode::NotCurrentDrawing,
            Self::NotCurrentDrawing => ErrorCode::NotCurrentDrawing,
            Self::OwnDrawing => ErrorCode::SelfVote,
            Self::AlreadyVoted => ErrorCode::AlreadyVoted,
            Self::SelfKick | Self::SelfBan => ErrorCode::SelfTarget,
            Self::PlayerNotFound => ErrorCode::PlayerNotFound,
            Self::SettingsLocked
            | Self::MaxBelowCurrentCount(_)
            | Self::MinAboveMax
            | Self::NoSettingsChanged => ErrorCode::InvalidSettings,
        }
    }
}
