use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for structured error handling.
///
/// Every `error` frame carries a human-readable message; the code gives
/// clients a stable handle for programmatic handling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Frame-level errors
    InvalidJson,
    UnknownAction,
    MessageTooLarge,

    // Validation errors
    InvalidInput,
    InvalidPlayerName,
    InvalidSettings,

    // Lobby membership errors
    LobbyNotFound,
    LobbyFull,
    AlreadyInLobby,
    NotInLobby,
    GameInProgress,
    Banned,
    PasswordRequired,
    IncorrectPassword,

    // Gameplay errors
    NotHost,
    NotEnoughPlayers,
    WrongPhase,
    UnknownTheme,
    AlreadySubmitted,
    NotCurrentDrawing,
    SelfVote,
    AlreadyVoted,
    SelfTarget,
    PlayerNotFound,

    // Server errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
