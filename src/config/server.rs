//! Server behavior configuration types.

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_max_message_size, default_max_players, default_min_players,
    default_outbound_queue_capacity,
};

/// Connection and lobby defaults.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Default maximum players for lobbies created without explicit settings
    #[serde(default = "default_max_players")]
    pub default_max_players: u8,
    /// Default minimum players required to start a game
    #[serde(default = "default_min_players")]
    pub default_min_players: u8,
    /// Bounded per-connection outbound queue depth, in frames.
    /// A connection whose queue overflows is dropped as if it disconnected.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
    /// Maximum accepted inbound frame size (bytes)
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_max_players: default_max_players(),
            default_min_players: default_min_players(),
            outbound_queue_capacity: default_outbound_queue_capacity(),
            max_message_size: default_max_message_size(),
        }
    }
}
