//! Root configuration struct.

use serde::{Deserialize, Serialize};

use super::defaults::{default_cors_origins, default_port};
use super::game::GameConfig;
use super::logging::LoggingConfig;
use super::server::ServerConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// TCP port the listener binds on 0.0.0.0
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma-separated allowed CORS origins, or "*"
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origins: default_cors_origins(),
            server: ServerConfig::default(),
            game: GameConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
