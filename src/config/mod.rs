//! Configuration module.
//!
//! Layered JSON configuration with env-var overrides and sensible defaults:
//!
//! - [`types`]: root `Config` struct
//! - [`server`]: connection and lobby defaults
//! - [`game`]: theme palette, prompt pool, voting display window
//! - [`logging`]: logging configuration
//! - [`loader`]: configuration loading functions
//! - [`validation`]: configuration validation functions
//! - [`defaults`]: default value functions

pub mod defaults;
pub mod game;
pub mod loader;
pub mod logging;
pub mod server;
pub mod types;
pub mod validation;

pub use game::GameConfig;
pub use loader::load;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use server::ServerConfig;
pub use types::Config;
pub use validation::validate_config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 8765);
        assert_eq!(config.cors_origins, "*");
        assert_eq!(config.server.default_max_players, 4);
        assert_eq!(config.server.default_min_players, 2);
        assert_eq!(config.server.outbound_queue_capacity, 64);
        assert_eq!(config.server.max_message_size, 1024 * 1024);

        assert_eq!(config.game.color_themes.len(), 5);
        assert_eq!(config.game.default_prompts.len(), 10);
        assert_eq!(config.game.voting_display_secs, 10);

        assert_eq!(config.logging.dir, "logs");
        assert_eq!(config.logging.filename, "server.log");
        assert_eq!(config.logging.rotation, "daily");

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.port, deserialized.port);
        assert_eq!(
            config.server.default_max_players,
            deserialized.server.default_max_players
        );
        assert_eq!(config.game.color_themes, deserialized.game.color_themes);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"port": 9100}"#).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.server.default_max_players, 4);
        assert_eq!(config.game.voting_display_secs, 10);
    }

    #[test]
    fn test_validation_flags_broken_game_config() {
        let mut config = Config::default();
        config.game.color_themes.clear();
        config.game.voting_display_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.contains("color_themes"));
        assert!(err.contains("voting_display_secs"));
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }
}
