//! Configuration validation.

use super::Config;

/// Check the invariants the game depends on. The loader reports violations as
/// warnings; `main` treats them as fatal.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut problems = Vec::new();

    if config.game.color_themes.is_empty() {
        problems.push("game.color_themes must not be empty".to_string());
    }
    if config.game.default_prompts.is_empty() {
        problems.push("game.default_prompts must not be empty".to_string());
    }
    if config.game.voting_display_secs == 0 {
        problems.push("game.voting_display_secs must be at least 1".to_string());
    }
    if config.server.default_min_players < 2 {
        problems.push("server.default_min_players must be at least 2".to_string());
    }
    if !(2..=20).contains(&config.server.default_max_players) {
        problems.push("server.default_max_players must be between 2 and 20".to_string());
    }
    if config.server.default_min_players > config.server.default_max_players {
        problems.push(
            "server.default_min_players must not exceed server.default_max_players".to_string(),
        );
    }
    if config.server.outbound_queue_capacity == 0 {
        problems.push("server.outbound_queue_capacity must be at least 1".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("\n"))
    }
}
