//! Game content configuration: the theme palette, the built-in prompt pool,
//! and the voting display window.

use serde::{Deserialize, Serialize};

use super::defaults::{default_color_themes, default_prompts, default_voting_display_secs};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GameConfig {
    /// Color themes offered during `theme_voting`
    #[serde(default = "default_color_themes")]
    pub color_themes: Vec<String>,
    /// Built-in drawing prompts; lobby custom prompts are added on top
    #[serde(default = "default_prompts")]
    pub default_prompts: Vec<String>,
    /// How long each drawing stays on display during `voting_for_drawings`.
    /// Deployments that want the legacy free-form voting model set this
    /// larger than the voting phase duration.
    #[serde(default = "default_voting_display_secs")]
    pub voting_display_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            color_themes: default_color_themes(),
            default_prompts: default_prompts(),
            voting_display_secs: default_voting_display_secs(),
        }
    }
}
