use crate::protocol::{SettingsPatch, SettingsView};

use super::error::LobbyError;

pub const MIN_PLAYERS_FLOOR: u8 = 2;
pub const MAX_PLAYERS_CEILING: u8 = 20;
/// Lower bound shared by every timed phase.
pub const MIN_PHASE_SECS: u64 = 10;
/// Upper bound for the theme-voting and drawing-voting phases.
pub const MAX_SHORT_PHASE_SECS: u64 = 300;
/// Upper bound for the drawing phase (three days, for slow-burn lobbies).
pub const MAX_DRAWING_SECS: u64 = 259_200;
pub const MIN_SHOWCASE_SECS: u64 = 3;
pub const MAX_SHOWCASE_SECS: u64 = 30;

/// Per-lobby settings. Mutable only by the host and only while the lobby is
/// waiting for players.
#[derive(Debug, Clone, PartialEq)]
pub struct LobbySettings {
    pub max_players: u8,
    pub min_players: u8,
    pub theme_voting_time: u64,
    pub drawing_time: u64,
    pub voting_time: u64,
    pub showcase_time_per_drawing: u64,
    pub allow_spectators: bool,
    pub private_lobby: bool,
    pub lobby_password: Option<String>,
    pub custom_prompts: Vec<String>,
    pub enable_chat: bool,
    pub auto_start_when_ready: bool,
    pub winner_takes_all: bool,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            max_players: 4,
            min_players: 2,
            theme_voting_time: 30,
            drawing_time: 300,
            voting_time: 60,
            showcase_time_per_drawing: 10,
            allow_spectators: true,
            private_lobby: false,
            lobby_password: None,
            custom_prompts: Vec::new(),
            enable_chat: true,
            auto_start_when_ready: false,
            winner_takes_all: false,
        }
    }
}

impl LobbySettings {
    pub fn has_password(&self) -> bool {
        self.lobby_password.is_some()
    }

    /// Outbound view with the password replaced by `has_password`.
    pub fn view(&self) -> SettingsView {
        SettingsView {
            max_players: self.max_players,
            min_players: self.min_players,
            theme_voting_time: self.theme_voting_time,
            drawing_time: self.drawing_time,
            voting_time: self.voting_time,
            showcase_time_per_drawing: self.showcase_time_per_drawing,
            allow_spectators: self.allow_spectators,
            private_lobby: self.private_lobby,
            has_password: self.has_password(),
            custom_prompts: self.custom_prompts.clone(),
            enable_chat: self.enable_chat,
            auto_start_when_ready: self.auto_start_when_ready,
            winner_takes_all: self.winner_takes_all,
        }
    }

    /// Apply a partial update.
    ///
    /// A new maximum below the current participant count, or a new minimum
    /// above the effective maximum, invalidates the lobby and rejects the
    /// whole patch. Other fields outside their permitted bounds are skipped
    /// silently. Returns whether anything actually changed.
    pub fn apply_patch(
        &mut self,
        patch: &SettingsPatch,
        current_player_count: usize,
    ) -> Result<bool, LobbyError> {
        if let Some(new_max) = patch.max_players {
            if usize::from(new_max) < current_player_count {
                return Err(LobbyError::MaxBelowCurrentCount(current_player_count));
            }
        }

        let effective_max = patch
            .max_players
            .filter(|max| (MIN_PLAYERS_FLOOR..=MAX_PLAYERS_CEILING).contains(max))
            .unwrap_or(self.max_players);
        if let Some(new_min) = patch.min_players {
            if new_min > effective_max {
                return Err(LobbyError::MinAboveMax);
            }
        }

        let mut changed = false;

        if let Some(max) = patch.max_players {
            if (MIN_PLAYERS_FLOOR..=MAX_PLAYERS_CEILING).contains(&max) && max != self.max_players {
                self.max_players = max;
                changed = true;
            }
        }
        if let Some(min) = patch.min_players {
            if min >= MIN_PLAYERS_FLOOR && min <= self.max_players && min != self.min_players {
                self.min_players = min;
                changed = true;
            }
        }
        if let Some(secs) = patch.theme_voting_time {
            if (MIN_PHASE_SECS..=MAX_SHORT_PHASE_SECS).contains(&secs)
                && secs != self.theme_voting_time
            {
                self.theme_voting_time = secs;
                changed = true;
            }
        }
        if let Some(secs) = patch.drawing_time {
            if (MIN_PHASE_SECS..=MAX_DRAWING_SECS).contains(&secs) && secs != self.drawing_time {
                self.drawing_time = secs;
                changed = true;
            }
        }
        if let Some(secs) = patch.voting_time {
            if (MIN_PHASE_SECS..=MAX_SHORT_PHASE_SECS).contains(&secs) && secs != self.voting_time {
                self.voting_time = secs;
                changed = true;
            }
        }
        if let Some(secs) = patch.showcase_time_per_drawing {
            if (MIN_SHOWCASE_SECS..=MAX_SHOWCASE_SECS).contains(&secs)
                && secs != self.showcase_time_per_drawing
            {
                self.showcase_time_per_drawing = secs;
                changed = true;
            }
        }
        if let Some(allow) = patch.allow_spectators {
            if allow != self.allow_spectators {
                self.allow_spectators = allow;
                changed = true;
            }
        }
        if let Some(private) = patch.private_lobby {
            if private != self.private_lobby {
                self.private_lobby = private;
                changed = true;
            }
        }
        if let Some(password) = &patch.lobby_password {
            let new_password = if password.is_empty() {
                None
            } else {
                Some(password.clone())
            };
            if new_password != self.lobby_password {
                self.lobby_password = new_password;
                changed = true;
            }
        }
        if let Some(prompts) = &patch.custom_prompts {
            if *prompts != self.custom_prompts {
                self.custom_prompts = prompts.clone();
                changed = true;
            }
        }
        if let Some(enable) = patch.enable_chat {
            if enable != self.enable_chat {
                self.enable_chat = enable;
                changed = true;
            }
        }
        if let Some(auto) = patch.auto_start_when_ready {
            if auto != self.auto_start_when_ready {
                self.auto_start_when_ready = auto;
                changed = true;
            }
        }
        if let Some(wta) = patch.winner_takes_all {
            if wta != self.winner_takes_all {
                self.winner_takes_all = wta;
                changed = true;
            }
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_never_exposes_the_password() {
        let settings = LobbySettings {
            lobby_password: Some("hunter2".to_string()),
            private_lobby: true,
            ..LobbySettings::default()
        };
        let view = settings.view();
        assert!(view.has_password);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn patch_applies_in_range_fields() {
        let mut settings = LobbySettings::default();
        let patch = SettingsPatch {
            max_players: Some(8),
            drawing_time: Some(120),
            winner_takes_all: Some(true),
            ..SettingsPatch::default()
        };
        assert!(settings.apply_patch(&patch, 2).unwrap());
        assert_eq!(settings.max_players, 8);
        assert_eq!(settings.drawing_time, 120);
        assert!(settings.winner_takes_all);
    }

    #[test]
    fn out_of_range_fields_are_skipped_silently_not_rejected() {
        let mut settings = LobbySettings::default();
        let patch = SettingsPatch {
            drawing_time: Some(9),
            voting_time: Some(120),
            ..SettingsPatch::default()
        };
        // drawing_time = 9 is below the floor and must be ignored, while the
        // in-range voting_time in the same patch still applies.
        assert!(settings.apply_patch(&patch, 2).unwrap());
        assert_eq!(settings.drawing_time, 300);
        assert_eq!(settings.voting_time, 120);
    }

    #[test]
    fn drawing_time_boundary_is_inclusive_at_ten() {
        let mut settings = LobbySettings::default();
        let patch = SettingsPatch {
            drawing_time: Some(10),
            ..SettingsPatch::default()
        };
        assert!(settings.apply_patch(&patch, 2).unwrap());
        assert_eq!(settings.drawing_time, 10);
    }

    #[test]
    fn max_below_current_count_rejects_whole_patch() {
        let mut settings = LobbySettings::default();
        let patch = SettingsPatch {
            max_players: Some(2),
            voting_time: Some(90),
            ..SettingsPatch::default()
        };
        let err = settings.apply_patch(&patch, 3).unwrap_err();
        assert_eq!(err, LobbyError::MaxBelowCurrentCount(3));
        // Nothing from the rejected patch may stick.
        assert_eq!(settings.voting_time, 60);
    }

    #[test]
    fn min_above_max_rejects_whole_patch() {
        let mut settings = LobbySettings::default();
        let patch = SettingsPatch {
            min_players: Some(10),
            ..SettingsPatch::default()
        };
        assert_eq!(
            settings.apply_patch(&patch, 2).unwrap_err(),
            LobbyError::MinAboveMax
        );
    }

    #[test]
    fn min_is_checked_against_the_incoming_max() {
        let mut settings = LobbySettings::default();
        let patch = SettingsPatch {
            max_players: Some(10),
            min_players: Some(6),
            ..SettingsPatch::default()
        };
        assert!(settings.apply_patch(&patch, 2).unwrap());
        assert_eq!(settings.max_players, 10);
        assert_eq!(settings.min_players, 6);
    }

    #[test]
    fn empty_password_clears_it() {
        let mut settings = LobbySettings {
            lobby_password: Some("secret".to_string()),
            ..LobbySettings::default()
        };
        let patch = SettingsPatch {
            lobby_password: Some(String::new()),
            ..SettingsPatch::default()
        };
        assert!(settings.apply_patch(&patch, 2).unwrap());
        assert!(!settings.has_password());
    }

    #[test]
    fn identical_patch_reports_no_change() {
        let mut settings = LobbySettings::default();
        let patch = SettingsPatch {
            voting_time: Some(settings.voting_time),
            ..SettingsPatch::default()
        };
        assert!(!settings.apply_patch(&patch, 2).unwrap());
    }

    proptest::proptest! {
        #[test]
        fn drawing_time_applies_iff_within_bounds(secs in 0u64..400_000) {
            let mut settings = LobbySettings::default();
            let patch = SettingsPatch {
                drawing_time: Some(secs),
                ..SettingsPatch::default()
            };
            let changed = settings.apply_patch(&patch, 2).unwrap();
            let in_range = (MIN_PHASE_SECS..=MAX_DRAWING_SECS).contains(&secs);
            proptest::prop_assert_eq!(changed, in_range && secs != 300);
            proptest::prop_assert_eq!(
                settings.drawing_time,
                if in_range { secs } else { 300 }
            );
        }

        #[test]
        fn max_players_never_escapes_its_bounds(max in 0u8..=u8::MAX) {
            let mut settings = LobbySettings::default();
            let patch = SettingsPatch {
                max_players: Some(max),
                ..SettingsPatch::default()
            };
            let _ = settings.apply_patch(&patch, 0).unwrap();
            proptest::prop_assert!(
                (MIN_PLAYERS_FLOOR..=MAX_PLAYERS_CEILING).contains(&settings.max_players)
            );
        }
    }
}
