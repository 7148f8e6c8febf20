use std::collections::HashMap;
use std::time::Instant;

use crate::protocol::{
    CurrentVotingDrawing, DrawingSnapshot, GameStatus, LobbySnapshot, PlayerSnapshot,
    SpectatorSnapshot,
};

use super::state::{DrawingEntry, Lobby};

impl Lobby {
    /// Build the complete snapshot carried by `lobby_joined` and
    /// `lobby_update` frames. Phase-gated sections are emitted empty outside
    /// their phase; the password never appears.
    pub fn snapshot(&self, now: Instant) -> LobbySnapshot {
        let theme_voting = self.status == GameStatus::ThemeVoting;
        let voting = self.status == GameStatus::VotingForDrawings;
        let results_visible = matches!(
            self.status,
            GameStatus::VotingForDrawings | GameStatus::ShowcasingResults | GameStatus::Ended
        );
        let showcasing = matches!(self.status, GameStatus::ShowcasingResults | GameStatus::Ended);

        let players = self
            .players
            .iter()
            .map(|p| {
                (
                    p.id,
                    PlayerSnapshot {
                        player_id: p.id,
                        display_name: p.display_name.clone(),
                        is_ready: p.is_ready,
                        is_host: self.host_id == Some(p.id),
                        score: p.score,
                        has_submitted_drawing: p.drawing_id.is_some(),
                    },
                )
            })
            .collect();

        let spectators = self
            .spectators
            .iter()
            .map(|s| {
                (
                    s.id,
                    SpectatorSnapshot {
                        player_id: s.id,
                        display_name: s.display_name.clone(),
                    },
                )
            })
            .collect();

        let drawings = if results_visible {
            self.drawings
                .iter()
                .map(|d| (d.id, self.drawing_snapshot(d)))
                .collect()
        } else {
            HashMap::new()
        };

        let results = if showcasing {
            // Already in descending vote order since the showcase began.
            self.drawings
                .iter()
                .map(|d| self.drawing_snapshot(d))
                .collect()
        } else {
            Vec::new()
        };

        let current_voting_drawing = self.current_voting_drawing().map(|d| {
            let mut current_voters: Vec<_> = d.live_voters.iter().copied().collect();
            current_voters.sort_unstable();
            CurrentVotingDrawing {
                drawing_id: d.id,
                player_id: d.author_id,
                player_name: self.author_name(d),
                data: d.data.clone(),
                prompt: d.prompt.clone(),
                votes: d.votes,
                current_voters,
            }
        });

        LobbySnapshot {
            id: self.id,
            host_id: self.host_id,
            players,
            spectators,
            settings: self.settings.view(),
            game_status: self.status,
            phase_time_remaining: self
                .phase_deadline
                .map(|d| d.saturating_duration_since(now).as_secs())
                .unwrap_or(0),
            prompt: self.prompt.clone(),
            color_theme: self.color_theme.clone(),
            color_theme_options: if theme_voting {
                self.rules.color_themes.clone()
            } else {
                Vec::new()
            },
            color_theme_votes: if theme_voting {
                self.theme_tally.clone()
            } else {
                HashMap::new()
            },
            theme_votes: if theme_voting {
                self.players
                    .iter()
                    .filter_map(|p| p.theme_vote.clone().map(|theme| (p.id, theme)))
                    .collect()
            } else {
                HashMap::new()
            },
            drawings,
            drawing_votes: self
                .players
                .iter()
                .filter_map(|p| p.drawing_vote.map(|target| (p.id, target)))
                .collect(),
            results,
            current_voting_drawing,
            current_voting_drawing_index: voting.then_some(self.voting_index),
            voting_display_time_remaining: if voting {
                self.voting_display_deadline
                    .map(|d| d.saturating_duration_since(now).as_secs())
                    .unwrap_or(0)
            } else {
                0
            },
            showcase_index: (self.status == GameStatus::ShowcasingResults)
                .then_some(self.showcase_index),
            created_at: self.created_at,
        }
    }

    fn drawing_snapshot(&self, drawing: &DrawingEntry) -> DrawingSnapshot {
        DrawingSnapshot {
            id: drawing.id,
            player_id: drawing.author_id,
            player_name: self.author_name(drawing),
            data: drawing.data.clone(),
            prompt: drawing.prompt.clone(),
            votes: drawing.votes,
        }
    }

    fn author_name(&self, drawing: &DrawingEntry) -> String {
        self.player(drawing.author_id)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}
