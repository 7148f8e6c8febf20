use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use rand::seq::IndexedRandom;
use rand::Rng;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::protocol::{DrawingId, GameStatus, LobbyId, LobbySummary, PlayerId};

use super::error::LobbyError;
use super::settings::LobbySettings;

/// Extra slack added to the voting-phase backstop deadline on top of the
/// per-drawing display windows.
const VOTING_PHASE_BUFFER_SECS: u64 = 30;

/// A participant of a lobby.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub is_ready: bool,
    pub is_host: bool,
    pub score: i64,
    pub theme_vote: Option<String>,
    pub drawing_vote: Option<DrawingId>,
    pub drawing_id: Option<DrawingId>,
}

impl Player {
    pub fn new(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            is_ready: false,
            is_host: false,
            score: 0,
            theme_vote: None,
            drawing_vote: None,
            drawing_id: None,
        }
    }
}

/// A submitted drawing. The payload is opaque to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingEntry {
    pub id: DrawingId,
    pub author_id: PlayerId,
    pub data: String,
    pub prompt: String,
    pub votes: u32,
    /// Participants whose live vote currently targets this drawing. Only
    /// meaningful during the voting phase.
    pub live_voters: HashSet<PlayerId>,
}

/// What `remove_player` did, so the caller can emit the right frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovalOutcome {
    pub removed: bool,
    pub was_host: bool,
    /// Set when the head of the participant list was promoted to host.
    pub new_host: Option<(PlayerId, String)>,
    pub is_empty: bool,
}

/// Effects a 1 Hz tick had on the lobby.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEffects {
    /// A snapshot broadcast is due this tick (cadence or transition).
    pub broadcast: bool,
    /// The game status changed during this tick.
    pub status_changed: bool,
    /// The joinable-lobby listing changed (lobby re-opened).
    pub lobby_list_changed: bool,
}

/// The per-lobby game state machine.
///
/// Purely synchronous: operations take the current `Instant` where deadlines
/// are involved and a caller-supplied RNG where selection is random, and
/// report refusals as [`LobbyError`] without mutating anything. All I/O —
/// broadcasts, timers, frames — lives with the caller.
#[derive(Debug, Clone)]
pub struct Lobby {
    pub id: LobbyId,
    pub players: Vec<Player>,
    pub spectators: Vec<Player>,
    pub host_id: Option<PlayerId>,
    pub status: GameStatus,
    pub settings: LobbySettings,
    pub rules: GameConfig,
    pub color_theme: Option<String>,
    pub prompt: Option<String>,
    pub phase_deadline: Option<Instant>,
    pub voting_index: usize,
    pub voting_display_deadline: Option<Instant>,
    pub showcase_index: usize,
    pub drawings: Vec<DrawingEntry>,
    pub theme_tally: HashMap<String, u32>,
    pub banned: HashSet<PlayerId>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Lobby {
    pub fn new(id: LobbyId, settings: LobbySettings, rules: GameConfig) -> Self {
        Self {
            id,
            players: Vec::new(),
            spectators: Vec::new(),
            host_id: None,
            status: GameStatus::WaitingForPlayers,
            settings,
            rules,
            color_theme: None,
            prompt: None,
            phase_deadline: None,
            voting_index: 0,
            voting_display_deadline: None,
            showcase_index: 0,
            drawings: Vec::new(),
            theme_tally: HashMap::new(),
            banned: HashSet::new(),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn is_host(&self, id: PlayerId) -> bool {
        self.host_id == Some(id)
    }

    pub fn joinable(&self) -> bool {
        self.status == GameStatus::WaitingForPlayers
    }

    pub fn set_host(&mut self, id: PlayerId) {
        self.host_id = Some(id);
        for player in &mut self.players {
            player.is_host = player.id == id;
        }
    }

    pub fn summary(&self) -> LobbySummary {
        LobbySummary {
            id: self.id,
            host_id: self.host_id,
            player_count: self.players.len(),
            max_players: self.settings.max_players,
            status: self.status,
            created_at: self.created_at,
            private_lobby: self.settings.private_lobby,
            has_password: self.settings.has_password(),
        }
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    pub fn check_join(&self, id: PlayerId) -> Result<(), LobbyError> {
        if self.banned.contains(&id) {
            return Err(LobbyError::Banned);
        }
        if self.players.len() >= usize::from(self.settings.max_players) {
            if self.settings.allow_spectators {
                return Err(LobbyError::FullSpectatorsAllowed);
            }
            return Err(LobbyError::Full);
        }
        if self.status.in_progress() {
            return Err(LobbyError::GameInProgress);
        }
        Ok(())
    }

    /// Add a participant; the first to arrive becomes host.
    pub fn add_player(&mut self, player: Player) -> Result<(), LobbyError> {
        self.check_join(player.id)?;
        let id = player.id;
        self.players.push(player);
        if self.host_id.is_none() {
            self.set_host(id);
        }
        Ok(())
    }

    /// Remove a participant unconditionally, revoking their votes and, while
    /// drawings are still contested, withdrawing their drawing. Promotes the
    /// head of the list when the host leaves.
    pub fn remove_player(&mut self, id: PlayerId) -> RemovalOutcome {
        let Some(position) = self.players.iter().position(|p| p.id == id) else {
            return RemovalOutcome::default();
        };
        let was_host = self.is_host(id);
        let removed = self.players.remove(position);

        if let Some(theme) = &removed.theme_vote {
            if let Some(count) = self.theme_tally.get_mut(theme) {
                *count = count.saturating_sub(1);
            }
        }
        if let Some(target) = removed.drawing_vote {
            if let Some(drawing) = self.drawings.iter_mut().find(|d| d.id == target) {
                drawing.votes = drawing.votes.saturating_sub(1);
                drawing.live_voters.remove(&id);
            }
        }

        if matches!(self.status, GameStatus::Drawing | GameStatus::VotingForDrawings) {
            self.withdraw_drawing_by(id);
        }

        let mut new_host = None;
        if was_host {
            if let Some(next) = self.players.first() {
                let promoted = (next.id, next.display_name.clone());
                self.set_host(promoted.0);
                new_host = Some(promoted);
            } else {
                self.host_id = None;
            }
        }

        RemovalOutcome {
            removed: true,
            was_host,
            new_host,
            is_empty: self.players.is_empty(),
        }
    }

    /// Remove a departing author's drawing and clear every vote that pointed
    /// at it, keeping the voting display index on the same remaining drawing.
    fn withdraw_drawing_by(&mut self, author_id: PlayerId) {
        let Some(position) = self.drawings.iter().position(|d| d.author_id == author_id) else {
            return;
        };
        let withdrawn = self.drawings.remove(position);
        for player in &mut self.players {
            if player.drawing_vote == Some(withdrawn.id) {
                player.drawing_vote = None;
            }
        }
        if self.status == GameStatus::VotingForDrawings && position < self.voting_index {
            self.voting_index -= 1;
        }
    }

    // ------------------------------------------------------------------
    // Waiting room
    // ------------------------------------------------------------------

    /// Toggle readiness. A no-op outside the waiting room; returns whether
    /// the flag actually changed.
    pub fn set_ready(&mut self, id: PlayerId, ready: bool) -> bool {
        if self.status != GameStatus::WaitingForPlayers {
            return false;
        }
        match self.player_mut(id) {
            Some(player) if player.is_ready != ready => {
                player.is_ready = ready;
                true
            }
            _ => false,
        }
    }

    pub fn all_players_ready(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|p| p.is_ready)
    }

    pub fn can_start_game(&self) -> bool {
        self.status == GameStatus::WaitingForPlayers
            && self.players.len() >= usize::from(self.settings.min_players)
            && self.all_players_ready()
    }

    /// Host-initiated game start.
    pub fn start_game(&mut self, caller: PlayerId, now: Instant) -> Result<(), LobbyError> {
        if !self.is_host(caller) {
            return Err(LobbyError::NotHostStart);
        }
        if !self.can_start_game() {
            return Err(LobbyError::NotReadyToStart);
        }
        self.begin_theme_voting(now);
        Ok(())
    }

    pub fn begin_theme_voting(&mut self, now: Instant) {
        self.status = GameStatus::ThemeVoting;
        self.phase_deadline = Some(now + Duration::from_secs(self.settings.theme_voting_time));
        self.theme_tally.clear();
        for player in &mut self.players {
            player.theme_vote = None;
        }
    }

    // ------------------------------------------------------------------
    // Theme voting
    // ------------------------------------------------------------------

    pub fn cast_theme_vote(&mut self, id: PlayerId, theme: &str) -> Result<(), LobbyError> {
        if self.status != GameStatus::ThemeVoting {
            return Err(LobbyError::ThemeVotingInactive);
        }
        if !self.rules.color_themes.iter().any(|t| t == theme) {
            return Err(LobbyError::UnknownTheme);
        }
        let Some(player) = self.player_mut(id) else {
            return Err(LobbyError::PlayerNotFound);
        };
        let previous = player.theme_vote.replace(theme.to_string());
        if let Some(previous) = previous {
            if let Some(count) = self.theme_tally.get_mut(&previous) {
                *count = count.saturating_sub(1);
            }
        }
        *self.theme_tally.entry(theme.to_string()).or_insert(0) += 1;
        Ok(())
    }

    /// Plurality winner; ties and the no-votes case resolve uniformly at
    /// random.
    fn winning_color_theme<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let top = self
            .theme_tally
            .values()
            .copied()
            .filter(|&count| count > 0)
            .max();
        match top {
            Some(top) => {
                let tied: Vec<&String> = self
                    .theme_tally
                    .iter()
                    .filter(|(_, &count)| count == top)
                    .map(|(theme, _)| theme)
                    .collect();
                tied.choose(rng).map(|theme| (*theme).clone())
            }
            None => self.rules.color_themes.choose(rng).cloned(),
        }
    }

    pub fn begin_drawing<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        self.color_theme = self.winning_color_theme(rng);
        let pool: Vec<&String> = self
            .settings
            .custom_prompts
            .iter()
            .chain(self.rules.default_prompts.iter())
            .collect();
        self.prompt = pool.choose(rng).map(|prompt| (*prompt).clone());
        self.status = GameStatus::Drawing;
        self.phase_deadline = Some(now + Duration::from_secs(self.settings.drawing_time));
        self.drawings.clear();
        for player in &mut self.players {
            player.drawing_id = None;
            player.drawing_vote = None;
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Attach a drawing to its author. Returns whether every participant has
    /// now submitted, which triggers the early end of the phase.
    pub fn submit_drawing(&mut self, id: PlayerId, data: String) -> Result<bool, LobbyError> {
        if self.status != GameStatus::Drawing {
            return Err(LobbyError::DrawingInactive);
        }
        let Some(prompt) = self.prompt.clone() else {
            return Err(LobbyError::DrawingInactive);
        };
        let Some(player) = self.player_mut(id) else {
            return Err(LobbyError::PlayerNotFound);
        };
        if player.drawing_id.is_some() {
            return Err(LobbyError::AlreadySubmitted);
        }
        let drawing = DrawingEntry {
            id: Uuid::new_v4(),
            author_id: id,
            data,
            prompt,
            votes: 0,
            live_voters: HashSet::new(),
        };
        player.drawing_id = Some(drawing.id);
        self.drawings.push(drawing);
        Ok(self.all_drawings_submitted())
    }

    pub fn all_drawings_submitted(&self) -> bool {
        !self.drawings.is_empty() && self.players.iter().all(|p| p.drawing_id.is_some())
    }

    pub fn begin_voting(&mut self, now: Instant) {
        self.status = GameStatus::VotingForDrawings;
        self.voting_index = 0;
        let display = Duration::from_secs(self.rules.voting_display_secs);
        self.voting_display_deadline = Some(now + display);
        let backstop = self.rules.voting_display_secs * self.drawings.len() as u64
            + VOTING_PHASE_BUFFER_SECS;
        self.phase_deadline = Some(now + Duration::from_secs(backstop));
        for player in &mut self.players {
            player.drawing_vote = None;
        }
        for drawing in &mut self.drawings {
            drawing.live_voters.clear();
        }
    }

    // ------------------------------------------------------------------
    // Voting
    // ------------------------------------------------------------------

    pub fn current_voting_drawing(&self) -> Option<&DrawingEntry> {
        if self.status != GameStatus::VotingForDrawings {
            return None;
        }
        self.drawings.get(self.voting_index)
    }

    /// Vote for the drawing currently on display. Replacing a vote cast on an
    /// earlier drawing moves the tally with it.
    pub fn cast_drawing_vote(
        &mut self,
        voter: PlayerId,
        drawing_id: DrawingId,
    ) -> Result<(), LobbyError> {
        if self.status != GameStatus::VotingForDrawings {
            return Err(LobbyError::VotingInactive);
        }
        if self.player(voter).is_none() {
            return Err(LobbyError::PlayerNotFound);
        }
        let Some(current) = self.current_voting_drawing() else {
            return Err(LobbyError::NotCurrentDrawing);
        };
        if current.id != drawing_id {
            return Err(LobbyError::NotCurrentDrawing);
        }
        if current.author_id == voter {
            return Err(LobbyError::OwnDrawing);
        }
        let previous = self
            .player(voter)
            .and_then(|p| p.drawing_vote)
            .filter(|&prev| prev != drawing_id);
        if self.player(voter).and_then(|p| p.drawing_vote) == Some(drawing_id) {
            return Err(LobbyError::AlreadyVoted);
        }
        if let Some(previous) = previous {
            if let Some(drawing) = self.drawings.iter_mut().find(|d| d.id == previous) {
                drawing.votes = drawing.votes.saturating_sub(1);
                drawing.live_voters.remove(&voter);
            }
        }
        if let Some(drawing) = self.drawings.iter_mut().find(|d| d.id == drawing_id) {
            drawing.votes += 1;
            drawing.live_voters.insert(voter);
        }
        if let Some(player) = self.player_mut(voter) {
            player.drawing_vote = Some(drawing_id);
        }
        Ok(())
    }

    /// Resolve a vote target given either a drawing id or its author.
    pub fn resolve_vote_target(
        &self,
        drawing_id: Option<DrawingId>,
        author_id: Option<PlayerId>,
    ) -> Result<DrawingId, LobbyError> {
        if let Some(id) = drawing_id {
            return Ok(id);
        }
        if let Some(author) = author_id {
            return self
                .drawings
                .iter()
                .find(|d| d.author_id == author)
                .map(|d| d.id)
                .ok_or(LobbyError::DrawingNotFound);
        }
        Err(LobbyError::DrawingNotFound)
    }

    pub fn begin_showcase(&mut self, now: Instant) {
        self.status = GameStatus::ShowcasingResults;
        self.voting_display_deadline = None;
        self.drawings.sort_by(|a, b| b.votes.cmp(&a.votes));
        self.award_scores();
        self.showcase_index = 0;
        self.phase_deadline =
            Some(now + Duration::from_secs(self.settings.showcase_time_per_drawing));
    }

    /// Each author earns their drawing's tally; with winner-takes-all only
    /// the top-voted drawings (ties included) pay out.
    fn award_scores(&mut self) {
        let top = self.drawings.iter().map(|d| d.votes).max().unwrap_or(0);
        let awards: Vec<(PlayerId, u32)> = self
            .drawings
            .iter()
            .filter(|d| !self.settings.winner_takes_all || d.votes == top)
            .map(|d| (d.author_id, d.votes))
            .collect();
        for (author_id, votes) in awards {
            if let Some(player) = self.player_mut(author_id) {
                player.score += i64::from(votes);
            }
        }
    }

    pub fn end_game(&mut self, now: Instant) {
        self.status = GameStatus::Ended;
        self.voting_display_deadline = None;
        // Results stay visible for one settle interval before the reset.
        self.phase_deadline =
            Some(now + Duration::from_secs(self.settings.showcase_time_per_drawing));
    }

    /// Clear per-round state and reopen the waiting room. Scores persist.
    pub fn reset_for_next_round(&mut self) {
        self.status = GameStatus::WaitingForPlayers;
        self.phase_deadline = None;
        self.voting_display_deadline = None;
        self.voting_index = 0;
        self.showcase_index = 0;
        self.drawings.clear();
        self.theme_tally.clear();
        self.color_theme = None;
        self.prompt = None;
        for player in &mut self.players {
            player.is_ready = false;
            player.theme_vote = None;
            player.drawing_vote = None;
            player.drawing_id = None;
        }
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    pub fn kick_player(
        &mut self,
        host: PlayerId,
        target: PlayerId,
    ) -> Result<(String, RemovalOutcome), LobbyError> {
        if !self.is_host(host) {
            return Err(LobbyError::NotHostKick);
        }
        if target == host {
            return Err(LobbyError::SelfKick);
        }
        let name = self
            .player(target)
            .map(|p| p.display_name.clone())
            .ok_or(LobbyError::PlayerNotFound)?;
        let outcome = self.remove_player(target);
        Ok((name, outcome))
    }

    pub fn ban_player(
        &mut self,
        host: PlayerId,
        target: PlayerId,
    ) -> Result<(String, RemovalOutcome), LobbyError> {
        if !self.is_host(host) {
            return Err(LobbyError::NotHostBan);
        }
        if target == host {
            return Err(LobbyError::SelfBan);
        }
        let name = self
            .player(target)
            .map(|p| p.display_name.clone())
            .ok_or(LobbyError::PlayerNotFound)?;
        let outcome = self.remove_player(target);
        self.banned.insert(target);
        Ok((name, outcome))
    }

    pub fn transfer_host(
        &mut self,
        caller: PlayerId,
        new_host: PlayerId,
    ) -> Result<String, LobbyError> {
        if !self.is_host(caller) {
            return Err(LobbyError::NotHostTransfer);
        }
        let name = self
            .player(new_host)
            .map(|p| p.display_name.clone())
            .ok_or(LobbyError::PlayerNotFound)?;
        self.set_host(new_host);
        Ok(name)
    }

    pub fn update_settings(
        &mut self,
        caller: PlayerId,
        patch: &crate::protocol::SettingsPatch,
    ) -> Result<(), LobbyError> {
        if !self.is_host(caller) {
            return Err(LobbyError::NotHostSettings);
        }
        if self.status != GameStatus::WaitingForPlayers {
            return Err(LobbyError::SettingsLocked);
        }
        let player_count = self.players.len();
        let changed = self.settings.apply_patch(patch, player_count)?;
        if !changed {
            return Err(LobbyError::NoSettingsChanged);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Timer ticks
    // ------------------------------------------------------------------

    /// Advance the lobby by one scheduler tick.
    ///
    /// Handles the auto-advancing voting display, phase-deadline expiry and
    /// the broadcast cadence clients rely on for countdowns.
    pub fn on_tick<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> TickEffects {
        let mut fx = TickEffects::default();

        if self.status == GameStatus::VotingForDrawings {
            if self.voting_index >= self.drawings.len() {
                self.begin_showcase(now);
                fx.status_changed = true;
            } else if self.voting_display_deadline.is_some_and(|d| now >= d) {
                self.voting_index += 1;
                if self.voting_index < self.drawings.len() {
                    self.voting_display_deadline =
                        Some(now + Duration::from_secs(self.rules.voting_display_secs));
                } else {
                    self.begin_showcase(now);
                    fx.status_changed = true;
                }
            }
        }

        if let Some(deadline) = self.phase_deadline {
            if now >= deadline {
                match self.status {
                    GameStatus::ThemeVoting => {
                        self.begin_drawing(now, rng);
                        fx.status_changed = true;
                    }
                    GameStatus::Drawing => {
                        if self.drawings.is_empty() {
                            self.end_game(now);
                        } else {
                            self.begin_voting(now);
                        }
                        fx.status_changed = true;
                    }
                    GameStatus::VotingForDrawings => {
                        self.begin_showcase(now);
                        fx.status_changed = true;
                    }
                    GameStatus::ShowcasingResults => {
                        self.showcase_index += 1;
                        if self.showcase_index >= self.drawings.len() {
                            self.end_game(now);
                            fx.status_changed = true;
                        } else {
                            self.phase_deadline = Some(
                                now + Duration::from_secs(
                                    self.settings.showcase_time_per_drawing,
                                ),
                            );
                            fx.broadcast = true;
                        }
                    }
                    GameStatus::Ended => {
                        self.reset_for_next_round();
                        fx.status_changed = true;
                        fx.lobby_list_changed = true;
                    }
                    GameStatus::WaitingForPlayers => {
                        self.phase_deadline = None;
                    }
                }
            }
        }

        if fx.status_changed {
            fx.broadcast = true;
        } else if let Some(deadline) = self.phase_deadline {
            let remaining = deadline.saturating_duration_since(now).as_secs();
            fx.broadcast |= match self.status {
                GameStatus::ThemeVoting | GameStatus::VotingForDrawings => true,
                _ if remaining == 0 => true,
                _ if remaining <= 30 => remaining % 2 == 0,
                _ => remaining % 5 == 0,
            };
        }

        fx
    }

    /// Whether the scheduler still has anything to drive for this lobby.
    pub fn has_active_deadline(&self) -> bool {
        self.phase_deadline.is_some() || self.voting_display_deadline.is_some()
    }
}
