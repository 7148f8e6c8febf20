use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use tokio::time::MissedTickBehavior;

use crate::protocol::LobbyId;

use super::GameServer;

impl GameServer {
    /// Make sure a ticker task is driving this lobby's deadlines. Idempotent:
    /// a live ticker is left alone, a finished one is replaced. The ticker
    /// re-reads the lobby's deadlines every second, so re-arming a phase
    /// never leaves a stale timer firing into a newer phase.
    pub(crate) fn ensure_phase_ticker(&self, lobby_id: LobbyId) {
        let Some(server) = self.self_ref.upgrade() else {
            return;
        };
        match self.phase_tickers.entry(lobby_id) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_finished() {
                    *entry.get_mut() = tokio::spawn(server.run_phase_ticker(lobby_id));
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(tokio::spawn(server.run_phase_ticker(lobby_id)));
            }
        }
    }

    /// Cancel the ticker outright (lobby removed). A tick scheduled for a
    /// lobby that no longer exists is a no-op either way.
    pub(crate) fn stop_phase_ticker(&self, lobby_id: &LobbyId) {
        if let Some((_, handle)) = self.phase_tickers.remove(lobby_id) {
            handle.abort();
        }
    }

    /// 1 Hz loop: lock the lobby, apply one tick, broadcast outside the lock.
    /// Exits once the lobby is gone or carries no deadline.
    async fn run_phase_ticker(self: Arc<Self>, lobby_id: LobbyId) {
        tracing::debug!(%lobby_id, "Phase ticker started");
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a fresh interval completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;

            let Some(handle) = self.lobby_registry.get(&lobby_id) else {
                break;
            };
            let (effects, still_active) = {
                let mut lobby = handle.lock().await;
                let mut rng = rand::rng();
                let effects = lobby.on_tick(Instant::now(), &mut rng);
                (effects, lobby.has_active_deadline())
            };

            if effects.broadcast {
                self.broadcast_lobby_update(lobby_id).await;
            }
            if effects.lobby_list_changed {
                self.broadcast_lobby_list().await;
            }
            if !still_active {
                break;
            }
        }
        tracing::debug!(%lobby_id, "Phase ticker stopped");
    }
}
