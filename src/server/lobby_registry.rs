use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::lobby::Lobby;
use crate::protocol::{LobbyId, LobbySummary};

/// Process-wide mapping from lobby identifier to its live state.
///
/// Each lobby sits behind its own `Mutex`, which is the lobby's serialisation
/// point: every mutation — inbound action or timer tick — runs to completion
/// while holding it, and no I/O happens under it.
pub(crate) struct LobbyRegistry {
    lobbies: DashMap<LobbyId, Arc<Mutex<Lobby>>>,
}

impl LobbyRegistry {
    pub fn new() -> Self {
        Self {
            lobbies: DashMap::new(),
        }
    }

    pub fn insert(&self, lobby: Lobby) -> Arc<Mutex<Lobby>> {
        let id = lobby.id;
        let handle = Arc::new(Mutex::new(lobby));
        self.lobbies.insert(id, handle.clone());
        handle
    }

    pub fn get(&self, id: &LobbyId) -> Option<Arc<Mutex<Lobby>>> {
        self.lobbies.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &LobbyId) -> Option<Arc<Mutex<Lobby>>> {
        self.lobbies.remove(id).map(|(_, handle)| handle)
    }

    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    /// Summaries of every lobby still waiting for players.
    ///
    /// Handles are collected first and each lobby locked briefly afterwards,
    /// so every summary reflects one consistent point in that lobby's order
    /// and the map iteration never holds a lobby lock.
    pub async fn joinable_summaries(&self) -> Vec<LobbySummary> {
        let handles: Vec<Arc<Mutex<Lobby>>> = self
            .lobbies
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let mut summaries = Vec::new();
        for handle in handles {
            let lobby = handle.lock().await;
            if lobby.joinable() {
                summaries.push(lobby.summary());
            }
        }
        summaries
    }
}
