// ═══════════════════════════════════════════════════════════════════════
// Storage — repository abstraction over saved games.
// ═══════════════════════════════════════════════════════════════════════

use kingdom_engine::types::GameState;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Listing row: enough to print a table without deserializing states.
#[derive(Debug, Clone)]
pub struct StoredGame {
    pub id: String,
    pub round: u32,
    pub phase: String,
    pub players: usize,
}

/// Where finished and in-flight games live.
pub trait GameRepository: Send {
    fn get(&self, id: &str) -> Result<Option<GameState>, StoreError>;
    fn save(&mut self, id: &str, state: &GameState) -> Result<(), StoreError>;
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;
    fn list(&self) -> Result<Vec<StoredGame>, StoreError>;
}

/// HashMap-backed store for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryStore {
    games: HashMap<String, GameState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameRepository for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<GameState>, StoreError> {
        Ok(self.games.get(id).cloned())
    }

    fn save(&mut self, id: &str, state: &GameState) -> Result<(), StoreError> {
        self.games.insert(id.to_string(), state.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self.games.remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<StoredGame>, StoreError> {
        let mut rows: Vec<StoredGame> = self
            .games
            .iter()
            .map(|(id, state)| StoredGame {
                id: id.clone(),
                round: state.round,
                phase: state.phase.to_string(),
                players: state.player_count(),
            })
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }
}
