// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite-backed game repository.
// ═══════════════════════════════════════════════════════════════════════

use crate::store::{GameRepository, StoreError, StoredGame};
use kingdom_engine::types::GameState;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = SqliteStore { conn };
        store.create_schema()?;
        Ok(store)
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteStore { conn };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS games (
                id         TEXT PRIMARY KEY,
                state      TEXT NOT NULL,
                round      INTEGER NOT NULL,
                phase      TEXT NOT NULL,
                players    INTEGER NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        Ok(())
    }
}

impl GameRepository for SqliteStore {
    fn get(&self, id: &str) -> Result<Option<GameState>, StoreError> {
        let json: Option<String> = self
            .conn
            .query_row("SELECT state FROM games WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        match json {
            None => Ok(None),
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
        }
    }

    fn save(&mut self, id: &str, state: &GameState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        self.conn.execute(
            "INSERT INTO games (id, state, round, phase, players, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET
                 state = excluded.state,
                 round = excluded.round,
                 phase = excluded.phase,
                 players = excluded.players,
                 updated_at = excluded.updated_at",
            params![
                id,
                json,
                state.round,
                state.phase.to_string(),
                state.player_count() as i64
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let n = self
            .conn
            .execute("DELETE FROM games WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    fn list(&self) -> Result<Vec<StoredGame>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, round, phase, players FROM games ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredGame {
                id: row.get(0)?,
                round: row.get(1)?,
                phase: row.get(2)?,
                players: row.get::<_, i64>(3)? as usize,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
