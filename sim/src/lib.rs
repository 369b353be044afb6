pub mod database;
pub mod session;
pub mod store;

pub use database::SqliteStore;
pub use session::{run_batch, run_game, GameSummary, PlayerSummary, SessionError, SEAT_NAMES};
pub use store::{GameRepository, MemoryStore, StoreError, StoredGame};
