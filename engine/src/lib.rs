pub mod actions;
pub mod board;
pub mod cards;
pub mod combat;
pub mod economy;
pub mod engine;
pub mod setup;
pub mod titles;
pub mod types;

pub use actions::{valid_actions, Action, ActionOutcome, IntegrityError, RuleViolation};
pub use engine::{perform_action, standings, winner};
pub use setup::{GameConfig, PlayerSpec};
pub use types::*;

#[cfg(test)]
mod tests;
