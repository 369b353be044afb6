// ═══════════════════════════════════════════════════════════════════════
// Session — drives complete games between agents, headlessly.
//
// Seats are created human-controlled on purpose: that routes battle
// defences through the pending-combat detour and the defending agent's
// `choose_commitment`, instead of the in-engine heuristic reserved for
// machine seats.
// ═══════════════════════════════════════════════════════════════════════

use kingdom_agents::Agent;
use kingdom_engine::board::holding_def;
use kingdom_engine::economy;
use kingdom_engine::setup::{
    assign_starting_town, available_starting_towns, create_game, start_game, GameConfig,
    PlayerSpec, SetupError, MAX_PLAYERS, MIN_PLAYERS,
};
use kingdom_engine::types::*;
use kingdom_engine::{perform_action, standings, valid_actions, winner, Action, IntegrityError};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{GameRepository, StoreError};

/// Seat names handed out in player order.
pub const SEAT_NAMES: [&str; 6] = ["Aldric", "Beatrix", "Cedric", "Daria", "Edmund", "Fiora"];

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("setup failed: {0}")]
    Setup(#[from] SetupError),
    #[error("integrity failure: {0}")]
    Integrity(#[from] IntegrityError),
    #[error("game stalled after {0} actions")]
    Stalled(u64),
    #[error("storage failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct GameSummary {
    pub seed: u64,
    pub winner: Option<String>,
    pub rounds: u32,
    pub actions: u64,
    pub players: Vec<PlayerSummary>,
}

/// Final standing of one seat, in ranked order.
#[derive(Debug, Clone)]
pub struct PlayerSummary {
    pub name: String,
    pub agent: String,
    pub title: String,
    pub prestige: u32,
    pub gold: u32,
    pub soldiers: u32,
    pub towns: usize,
    pub winner: bool,
}

/// Play one full game, one agent per seat. Returns the final state and
/// the ranked summary, or a session error if the game never finishes
/// within `max_actions`.
pub fn run_game(
    agents: &mut [Box<dyn Agent>],
    seed: u64,
    config: &GameConfig,
    max_actions: u64,
) -> Result<(GameState, GameSummary), SessionError> {
    if agents.len() < MIN_PLAYERS || agents.len() > MAX_PLAYERS {
        return Err(SetupError::PlayerCount(agents.len()).into());
    }
    let specs: Vec<PlayerSpec> = (0..agents.len())
        .map(|i| PlayerSpec::human(SEAT_NAMES[i]))
        .collect();
    let mut state = create_game(&specs, seed, config)?;

    // seat picks in player order
    for (i, agent) in agents.iter_mut().enumerate() {
        let player = PlayerId(i as u8);
        let open = available_starting_towns(&state);
        let town = agent.choose_starting_town(&state, player, &open);
        assign_starting_town(&mut state, player, town)?;
    }
    start_game(&mut state)?;

    let mut actions_taken = 0u64;
    while !state.is_game_over() {
        if actions_taken >= max_actions {
            return Err(SessionError::Stalled(actions_taken));
        }
        actions_taken += 1;

        match state.phase {
            Phase::PlayerTurn => {
                let player = state.current_player_id();
                let choices = valid_actions(&state, player)?;
                let action = agents[player.0 as usize].choose_action(&state, player, &choices);
                let outcome = perform_action(&mut state, &action)?;
                if !outcome.success {
                    warn!(
                        player = %state.player(player).name,
                        reason = %outcome.message,
                        "action rejected"
                    );
                }
            }
            Phase::Combat => {
                let pending = match state.pending_combat.clone() {
                    Some(p) => p,
                    None => return Err(SessionError::Stalled(actions_taken)),
                };
                let defender = pending.defender;
                let soldiers =
                    agents[defender.0 as usize].choose_commitment(&state, defender, &pending);
                let outcome = perform_action(
                    &mut state,
                    &Action::Defend {
                        player: defender,
                        soldiers,
                        cards: Vec::new(),
                    },
                )?;
                if !outcome.success {
                    warn!(
                        player = %state.player(defender).name,
                        reason = %outcome.message,
                        "defence rejected"
                    );
                }
            }
            _ => return Err(SessionError::Stalled(actions_taken)),
        }
    }

    let summary = summarize(&state, agents, seed, actions_taken);
    info!(
        seed = seed,
        rounds = summary.rounds,
        actions = summary.actions,
        winner = summary.winner.as_deref().unwrap_or("-"),
        "game finished"
    );
    Ok((state, summary))
}

fn summarize(
    state: &GameState,
    agents: &[Box<dyn Agent>],
    seed: u64,
    actions: u64,
) -> GameSummary {
    let champion = winner(state);
    let players = standings(state)
        .into_iter()
        .map(|pid| {
            let p = state.player(pid);
            PlayerSummary {
                name: p.name.clone(),
                agent: agents[pid.0 as usize].name().to_string(),
                title: p.title.to_string(),
                prestige: economy::total_prestige(state, pid),
                gold: p.gold,
                soldiers: p.soldiers,
                towns: p
                    .holdings
                    .iter()
                    .filter(|&&h| holding_def(h).is_town())
                    .count(),
                winner: champion == Some(pid),
            }
        })
        .collect();

    GameSummary {
        seed,
        winner: champion.map(|pid| state.player(pid).name.clone()),
        rounds: state.round,
        actions,
        players,
    }
}

/// Run seeded games in parallel and persist each final state under
/// `game-{seed}`. Failed games are logged and skipped, not fatal.
pub fn run_batch<F>(
    repo: &mut dyn GameRepository,
    agent_factory: F,
    games: u64,
    base_seed: u64,
    config: &GameConfig,
    max_actions: u64,
) -> Result<Vec<GameSummary>, SessionError>
where
    F: Fn(u64) -> Vec<Box<dyn Agent>> + Sync,
{
    let results: Vec<(u64, Result<(GameState, GameSummary), SessionError>)> = (0..games)
        .into_par_iter()
        .map(|i| {
            let seed = base_seed.wrapping_add(i);
            let mut agents = agent_factory(seed);
            (seed, run_game(&mut agents, seed, config, max_actions))
        })
        .collect();

    let mut summaries = Vec::with_capacity(results.len());
    for (seed, result) in results {
        match result {
            Ok((state, summary)) => {
                repo.save(&format!("game-{seed}"), &state)?;
                summaries.push(summary);
            }
            Err(err) => warn!(seed = seed, error = %err, "game failed"),
        }
    }
    Ok(summaries)
}
