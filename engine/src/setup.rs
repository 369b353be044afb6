// ═══════════════════════════════════════════════════════════════════════
// Game setup — creates the initial GameState, seats players on their
// starting towns, and hands off to the first income phase.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::{self, TOWNS};
use crate::cards::{build_catalogue, shuffled_deck, DeckSpec};
use crate::engine;
use crate::types::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PLAYERS: usize = 4;
pub const MAX_PLAYERS: usize = 6;

const PLAYER_COLORS: [&str; MAX_PLAYERS] = [
    "#8b0000", "#00008b", "#006400", "#4b0082", "#8b4513", "#2f4f4f",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("the game seats 4 to 6 players, got {0}")]
    PlayerCount(usize),
    #[error("the game is past the setup phase")]
    NotInSetup,
    #[error("starting holdings must be towns")]
    NotATown,
    #[error("that town is already taken")]
    TownTaken,
    #[error("player already has a starting town")]
    AlreadyAssigned,
    #[error("no open towns are left")]
    NoTownsLeft,
    #[error("{0} has no starting town")]
    MissingStartingTown(String),
}

/// One seat at the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub name: String,
    pub controller: Controller,
}

impl PlayerSpec {
    pub fn human(name: &str) -> Self {
        Self {
            name: name.to_string(),
            controller: Controller::Human,
        }
    }

    pub fn machine(name: &str) -> Self {
        Self {
            name: name.to_string(),
            controller: Controller::Machine,
        }
    }
}

/// Table rules. The defaults are the standard game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub victory_threshold: u32,
    pub hand_limit: usize,
    pub deck: DeckSpec,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            victory_threshold: 18,
            hand_limit: 7,
            deck: DeckSpec::standard(),
        }
    }
}

/// Create a game in the setup phase. The seed drives the deck shuffle
/// and every later dice roll, so equal seeds replay identically.
pub fn create_game(
    specs: &[PlayerSpec],
    seed: u64,
    config: &GameConfig,
) -> Result<GameState, SetupError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&specs.len()) {
        return Err(SetupError::PlayerCount(specs.len()));
    }

    let catalogue = build_catalogue(&config.deck);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let deck = shuffled_deck(catalogue.len(), &mut rng);

    let players: Vec<Player> = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| Player {
            id: PlayerId(i as u8),
            name: spec.name.clone(),
            color: PLAYER_COLORS[i].to_string(),
            controller: spec.controller,
            gold: 0,
            soldiers: 0,
            title: Title::Baron,
            counties: Vec::new(),
            duchies: Vec::new(),
            is_king: false,
            holdings: Vec::new(),
            hand: Vec::new(),
            prestige: 0,
            fortifications_placed: 0,
            claims: Vec::new(),
            active_effects: Vec::new(),
            big_war: false,
        })
        .collect();

    let holdings: Vec<Holding> = (0..board::NUM_HOLDINGS)
        .map(|i| Holding {
            id: HoldingId(i as u8),
            owner: None,
            forts_by_player: vec![0; specs.len()],
        })
        .collect();

    Ok(GameState {
        round: 1,
        phase: Phase::Setup,
        current_player_idx: 0,
        players,
        holdings,
        catalogue,
        deck,
        discard: Vec::new(),
        card_drawn_this_turn: false,
        war_fought_this_turn: false,
        forbid_mercenaries: false,
        enforce_peace: false,
        pending_combat: None,
        victory_threshold: config.victory_threshold,
        hand_limit: config.hand_limit,
        seed,
        rng_counter: 0,
        action_log: Vec::new(),
        combat_log: Vec::new(),
    })
}

/// Towns still open for a starting pick.
pub fn available_starting_towns(state: &GameState) -> Vec<HoldingId> {
    TOWNS
        .iter()
        .copied()
        .filter(|&t| state.holding(t).owner.is_none())
        .collect()
}

/// Seat one player on an open town.
pub fn assign_starting_town(
    state: &mut GameState,
    player: PlayerId,
    town: HoldingId,
) -> Result<(), SetupError> {
    if state.phase != Phase::Setup {
        return Err(SetupError::NotInSetup);
    }
    if board::holding_def(town).kind != HoldingKind::Town {
        return Err(SetupError::NotATown);
    }
    if state.holding(town).owner.is_some() {
        return Err(SetupError::TownTaken);
    }
    if !state.player(player).holdings.is_empty() {
        return Err(SetupError::AlreadyAssigned);
    }

    state.holding_mut(town).owner = Some(player);
    state.player_mut(player).holdings.push(town);
    state.log(format!(
        "{} takes {} as their seat",
        state.player(player).name,
        board::holding_name(town)
    ));
    Ok(())
}

/// Deal random towns to every player still without a seat.
pub fn auto_assign_starting_towns(state: &mut GameState) -> Result<(), SetupError> {
    if state.phase != Phase::Setup {
        return Err(SetupError::NotInSetup);
    }
    let mut open = available_starting_towns(state);
    let mut rng = state.next_rng();
    open.shuffle(&mut rng);

    let unseated: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|p| p.holdings.is_empty())
        .map(|p| p.id)
        .collect();
    for pid in unseated {
        let town = open.pop().ok_or(SetupError::NoTownsLeft)?;
        assign_starting_town(state, pid, town)?;
    }
    Ok(())
}

/// Leave setup: every player must be seated. Runs the first income
/// phase and opens the first player's turn.
pub fn start_game(state: &mut GameState) -> Result<(), SetupError> {
    if state.phase != Phase::Setup {
        return Err(SetupError::NotInSetup);
    }
    for p in &state.players {
        if p.holdings.is_empty() {
            return Err(SetupError::MissingStartingTown(p.name.clone()));
        }
    }
    state.phase = Phase::Income;
    engine::begin_income(state);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{QUINDARA, XANDORIA, XU_CASTLE};

    fn four_specs() -> Vec<PlayerSpec> {
        ["Aldric", "Beatrix", "Cedric", "Daria"]
            .iter()
            .map(|n| PlayerSpec::machine(n))
            .collect()
    }

    #[test]
    fn create_rejects_bad_player_counts() {
        let cfg = GameConfig::default();
        let few: Vec<PlayerSpec> = four_specs().into_iter().take(3).collect();
        assert_eq!(
            create_game(&few, 1, &cfg).unwrap_err(),
            SetupError::PlayerCount(3)
        );
        let many: Vec<PlayerSpec> = (0..7)
            .map(|i| PlayerSpec::machine(&format!("p{i}")))
            .collect();
        assert_eq!(
            create_game(&many, 1, &cfg).unwrap_err(),
            SetupError::PlayerCount(7)
        );
    }

    #[test]
    fn players_start_with_nothing() {
        let state = create_game(&four_specs(), 3, &GameConfig::default()).unwrap();
        assert_eq!(state.phase, Phase::Setup);
        assert_eq!(state.round, 1);
        for p in &state.players {
            assert_eq!(p.gold, 0);
            assert_eq!(p.soldiers, 0);
            assert_eq!(p.title, Title::Baron);
            assert!(p.hand.is_empty());
            assert!(p.holdings.is_empty());
        }
        assert_eq!(state.deck.len(), 88);
        assert!(state.discard.is_empty());
    }

    #[test]
    fn starting_towns_must_be_open_towns() {
        let mut state = create_game(&four_specs(), 3, &GameConfig::default()).unwrap();
        assert_eq!(
            assign_starting_town(&mut state, PlayerId(0), XU_CASTLE).unwrap_err(),
            SetupError::NotATown
        );
        assign_starting_town(&mut state, PlayerId(0), XANDORIA).unwrap();
        assert_eq!(
            assign_starting_town(&mut state, PlayerId(1), XANDORIA).unwrap_err(),
            SetupError::TownTaken
        );
        assert_eq!(
            assign_starting_town(&mut state, PlayerId(0), QUINDARA).unwrap_err(),
            SetupError::AlreadyAssigned
        );
    }

    #[test]
    fn auto_assign_seats_everyone_distinctly() {
        let mut state = create_game(&four_specs(), 9, &GameConfig::default()).unwrap();
        auto_assign_starting_towns(&mut state).unwrap();
        let mut seats: Vec<HoldingId> = state
            .players
            .iter()
            .map(|p| p.holdings[0])
            .collect();
        seats.sort();
        seats.dedup();
        assert_eq!(seats.len(), 4);
        assert_eq!(available_starting_towns(&state).len(), 8);
    }

    #[test]
    fn auto_assign_is_seed_deterministic() {
        let make = |seed| {
            let mut s = create_game(&four_specs(), seed, &GameConfig::default()).unwrap();
            auto_assign_starting_towns(&mut s).unwrap();
            s.players.iter().map(|p| p.holdings[0]).collect::<Vec<_>>()
        };
        assert_eq!(make(77), make(77));
    }

    #[test]
    fn start_requires_every_seat_filled() {
        let mut state = create_game(&four_specs(), 3, &GameConfig::default()).unwrap();
        assign_starting_town(&mut state, PlayerId(0), XANDORIA).unwrap();
        match start_game(&mut state) {
            Err(SetupError::MissingStartingTown(name)) => assert_eq!(name, "Beatrix"),
            other => panic!("expected missing starting town, got {other:?}"),
        }
        assert_eq!(state.phase, Phase::Setup);

        auto_assign_starting_towns(&mut state).unwrap();
        start_game(&mut state).unwrap();
        assert_eq!(state.phase, Phase::PlayerTurn);
        assert!(start_game(&mut state).is_err());
    }
}
