// ═══════════════════════════════════════════════════════════════════════
// Core types — players, holdings, cards, and the full game state
// ═══════════════════════════════════════════════════════════════════════

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

// ── Identifiers ────────────────────────────────────────────────────────
// Compact, copyable ids. HoldingId indexes the static HOLDINGS table,
// PlayerId and CardId index the per-game players / card catalogue vecs.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct HoldingId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PlayerId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CardId(pub u16);

// ── Geography ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum County {
    X,
    U,
    V,
    Q,
}

impl County {
    pub const ALL: [County; 4] = [County::X, County::U, County::V, County::Q];

    /// The duchy this county belongs to.
    pub const fn duchy(self) -> Duchy {
        match self {
            County::X | County::U => Duchy::XU,
            County::Q | County::V => Duchy::QV,
        }
    }
}

impl std::fmt::Display for County {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            County::X => write!(f, "X"),
            County::U => write!(f, "U"),
            County::V => write!(f, "V"),
            County::Q => write!(f, "Q"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duchy {
    XU,
    QV,
}

impl Duchy {
    pub const ALL: [Duchy; 2] = [Duchy::XU, Duchy::QV];

    pub const fn counties(self) -> [County; 2] {
        match self {
            Duchy::XU => [County::X, County::U],
            Duchy::QV => [County::Q, County::V],
        }
    }

    pub const fn opposite(self) -> Duchy {
        match self {
            Duchy::XU => Duchy::QV,
            Duchy::QV => Duchy::XU,
        }
    }
}

impl std::fmt::Display for Duchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Duchy::XU => write!(f, "XU"),
            Duchy::QV => write!(f, "QV"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldingKind {
    Town,
    CountyCastle,
    DuchyCastle,
    KingCastle,
}

impl HoldingKind {
    pub fn is_castle(self) -> bool {
        self != HoldingKind::Town
    }
}

// ── Titles ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Title {
    Baron,
    Count,
    Duke,
    King,
}

impl Title {
    /// Numeric tier, used for winner tie-breaking.
    pub fn tier(self) -> u8 {
        match self {
            Title::Baron => 0,
            Title::Count => 1,
            Title::Duke => 2,
            Title::King => 3,
        }
    }

    /// Soldier ceiling granted by this title.
    pub fn army_cap(self) -> u32 {
        match self {
            Title::Baron => 500,
            Title::Count => 800,
            Title::Duke => 1200,
            Title::King => 2000,
        }
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Title::Baron => write!(f, "Baron"),
            Title::Count => write!(f, "Count"),
            Title::Duke => write!(f, "Duke"),
            Title::King => write!(f, "King"),
        }
    }
}

// ── Controller ─────────────────────────────────────────────────────────
// Human seats answer battles asynchronously (pending combat); machine
// seats resolve them in-line with the commitment heuristic.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Machine,
}

impl Controller {
    pub fn is_human(self) -> bool {
        self == Controller::Human
    }
}

// ── Phases ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Income,
    PlayerTurn,
    Combat,
    Upkeep,
    GameOver,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Setup => write!(f, "setup"),
            Phase::Income => write!(f, "income"),
            Phase::PlayerTurn => write!(f, "player_turn"),
            Phase::Combat => write!(f, "combat"),
            Phase::Upkeep => write!(f, "upkeep"),
            Phase::GameOver => write!(f, "game_over"),
        }
    }
}

// ── Cards ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    PersonalEvent,
    GlobalEvent,
    Bonus,
    Claim,
}

impl CardKind {
    /// Event cards resolve the moment they are drawn.
    pub fn is_instant(self) -> bool {
        matches!(self, CardKind::PersonalEvent | CardKind::GlobalEvent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardEffect {
    GoldChest(u32),
    Raiders,
    Crusade,
    BigWar,
    Adventurer,
    Excalibur,
    PoisonedArrows,
    ForbidMercenaries,
    TalentedCommander,
    VassalRevolt,
    EnforcePeace,
    Duel,
    Spy,
    CountyClaim(County),
    UltimateClaim,
    DuchyClaim,
}

impl CardEffect {
    /// One-shot effects consumed by a single battle.
    pub fn is_battle_modifier(self) -> bool {
        matches!(
            self,
            CardEffect::Excalibur
                | CardEffect::PoisonedArrows
                | CardEffect::TalentedCommander
                | CardEffect::Duel
        )
    }

    pub fn is_claim(self) -> bool {
        matches!(
            self,
            CardEffect::CountyClaim(_) | CardEffect::UltimateClaim | CardEffect::DuchyClaim
        )
    }
}

// ── Holding (dynamic board state) ──────────────────────────────────────

/// Per-holding state that changes during a game. Static properties
/// (yields, modifiers, adjacency) live in the board table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub id: HoldingId,
    pub owner: Option<PlayerId>,
    /// Fortifications on this holding per player, indexed by PlayerId.
    pub forts_by_player: Vec<u8>,
}

impl Holding {
    pub fn fortification_count(&self) -> u8 {
        self.forts_by_player.iter().sum()
    }

    pub fn forts_of(&self, player: PlayerId) -> u8 {
        self.forts_by_player[player.0 as usize]
    }
}

// ── Player ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub controller: Controller,
    pub gold: u32,
    /// Always a multiple of 100.
    pub soldiers: u32,
    pub title: Title,
    pub counties: Vec<County>,
    pub duchies: Vec<Duchy>,
    pub is_king: bool,
    pub holdings: Vec<HoldingId>,
    pub hand: Vec<CardId>,
    /// Accumulated prestige awards (king survival bonuses). The derived
    /// part from holdings and titles is recomputed on demand.
    pub prestige: u32,
    /// Fortifications this player currently has on the board. Relocation
    /// leaves it unchanged; capture strips give the counter back.
    pub fortifications_placed: u8,
    /// Explicit claims held, by target holding.
    pub claims: Vec<HoldingId>,
    /// One-shot effects armed for an upcoming battle this turn.
    pub active_effects: Vec<CardEffect>,
    /// Big War: doubled army cap until this player's next war.
    pub big_war: bool,
}

impl Player {
    pub fn army_cap(&self) -> u32 {
        let base = self.title.army_cap();
        if self.big_war {
            base * 2
        } else {
            base
        }
    }

    pub fn has_effect(&self, effect: CardEffect) -> bool {
        self.active_effects.contains(&effect)
    }

    pub fn has_claim_on(&self, holding: HoldingId) -> bool {
        self.claims.contains(&holding)
    }
}

// ── Pending combat ─────────────────────────────────────────────────────

/// A battle waiting for a human defender's commitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCombat {
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub target: HoldingId,
    pub source: Option<HoldingId>,
    pub attacker_soldiers: u32,
    pub attacker_cards: Vec<CardId>,
}

// ── Combat report ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatReport {
    pub attacker: PlayerId,
    pub defender: Option<PlayerId>,
    pub target: HoldingId,
    pub attacker_committed: u32,
    pub defender_committed: u32,
    pub attacker_roll: u8,
    pub defender_roll: u8,
    pub attacker_strength: i32,
    pub defender_strength: i32,
    pub attacker_won: bool,
    pub attacker_losses: u32,
    pub defender_losses: u32,
    pub holding_captured: bool,
}

// ── Game state ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub round: u32,
    pub phase: Phase,
    pub current_player_idx: usize,

    pub players: Vec<Player>,
    /// Dynamic holding state, indexed by HoldingId.
    pub holdings: Vec<Holding>,

    /// Card catalogue for this game, indexed by CardId.
    pub catalogue: Vec<CardEffect>,
    /// Draw pile, top of the deck at the back.
    pub deck: Vec<CardId>,
    pub discard: Vec<CardId>,

    // Per-turn flags
    pub card_drawn_this_turn: bool,
    pub war_fought_this_turn: bool,

    // Global effects, cleared when the next income phase begins
    pub forbid_mercenaries: bool,
    pub enforce_peace: bool,

    pub pending_combat: Option<PendingCombat>,

    pub victory_threshold: u32,
    pub hand_limit: usize,

    // Deterministic RNG
    pub seed: u64,
    pub rng_counter: u64,

    pub action_log: Vec<String>,
    pub combat_log: Vec<CombatReport>,
}

impl GameState {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by id.
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.0 as usize]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.0 as usize]
    }

    /// Get dynamic holding state by id.
    pub fn holding(&self, id: HoldingId) -> &Holding {
        &self.holdings[id.0 as usize]
    }

    pub fn holding_mut(&mut self, id: HoldingId) -> &mut Holding {
        &mut self.holdings[id.0 as usize]
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_idx]
    }

    pub fn current_player_id(&self) -> PlayerId {
        self.players[self.current_player_idx].id
    }

    pub fn card_effect(&self, id: CardId) -> CardEffect {
        self.catalogue[id.0 as usize]
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Derive a fresh RNG stream from the game seed. Each call advances
    /// the counter so replays from a serialized state stay identical.
    pub fn next_rng(&mut self) -> ChaCha8Rng {
        self.rng_counter += 1;
        ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(self.rng_counter.wrapping_mul(999_961)))
    }

    pub fn log(&mut self, line: String) {
        self.action_log.push(line);
    }
}

/// Round a soldier count to the nearest multiple of 100.
pub fn round_to_hundred(soldiers: u32) -> u32 {
    (soldiers + 50) / 100 * 100
}
