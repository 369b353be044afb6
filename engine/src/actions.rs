// ═══════════════════════════════════════════════════════════════════════
// Actions — the wire shapes players submit, the rule-violation and
// integrity error taxonomies, and the exhaustive legal-action generator.
//
// Every action the generator returns is fully parameterized and
// executes successfully on the state it was generated from.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::{self, county_castle, county_towns, duchy_castle, holding_def};
use crate::cards;
use crate::titles;
use crate::types::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FORT_COST: u32 = 10;
pub const CLAIM_TOWN_COST: u32 = 10;
pub const FAKE_CLAIM_COST: u32 = 35;
pub const ADVENTURER_COST: u32 = 25;
pub const MIN_COMMITMENT: u32 = 200;

/// Gold price of a title claim at the given castle tier.
pub fn title_cost(kind: HoldingKind) -> u32 {
    match kind {
        HoldingKind::Town => 0,
        HoldingKind::CountyCastle => 25,
        HoldingKind::DuchyCastle => 50,
        HoldingKind::KingCastle => 75,
    }
}

// ── Actions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Move {
        player: PlayerId,
        source: HoldingId,
        target: HoldingId,
    },
    Recruit {
        player: PlayerId,
    },
    BuildFortification {
        player: PlayerId,
        target: HoldingId,
    },
    RelocateFortification {
        player: PlayerId,
        source: HoldingId,
        target: HoldingId,
    },
    ClaimTitle {
        player: PlayerId,
        target: HoldingId,
    },
    ClaimTown {
        player: PlayerId,
        target: HoldingId,
    },
    FakeClaim {
        player: PlayerId,
        target: HoldingId,
    },
    Attack {
        player: PlayerId,
        target: HoldingId,
        source: Option<HoldingId>,
        soldiers: u32,
        cards: Vec<CardId>,
    },
    Defend {
        player: PlayerId,
        soldiers: u32,
        cards: Vec<CardId>,
    },
    PlayCard {
        player: PlayerId,
        card: CardId,
        target: Option<HoldingId>,
    },
    EndTurn {
        player: PlayerId,
    },
}

impl Action {
    pub fn player(&self) -> PlayerId {
        match *self {
            Action::Move { player, .. }
            | Action::Recruit { player }
            | Action::BuildFortification { player, .. }
            | Action::RelocateFortification { player, .. }
            | Action::ClaimTitle { player, .. }
            | Action::ClaimTown { player, .. }
            | Action::FakeClaim { player, .. }
            | Action::Attack { player, .. }
            | Action::Defend { player, .. }
            | Action::PlayCard { player, .. }
            | Action::EndTurn { player } => player,
        }
    }
}

/// What came of an action. Rule violations land here as
/// `success == false` with the state untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    pub combat: Option<CombatReport>,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            combat: None,
        }
    }

    pub fn with_combat(message: impl Into<String>, report: CombatReport) -> Self {
        Self {
            success: true,
            message: message.into(),
            combat: Some(report),
        }
    }

    pub fn rejected(violation: &RuleViolation) -> Self {
        Self {
            success: false,
            message: violation.to_string(),
            combat: None,
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

/// A rules check that failed. Never fatal: the executor reports these
/// back as rejected outcomes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("action not available in the {0} phase")]
    WrongPhase(Phase),
    #[error("not enough gold (need {0})")]
    NotEnoughGold(u32),
    #[error("not enough soldiers")]
    NotEnoughSoldiers,
    #[error("an army of at least 200 soldiers must march")]
    CommitmentTooSmall,
    #[error("only one war may be fought per turn")]
    WarAlreadyFought,
    #[error("the enforced peace forbids war this turn")]
    PeaceEnforced,
    #[error("mercenaries refuse to sign on this turn")]
    MercenariesForbidden,
    #[error("no holdings to recruit from")]
    NoHoldings,
    #[error("{0} is not yours")]
    NotRuled(&'static str),
    #[error("{0} and {1} are not adjacent")]
    NotAdjacent(&'static str, &'static str),
    #[error("source and target are the same holding")]
    SameHolding,
    #[error("{0} is not a town")]
    NotATown(&'static str),
    #[error("{0} is not a castle")]
    NotACastle(&'static str),
    #[error("{0} already has a ruler")]
    AlreadyRuled(&'static str),
    #[error("{0} is already yours")]
    OwnHolding(&'static str),
    #[error("the requirements for {0} are not met")]
    TitleRequirements(Title),
    #[error("{0} is already claimed")]
    CastleTaken(&'static str),
    #[error("no valid claim on {0}")]
    NoClaim(&'static str),
    #[error("{0} lies inside your own domain")]
    OwnDomain(&'static str),
    #[error("all four fortifications are already placed")]
    FortLimitReached,
    #[error("{0} cannot hold more fortifications")]
    HoldingFortsFull(&'static str),
    #[error("you already keep two fortifications at {0}")]
    OwnFortsFull(&'static str),
    #[error("you have no fortification at {0}")]
    NoFortThere(&'static str),
    #[error("you already hold a claim on {0}")]
    ClaimAlreadyHeld(&'static str),
    #[error("that card is not in your hand")]
    CardNotInHand,
    #[error("event cards resolve when drawn")]
    CardNotPlayable,
    #[error("only combat cards can back a battle")]
    NotABattleCard,
    #[error("a claim card needs a target")]
    MissingTarget,
    #[error("the claim cannot target {0}")]
    BadClaimTarget(&'static str),
    #[error("only the defender may answer this battle")]
    NotTheDefender,
    #[error("no battle awaits an answer")]
    NoPendingBattle,
}

/// A reference to something that does not exist. Unlike a rule
/// violation this is caller error and surfaces through the Result
/// channel instead of an outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("unknown player id {}", .0 .0)]
    UnknownPlayer(PlayerId),
    #[error("unknown holding id {}", .0 .0)]
    UnknownHolding(HoldingId),
    #[error("unknown card id {}", .0 .0)]
    UnknownCard(CardId),
}

pub(crate) fn check_player(state: &GameState, id: PlayerId) -> Result<(), IntegrityError> {
    if (id.0 as usize) < state.players.len() {
        Ok(())
    } else {
        Err(IntegrityError::UnknownPlayer(id))
    }
}

pub(crate) fn check_holding(id: HoldingId) -> Result<(), IntegrityError> {
    if (id.0 as usize) < board::NUM_HOLDINGS {
        Ok(())
    } else {
        Err(IntegrityError::UnknownHolding(id))
    }
}

pub(crate) fn check_card(state: &GameState, id: CardId) -> Result<(), IntegrityError> {
    if (id.0 as usize) < state.catalogue.len() {
        Ok(())
    } else {
        Err(IntegrityError::UnknownCard(id))
    }
}

/// Every id an action mentions must exist before the executor looks at
/// the rules at all.
pub(crate) fn check_action_ids(state: &GameState, action: &Action) -> Result<(), IntegrityError> {
    check_player(state, action.player())?;
    match action {
        Action::Move { source, target, .. }
        | Action::RelocateFortification { source, target, .. } => {
            check_holding(*source)?;
            check_holding(*target)?;
        }
        Action::BuildFortification { target, .. }
        | Action::ClaimTitle { target, .. }
        | Action::ClaimTown { target, .. }
        | Action::FakeClaim { target, .. } => check_holding(*target)?,
        Action::Attack {
            target,
            source,
            cards,
            ..
        } => {
            check_holding(*target)?;
            if let Some(src) = source {
                check_holding(*src)?;
            }
            for &c in cards {
                check_card(state, c)?;
            }
        }
        Action::Defend { cards, .. } => {
            for &c in cards {
                check_card(state, c)?;
            }
        }
        Action::PlayCard { card, target, .. } => {
            check_card(state, *card)?;
            if let Some(t) = target {
                check_holding(*t)?;
            }
        }
        Action::Recruit { .. } | Action::EndTurn { .. } => {}
    }
    Ok(())
}

// ── Generator ───────────────────────────────────────────────────────────

/// The exhaustive list of legal actions for one player right now.
pub fn valid_actions(state: &GameState, player: PlayerId) -> Result<Vec<Action>, IntegrityError> {
    check_player(state, player)?;
    let mut out = Vec::new();
    match state.phase {
        Phase::Combat => {
            if let Some(pending) = &state.pending_combat {
                if pending.defender == player {
                    let pool = state.player(player).soldiers;
                    out.push(Action::Defend {
                        player,
                        soldiers: pool.min(pending.attacker_soldiers),
                        cards: Vec::new(),
                    });
                }
            }
        }
        Phase::PlayerTurn if state.current_player_id() == player => {
            push_moves(state, player, &mut out);
            push_recruit(state, player, &mut out);
            push_fortifications(state, player, &mut out);
            push_title_claims(state, player, &mut out);
            push_town_claims(state, player, &mut out);
            push_fake_claims(state, player, &mut out);
            push_attacks(state, player, &mut out);
            push_card_plays(state, player, &mut out);
            out.push(Action::EndTurn { player });
        }
        _ => {}
    }
    Ok(out)
}

fn push_moves(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    for &source in &state.player(player).holdings {
        for &target in board::adjacent(source) {
            if state.holding(target).owner == Some(player) {
                out.push(Action::Move {
                    player,
                    source,
                    target,
                });
            }
        }
    }
}

fn push_recruit(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    if !state.forbid_mercenaries && !state.player(player).holdings.is_empty() {
        out.push(Action::Recruit { player });
    }
}

/// Room left on a town for one more of this player's fortifications.
pub(crate) fn fort_slot_open(state: &GameState, player: PlayerId, town: HoldingId) -> bool {
    let h = state.holding(town);
    h.fortification_count() < 3 && h.forts_of(player) < 2
}

fn push_fortifications(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    let p = state.player(player);
    if p.gold < FORT_COST {
        return;
    }
    if p.fortifications_placed < 4 {
        for &target in &board::TOWNS {
            if fort_slot_open(state, player, target) {
                out.push(Action::BuildFortification { player, target });
            }
        }
    }
    for &source in &board::TOWNS {
        if state.holding(source).forts_of(player) == 0 {
            continue;
        }
        for &target in &board::TOWNS {
            if target != source && fort_slot_open(state, player, target) {
                out.push(Action::RelocateFortification {
                    player,
                    source,
                    target,
                });
            }
        }
    }
}

fn push_title_claims(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    let gold = state.player(player).gold;
    for county in County::ALL {
        let castle = county_castle(county);
        if state.holding(castle).owner.is_none()
            && gold >= title_cost(HoldingKind::CountyCastle)
            && titles::can_claim_count(state, player, county)
        {
            out.push(Action::ClaimTitle {
                player,
                target: castle,
            });
        }
    }
    for duchy in Duchy::ALL {
        let castle = duchy_castle(duchy);
        if state.holding(castle).owner.is_none()
            && gold >= title_cost(HoldingKind::DuchyCastle)
            && titles::can_claim_duke(state, player, duchy)
        {
            out.push(Action::ClaimTitle {
                player,
                target: castle,
            });
        }
    }
    if state.holding(board::KING_CASTLE).owner.is_none()
        && gold >= title_cost(HoldingKind::KingCastle)
        && titles::can_claim_king(state, player)
    {
        out.push(Action::ClaimTitle {
            player,
            target: board::KING_CASTLE,
        });
    }
}

fn push_town_claims(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    let p = state.player(player);
    if p.gold < CLAIM_TOWN_COST {
        return;
    }
    for &target in &p.claims {
        if holding_def(target).kind == HoldingKind::Town && state.holding(target).owner.is_none() {
            out.push(Action::ClaimTown { player, target });
        }
    }
}

fn push_fake_claims(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    let p = state.player(player);
    if p.gold < FAKE_CLAIM_COST {
        return;
    }
    for &target in &board::TOWNS {
        if state.holding(target).owner != Some(player) && !p.has_claim_on(target) {
            out.push(Action::FakeClaim { player, target });
        }
    }
}

/// The owned holding adjacent to the target that grants the best attack
/// modifier, if any.
pub(crate) fn best_attack_source(
    state: &GameState,
    player: PlayerId,
    target: HoldingId,
) -> Option<HoldingId> {
    state
        .player(player)
        .holdings
        .iter()
        .copied()
        .filter(|&h| board::is_adjacent(h, target))
        .max_by_key(|&h| holding_def(h).attack)
}

fn push_attacks(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    if state.war_fought_this_turn || state.enforce_peace {
        return;
    }
    let p = state.player(player);
    if p.soldiers < MIN_COMMITMENT {
        return;
    }
    let revolt = p.has_effect(CardEffect::VassalRevolt);
    for i in 0..board::NUM_HOLDINGS {
        let target = HoldingId(i as u8);
        if state.holding(target).owner == Some(player) {
            continue;
        }
        if !titles::has_valid_claim(state, player, target) {
            continue;
        }
        if titles::in_own_domain(state, player, target) && !revolt {
            continue;
        }
        out.push(Action::Attack {
            player,
            target,
            source: best_attack_source(state, player, target),
            soldiers: MIN_COMMITMENT,
            cards: Vec::new(),
        });
    }
}

/// Holdings a claim card may legally name for this player.
pub(crate) fn claim_card_targets(
    state: &GameState,
    player: PlayerId,
    effect: CardEffect,
) -> Vec<HoldingId> {
    let candidates: Vec<HoldingId> = match effect {
        CardEffect::CountyClaim(county) => county_towns(county).to_vec(),
        CardEffect::DuchyClaim => board::TOWNS
            .iter()
            .copied()
            .chain([
                duchy_castle(Duchy::XU),
                duchy_castle(Duchy::QV),
                board::KING_CASTLE,
            ])
            .collect(),
        CardEffect::UltimateClaim => (0..board::NUM_HOLDINGS)
            .map(|i| HoldingId(i as u8))
            .collect(),
        _ => Vec::new(),
    };
    let p = state.player(player);
    candidates
        .into_iter()
        .filter(|&h| state.holding(h).owner != Some(player) && !p.has_claim_on(h))
        .collect()
}

fn push_card_plays(state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
    let p = state.player(player);
    let mut seen: Vec<CardEffect> = Vec::new();
    for &card in &p.hand {
        let effect = state.card_effect(card);
        if seen.contains(&effect) {
            continue;
        }
        seen.push(effect);
        if cards::is_instant(effect) {
            continue;
        }
        if effect.is_claim() {
            for target in claim_card_targets(state, player, effect) {
                out.push(Action::PlayCard {
                    player,
                    card,
                    target: Some(target),
                });
            }
        } else if effect == CardEffect::Adventurer {
            if p.gold >= ADVENTURER_COST {
                out.push(Action::PlayCard {
                    player,
                    card,
                    target: None,
                });
            }
        } else {
            out.push(Action::PlayCard {
                player,
                card,
                target: None,
            });
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
