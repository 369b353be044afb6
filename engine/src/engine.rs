// ═══════════════════════════════════════════════════════════════════════
// Game Engine — action execution and phase flow
//
// Architecture:
//   The engine is a pure state machine. It never does I/O and never
//   calls a decision provider. An attack on a human-ruled holding
//   parks the battle in `state.pending_combat` and flips the phase to
//   Combat; the caller asks the defender and answers with a Defend
//   action. Everything else resolves synchronously inside
//   `perform_action`, including the automatic card draw and the
//   Income/Upkeep bookkeeping around turn boundaries.
//
// Every handler validates first and mutates only after the last check
// has passed: a rejected action leaves the state untouched.
// ═══════════════════════════════════════════════════════════════════════

use crate::actions::{self, Action, ActionOutcome, IntegrityError, RuleViolation};
use crate::board::{self, holding_def, holding_name};
use crate::cards;
use crate::combat;
use crate::economy;
use crate::titles;
use crate::types::*;
use rand::seq::SliceRandom;

/// Execute one action against the state. Ids that do not exist surface
/// as `Err`; rule violations come back as a rejected outcome.
pub fn perform_action(
    state: &mut GameState,
    action: &Action,
) -> Result<ActionOutcome, IntegrityError> {
    actions::check_action_ids(state, action)?;
    let result = match *action {
        Action::Move {
            player,
            source,
            target,
        } => handle_move(state, player, source, target),
        Action::Recruit { player } => handle_recruit(state, player),
        Action::BuildFortification { player, target } => handle_build(state, player, target),
        Action::RelocateFortification {
            player,
            source,
            target,
        } => handle_relocate(state, player, source, target),
        Action::ClaimTitle { player, target } => handle_claim_title(state, player, target),
        Action::ClaimTown { player, target } => handle_claim_town(state, player, target),
        Action::FakeClaim { player, target } => handle_fake_claim(state, player, target),
        Action::Attack {
            player,
            target,
            source,
            soldiers,
            ref cards,
        } => handle_attack(state, player, target, source, soldiers, cards),
        Action::Defend {
            player,
            soldiers,
            ref cards,
        } => handle_defend(state, player, soldiers, cards),
        Action::PlayCard {
            player,
            card,
            target,
        } => handle_play_card(state, player, card, target),
        Action::EndTurn { player } => handle_end_turn(state, player),
    };
    Ok(result.unwrap_or_else(|violation| ActionOutcome::rejected(&violation)))
}

/// Players ranked best-first: prestige, then title tier, then gold,
/// then soldiers.
pub fn standings(state: &GameState) -> Vec<PlayerId> {
    let mut ids: Vec<PlayerId> = state.players.iter().map(|p| p.id).collect();
    ids.sort_by(|&a, &b| {
        let pa = state.player(a);
        let pb = state.player(b);
        economy::total_prestige(state, b)
            .cmp(&economy::total_prestige(state, a))
            .then(pb.title.tier().cmp(&pa.title.tier()))
            .then(pb.gold.cmp(&pa.gold))
            .then(pb.soldiers.cmp(&pa.soldiers))
    });
    ids
}

/// The winner, once the game is over.
pub fn winner(state: &GameState) -> Option<PlayerId> {
    if state.is_game_over() {
        standings(state).first().copied()
    } else {
        None
    }
}

// ── Turn plumbing ───────────────────────────────────────────────────────

fn require_turn(state: &GameState, player: PlayerId) -> Result<(), RuleViolation> {
    if state.phase != Phase::PlayerTurn {
        return Err(RuleViolation::WrongPhase(state.phase));
    }
    if state.current_player_id() != player {
        return Err(RuleViolation::NotYourTurn);
    }
    Ok(())
}

/// Collect income for everyone and open the first player's turn.
pub(crate) fn begin_income(state: &mut GameState) {
    state.forbid_mercenaries = false;
    state.enforce_peace = false;

    let incomes: Vec<(PlayerId, economy::Income)> = state
        .players
        .iter()
        .map(|p| (p.id, economy::income(state, p.id)))
        .collect();
    for (pid, inc) in incomes {
        let p = state.player_mut(pid);
        p.gold += inc.gold;
        p.soldiers += inc.soldiers;
        economy::cap_soldiers(p);
    }
    state.log(format!("Round {}: income is collected", state.round));

    state.phase = Phase::PlayerTurn;
    state.current_player_idx = 0;
    state.war_fought_this_turn = false;
    state.card_drawn_this_turn = false;
    auto_draw(state);
}

/// The automatic draw at the top of the current player's turn.
/// Instants resolve immediately and go to the discard pile.
pub(crate) fn auto_draw(state: &mut GameState) {
    let player = state.current_player_id();
    if state.deck.is_empty() && !state.discard.is_empty() {
        let mut pile = std::mem::take(&mut state.discard);
        let mut rng = state.next_rng();
        pile.shuffle(&mut rng);
        state.deck = pile;
        state.log("The discard pile is shuffled back into the deck".to_string());
    }
    match state.deck.pop() {
        None => state.log("No cards available to draw".to_string()),
        Some(card) => {
            let effect = state.card_effect(card);
            if cards::is_instant(effect) {
                apply_instant(state, player, effect);
                state.discard.push(card);
            } else {
                state.player_mut(player).hand.push(card);
                state.log(format!("{} draws a card", state.player(player).name));
            }
        }
    }
    state.card_drawn_this_turn = true;
}

fn apply_instant(state: &mut GameState, player: PlayerId, effect: CardEffect) {
    match effect {
        CardEffect::GoldChest(amount) => {
            state.player_mut(player).gold += amount;
            state.log(format!(
                "{} opens a gold chest worth {}",
                state.player(player).name,
                amount
            ));
        }
        CardEffect::Raiders => {
            let plundered = economy::income(state, player).gold;
            let p = state.player_mut(player);
            p.gold = p.gold.saturating_sub(plundered);
            state.log(format!(
                "Raiders plunder {}: {} gold lost",
                state.player(player).name,
                plundered
            ));
        }
        CardEffect::Crusade => {
            for p in &mut state.players {
                p.gold /= 2;
                p.soldiers = p.soldiers / 200 * 100;
            }
            state.log("A crusade is called: every realm gives up half its gold and soldiers".to_string());
        }
        _ => {}
    }
}

/// End-of-round upkeep: cap armies, honor the king, and check for a
/// winner. Victory is decided here and nowhere else.
fn run_upkeep(state: &mut GameState) {
    state.phase = Phase::Upkeep;
    let king = state
        .players
        .iter()
        .find(|p| p.is_king)
        .map(|p| p.name.clone());
    for p in &mut state.players {
        economy::cap_soldiers(p);
        if p.is_king {
            p.prestige += 2;
        }
    }
    if let Some(name) = king {
        state.log(format!("{} is honored at court: +2 prestige", name));
    }

    let threshold = state.victory_threshold;
    let crowned = state
        .players
        .iter()
        .any(|p| economy::total_prestige(state, p.id) >= threshold);
    if crowned {
        state.phase = Phase::GameOver;
        if let Some(w) = standings(state).first().copied() {
            state.log(format!(
                "{} reaches {} prestige and wins the game",
                state.player(w).name,
                economy::total_prestige(state, w)
            ));
        }
    } else {
        state.round += 1;
        state.phase = Phase::Income;
        begin_income(state);
    }
}

/// Remove one card from a hand into the discard pile, if present.
pub(crate) fn discard_from_hand(state: &mut GameState, player: PlayerId, card: CardId) {
    let pos = state
        .player(player)
        .hand
        .iter()
        .position(|&c| c == card);
    if let Some(pos) = pos {
        state.player_mut(player).hand.remove(pos);
        state.discard.push(card);
    }
}

fn check_battle_cards(
    state: &GameState,
    player: PlayerId,
    cards: &[CardId],
) -> Result<(), RuleViolation> {
    let p = state.player(player);
    for (i, &c) in cards.iter().enumerate() {
        if cards[..i].contains(&c) || !p.hand.contains(&c) {
            return Err(RuleViolation::CardNotInHand);
        }
        if !state.card_effect(c).is_battle_modifier() {
            return Err(RuleViolation::NotABattleCard);
        }
    }
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────────

fn handle_move(
    state: &mut GameState,
    player: PlayerId,
    source: HoldingId,
    target: HoldingId,
) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;
    if state.holding(source).owner != Some(player) {
        return Err(RuleViolation::NotRuled(holding_name(source)));
    }
    if state.holding(target).owner != Some(player) {
        return Err(RuleViolation::NotRuled(holding_name(target)));
    }
    if !board::is_adjacent(source, target) {
        return Err(RuleViolation::NotAdjacent(
            holding_name(source),
            holding_name(target),
        ));
    }
    state.log(format!(
        "{} marches forces from {} to {}",
        state.player(player).name,
        holding_name(source),
        holding_name(target)
    ));
    Ok(ActionOutcome::ok("Forces moved"))
}

fn handle_recruit(state: &mut GameState, player: PlayerId) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;
    if state.forbid_mercenaries {
        return Err(RuleViolation::MercenariesForbidden);
    }
    if state.player(player).holdings.is_empty() {
        return Err(RuleViolation::NoHoldings);
    }
    // recruits arrive with income; the muster itself moves nothing
    state.log(format!("{} calls the muster", state.player(player).name));
    Ok(ActionOutcome::ok("The muster is called"))
}

fn handle_build(
    state: &mut GameState,
    player: PlayerId,
    target: HoldingId,
) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;
    if holding_def(target).kind != HoldingKind::Town {
        return Err(RuleViolation::NotATown(holding_name(target)));
    }
    let p = state.player(player);
    if p.gold < actions::FORT_COST {
        return Err(RuleViolation::NotEnoughGold(actions::FORT_COST));
    }
    if p.fortifications_placed >= 4 {
        return Err(RuleViolation::FortLimitReached);
    }
    let h = state.holding(target);
    if h.fortification_count() >= 3 {
        return Err(RuleViolation::HoldingFortsFull(holding_name(target)));
    }
    if h.forts_of(player) >= 2 {
        return Err(RuleViolation::OwnFortsFull(holding_name(target)));
    }

    let p = state.player_mut(player);
    p.gold -= actions::FORT_COST;
    p.fortifications_placed += 1;
    state.holding_mut(target).forts_by_player[player.0 as usize] += 1;
    state.log(format!(
        "{} raises a fortification at {}",
        state.player(player).name,
        holding_name(target)
    ));
    Ok(ActionOutcome::ok("Fortification raised"))
}

fn handle_relocate(
    state: &mut GameState,
    player: PlayerId,
    source: HoldingId,
    target: HoldingId,
) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;
    if source == target {
        return Err(RuleViolation::SameHolding);
    }
    if holding_def(target).kind != HoldingKind::Town {
        return Err(RuleViolation::NotATown(holding_name(target)));
    }
    if state.player(player).gold < actions::FORT_COST {
        return Err(RuleViolation::NotEnoughGold(actions::FORT_COST));
    }
    if state.holding(source).forts_of(player) == 0 {
        return Err(RuleViolation::NoFortThere(holding_name(source)));
    }
    let h = state.holding(target);
    if h.fortification_count() >= 3 {
        return Err(RuleViolation::HoldingFortsFull(holding_name(target)));
    }
    if h.forts_of(player) >= 2 {
        return Err(RuleViolation::OwnFortsFull(holding_name(target)));
    }

    state.player_mut(player).gold -= actions::FORT_COST;
    state.holding_mut(source).forts_by_player[player.0 as usize] -= 1;
    state.holding_mut(target).forts_by_player[player.0 as usize] += 1;
    state.log(format!(
        "{} moves a fortification from {} to {}",
        state.player(player).name,
        holding_name(source),
        holding_name(target)
    ));
    Ok(ActionOutcome::ok("Fortification relocated"))
}

fn handle_claim_title(
    state: &mut GameState,
    player: PlayerId,
    target: HoldingId,
) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;
    let def = holding_def(target);
    let tier = match def.kind {
        HoldingKind::Town => return Err(RuleViolation::NotACastle(holding_name(target))),
        HoldingKind::CountyCastle => Title::Count,
        HoldingKind::DuchyCastle => Title::Duke,
        HoldingKind::KingCastle => Title::King,
    };
    if state.holding(target).owner.is_some() {
        return Err(RuleViolation::CastleTaken(holding_name(target)));
    }
    if !titles::implicit_claim(state, player, target) {
        return Err(RuleViolation::TitleRequirements(tier));
    }
    let cost = actions::title_cost(def.kind);
    if state.player(player).gold < cost {
        return Err(RuleViolation::NotEnoughGold(cost));
    }

    state.player_mut(player).gold -= cost;
    titles::transfer_holding(state, target, player);
    state.log(format!(
        "{} claims {} and holds the title of {}",
        state.player(player).name,
        holding_name(target),
        state.player(player).title
    ));
    Ok(ActionOutcome::ok(format!(
        "{} claimed",
        holding_name(target)
    )))
}

fn handle_claim_town(
    state: &mut GameState,
    player: PlayerId,
    target: HoldingId,
) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;
    if holding_def(target).kind != HoldingKind::Town {
        return Err(RuleViolation::NotATown(holding_name(target)));
    }
    if state.holding(target).owner.is_some() {
        return Err(RuleViolation::AlreadyRuled(holding_name(target)));
    }
    if !state.player(player).has_claim_on(target) {
        return Err(RuleViolation::NoClaim(holding_name(target)));
    }
    if state.player(player).gold < actions::CLAIM_TOWN_COST {
        return Err(RuleViolation::NotEnoughGold(actions::CLAIM_TOWN_COST));
    }

    state.player_mut(player).gold -= actions::CLAIM_TOWN_COST;
    titles::transfer_holding(state, target, player);
    state.player_mut(player).claims.retain(|&c| c != target);
    state.log(format!(
        "{} presses their claim and takes {}",
        state.player(player).name,
        holding_name(target)
    ));
    Ok(ActionOutcome::ok(format!("{} taken", holding_name(target))))
}

fn handle_fake_claim(
    state: &mut GameState,
    player: PlayerId,
    target: HoldingId,
) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;
    if holding_def(target).kind != HoldingKind::Town {
        return Err(RuleViolation::NotATown(holding_name(target)));
    }
    if state.holding(target).owner == Some(player) {
        return Err(RuleViolation::OwnHolding(holding_name(target)));
    }
    if state.player(player).has_claim_on(target) {
        return Err(RuleViolation::ClaimAlreadyHeld(holding_name(target)));
    }
    if state.player(player).gold < actions::FAKE_CLAIM_COST {
        return Err(RuleViolation::NotEnoughGold(actions::FAKE_CLAIM_COST));
    }

    let p = state.player_mut(player);
    p.gold -= actions::FAKE_CLAIM_COST;
    p.claims.push(target);
    state.log(format!(
        "{} fabricates a claim on {}",
        state.player(player).name,
        holding_name(target)
    ));
    Ok(ActionOutcome::ok(format!(
        "A claim on {} is fabricated",
        holding_name(target)
    )))
}

fn handle_attack(
    state: &mut GameState,
    player: PlayerId,
    target: HoldingId,
    source: Option<HoldingId>,
    soldiers: u32,
    cards: &[CardId],
) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;
    if state.war_fought_this_turn {
        return Err(RuleViolation::WarAlreadyFought);
    }
    if state.enforce_peace {
        return Err(RuleViolation::PeaceEnforced);
    }
    let committed = round_to_hundred(soldiers);
    if committed < actions::MIN_COMMITMENT {
        return Err(RuleViolation::CommitmentTooSmall);
    }
    if committed > state.player(player).soldiers {
        return Err(RuleViolation::NotEnoughSoldiers);
    }
    if state.holding(target).owner == Some(player) {
        return Err(RuleViolation::OwnHolding(holding_name(target)));
    }
    if !titles::has_valid_claim(state, player, target) {
        return Err(RuleViolation::NoClaim(holding_name(target)));
    }
    if titles::in_own_domain(state, player, target)
        && !state.player(player).has_effect(CardEffect::VassalRevolt)
    {
        return Err(RuleViolation::OwnDomain(holding_name(target)));
    }
    if let Some(src) = source {
        if state.holding(src).owner != Some(player) {
            return Err(RuleViolation::NotRuled(holding_name(src)));
        }
        if !board::is_adjacent(src, target) {
            return Err(RuleViolation::NotAdjacent(
                holding_name(src),
                holding_name(target),
            ));
        }
    }
    check_battle_cards(state, player, cards)?;

    state.war_fought_this_turn = true;
    for &c in cards {
        let effect = state.card_effect(c);
        state.player_mut(player).active_effects.push(effect);
    }

    let defender = state.holding(target).owner;
    match defender {
        Some(d) if state.player(d).controller.is_human() => {
            state.pending_combat = Some(PendingCombat {
                attacker: player,
                defender: d,
                target,
                source,
                attacker_soldiers: committed,
                attacker_cards: cards.to_vec(),
            });
            state.phase = Phase::Combat;
            state.log(format!(
                "{} marches on {}: {} must answer",
                state.player(player).name,
                holding_name(target),
                state.player(d).name
            ));
            Ok(ActionOutcome::ok("The defender must commit their forces"))
        }
        _ => {
            let defender_committed = combat::machine_commitment(state, defender, target, committed);
            let report = combat::resolve(
                state,
                combat::BattleSetup {
                    attacker: player,
                    defender,
                    target,
                    source,
                    attacker_committed: committed,
                    defender_committed,
                    attacker_cards: cards.to_vec(),
                    defender_cards: Vec::new(),
                },
            );
            let message = combat::battle_message(&report);
            Ok(ActionOutcome::with_combat(message, report))
        }
    }
}

fn handle_defend(
    state: &mut GameState,
    player: PlayerId,
    soldiers: u32,
    cards: &[CardId],
) -> Result<ActionOutcome, RuleViolation> {
    if state.phase != Phase::Combat {
        return Err(RuleViolation::WrongPhase(state.phase));
    }
    let pending = match state.pending_combat.clone() {
        Some(p) => p,
        None => return Err(RuleViolation::NoPendingBattle),
    };
    if pending.defender != player {
        return Err(RuleViolation::NotTheDefender);
    }
    check_battle_cards(state, player, cards)?;

    let pool = state.player(player).soldiers;
    let committed = round_to_hundred(soldiers).min(pool);
    for &c in cards {
        let effect = state.card_effect(c);
        state.player_mut(player).active_effects.push(effect);
    }

    state.pending_combat = None;
    state.phase = Phase::PlayerTurn;
    let report = combat::resolve(
        state,
        combat::BattleSetup {
            attacker: pending.attacker,
            defender: Some(player),
            target: pending.target,
            source: pending.source,
            attacker_committed: pending.attacker_soldiers,
            defender_committed: committed,
            attacker_cards: pending.attacker_cards.clone(),
            defender_cards: cards.to_vec(),
        },
    );
    let message = combat::battle_message(&report);
    Ok(ActionOutcome::with_combat(message, report))
}

fn handle_play_card(
    state: &mut GameState,
    player: PlayerId,
    card: CardId,
    target: Option<HoldingId>,
) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;
    if !state.player(player).hand.contains(&card) {
        return Err(RuleViolation::CardNotInHand);
    }
    let effect = state.card_effect(card);

    let message = match effect {
        CardEffect::GoldChest(_) | CardEffect::Raiders | CardEffect::Crusade => {
            return Err(RuleViolation::CardNotPlayable)
        }
        CardEffect::BigWar => {
            state.player_mut(player).big_war = true;
            "The banners are called: army cap doubled until your next war".to_string()
        }
        CardEffect::Adventurer => {
            if state.player(player).gold < actions::ADVENTURER_COST {
                return Err(RuleViolation::NotEnoughGold(actions::ADVENTURER_COST));
            }
            let p = state.player_mut(player);
            p.gold -= actions::ADVENTURER_COST;
            p.soldiers += 500;
            "An adventurer and his 500 swords sign on".to_string()
        }
        CardEffect::Excalibur
        | CardEffect::PoisonedArrows
        | CardEffect::TalentedCommander
        | CardEffect::Duel
        | CardEffect::VassalRevolt => {
            state.player_mut(player).active_effects.push(effect);
            format!("{} is readied", cards::effect_name(effect))
        }
        CardEffect::ForbidMercenaries => {
            state.forbid_mercenaries = true;
            "No mercenaries will sign on for the rest of the round".to_string()
        }
        CardEffect::EnforcePeace => {
            state.enforce_peace = true;
            "Peace is enforced: no wars for the rest of the round".to_string()
        }
        CardEffect::Spy => {
            let names: Vec<&str> = state
                .deck
                .iter()
                .rev()
                .take(3)
                .map(|&c| cards::effect_name(state.card_effect(c)))
                .collect();
            if names.is_empty() {
                "The spy finds the deck empty".to_string()
            } else {
                format!("The spy reports the next cards: {}", names.join(", "))
            }
        }
        CardEffect::CountyClaim(_) | CardEffect::UltimateClaim | CardEffect::DuchyClaim => {
            let t = match target {
                Some(t) => t,
                None => return Err(RuleViolation::MissingTarget),
            };
            if !actions::claim_card_targets(state, player, effect).contains(&t) {
                return Err(RuleViolation::BadClaimTarget(holding_name(t)));
            }
            state.player_mut(player).claims.push(t);
            format!("A claim on {} is proclaimed", holding_name(t))
        }
    };

    discard_from_hand(state, player, card);
    state.log(format!(
        "{} plays {}",
        state.player(player).name,
        cards::effect_name(effect)
    ));
    Ok(ActionOutcome::ok(message))
}

fn handle_end_turn(state: &mut GameState, player: PlayerId) -> Result<ActionOutcome, RuleViolation> {
    require_turn(state, player)?;

    // trim to the hand limit, oldest cards first
    let limit = state.hand_limit;
    while state.player(player).hand.len() > limit {
        let oldest = state.player_mut(player).hand.remove(0);
        state.discard.push(oldest);
    }
    state.player_mut(player).active_effects.clear();
    state.log(format!("{} ends their turn", state.player(player).name));

    let next = state.current_player_idx + 1;
    if next >= state.players.len() {
        run_upkeep(state);
    } else {
        state.current_player_idx = next;
        state.war_fought_this_turn = false;
        state.card_drawn_this_turn = false;
        auto_draw(state);
    }
    Ok(ActionOutcome::ok("Turn ended"))
}
