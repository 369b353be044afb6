// ═══════════════════════════════════════════════════════════════════════
// Combat — dice battles over holdings.
//
// The resolver is synchronous and total: the executor has already
// validated commitments and staged card effects by the time a
// BattleSetup reaches `resolve`. Human defenders get their say through
// the pending-combat detour in the engine, machine and ownerless
// defences are committed here via the heuristic.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::{holding_def, holding_name};
use crate::engine::discard_from_hand;
use crate::titles;
use crate::types::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Everything the resolver needs for one battle.
pub(crate) struct BattleSetup {
    pub attacker: PlayerId,
    pub defender: Option<PlayerId>,
    pub target: HoldingId,
    pub source: Option<HoldingId>,
    pub attacker_committed: u32,
    pub defender_committed: u32,
    pub attacker_cards: Vec<CardId>,
    pub defender_cards: Vec<CardId>,
}

/// Own-fortification bonus: +1 for the first, +3 total with a second.
fn fort_bonus(count: u8) -> i32 {
    match count {
        0 => 0,
        1 => 1,
        _ => 3,
    }
}

fn roll_dice(state: &mut GameState, excalibur: bool, halved: bool) -> u8 {
    let mut rng = state.next_rng();
    let two_d6 = |rng: &mut ChaCha8Rng| -> u8 { rng.gen_range(1..=6) + rng.gen_range(1..=6) };
    let mut roll = two_d6(&mut rng);
    if excalibur {
        roll = roll.max(two_d6(&mut rng));
    }
    if halved {
        roll /= 2;
    }
    roll
}

/// Commitment for a machine-ruled or ownerless defence: estimate the
/// ground advantage, match the attacker's punch with a 200-soldier
/// margin, keep at least 80% of the attacking force, and go all-in
/// rather than hold back a useless remnant.
pub(crate) fn machine_commitment(
    state: &GameState,
    defender: Option<PlayerId>,
    target: HoldingId,
    attacker_committed: u32,
) -> u32 {
    let def_id = match defender {
        Some(d) => d,
        None => return 0,
    };
    let pool = state.player(def_id).soldiers;
    if pool == 0 {
        return 0;
    }
    let tdef = holding_def(target);
    let mut advantage = tdef.defense + fort_bonus(state.holding(target).forts_of(def_id));
    if tdef.kind == HoldingKind::Town {
        advantage += 1;
    }
    let needed = (attacker_committed as i32 - advantage * 100 + 200).max(0) as u32;
    let proportional = attacker_committed * 8 / 10;
    let mut commitment = round_to_hundred(needed.max(proportional)).min(pool);
    if commitment > pool * 8 / 10 {
        commitment = pool;
    }
    commitment
}

pub(crate) fn battle_message(report: &CombatReport) -> String {
    if report.attacker_won {
        format!("Victory! {} is taken", holding_name(report.target))
    } else {
        format!("The attack on {} is repelled", holding_name(report.target))
    }
}

pub(crate) fn resolve(state: &mut GameState, setup: BattleSetup) -> CombatReport {
    let attacker = setup.attacker;
    let defender = setup.defender;
    let target = setup.target;
    let tdef = holding_def(target);

    // a duel settles the matter between champions: no soldiers march
    let duel = state.player(attacker).has_effect(CardEffect::Duel)
        || defender.map_or(false, |d| state.player(d).has_effect(CardEffect::Duel));
    let (attacker_committed, defender_committed) = if duel {
        (0, 0)
    } else {
        (setup.attacker_committed, setup.defender_committed)
    };

    let attacker_excalibur = state.player(attacker).has_effect(CardEffect::Excalibur);
    let defender_excalibur =
        defender.map_or(false, |d| state.player(d).has_effect(CardEffect::Excalibur));
    // poisoned arrows halve the opponent's roll
    let attacker_halved =
        defender.map_or(false, |d| state.player(d).has_effect(CardEffect::PoisonedArrows));
    let defender_halved = state.player(attacker).has_effect(CardEffect::PoisonedArrows);

    let attacker_roll = roll_dice(state, attacker_excalibur, attacker_halved);
    let defender_roll = roll_dice(state, defender_excalibur, defender_halved);

    let mut attacker_strength = attacker_roll as i32 + (attacker_committed / 100) as i32;
    if let Some(src) = setup.source {
        attacker_strength += holding_def(src).attack;
    }
    attacker_strength += fort_bonus(state.holding(target).forts_of(attacker));

    let mut defender_strength =
        defender_roll as i32 + (defender_committed / 100) as i32 + tdef.defense;
    if let Some(d) = defender {
        defender_strength += fort_bonus(state.holding(target).forts_of(d));
    }
    if tdef.kind == HoldingKind::Town {
        defender_strength += 1;
    }

    // ties stand with the defender, which also settles the one case the
    // rules call out by name: the reigning king keeps the King's Castle
    let attacker_won = attacker_strength > defender_strength;

    let attacker_talented = state.player(attacker).has_effect(CardEffect::TalentedCommander);
    let defender_talented =
        defender.map_or(false, |d| state.player(d).has_effect(CardEffect::TalentedCommander));

    // the winner keeps floor(committed/200)*100, the loser loses all
    let attacker_losses = if !attacker_won {
        attacker_committed
    } else if attacker_talented {
        0
    } else {
        attacker_committed - attacker_committed / 200 * 100
    };
    let defender_losses = if attacker_won {
        defender_committed
    } else if defender_talented {
        0
    } else {
        defender_committed - defender_committed / 200 * 100
    };

    state.player_mut(attacker).soldiers -= attacker_losses;
    if let Some(d) = defender {
        state.player_mut(d).soldiers -= defender_losses;
    }

    if attacker_won {
        titles::transfer_holding(state, target, attacker);
        if tdef.kind == HoldingKind::Town {
            strip_fortifications(state, target);
        }
    }

    // the pressed claim is spent win or lose
    state.player_mut(attacker).claims.retain(|&c| c != target);

    // one-shot battle effects are spent, staged cards leave the hands
    clear_battle_effects(state, attacker);
    for &c in &setup.attacker_cards {
        discard_from_hand(state, attacker, c);
    }
    if let Some(d) = defender {
        clear_battle_effects(state, d);
        for &c in &setup.defender_cards {
            discard_from_hand(state, d, c);
        }
    }

    // a Big War ends with the attacker's next war, and this was it
    state.player_mut(attacker).big_war = false;

    let report = CombatReport {
        attacker,
        defender,
        target,
        attacker_committed,
        defender_committed,
        attacker_roll,
        defender_roll,
        attacker_strength,
        defender_strength,
        attacker_won,
        attacker_losses,
        defender_losses,
        holding_captured: attacker_won,
    };

    let attacker_name = state.player(attacker).name.clone();
    let line = if attacker_won {
        format!(
            "{} takes {} ({} vs {})",
            attacker_name,
            holding_name(target),
            attacker_strength,
            defender_strength
        )
    } else {
        format!(
            "{} is repelled at {} ({} vs {})",
            attacker_name,
            holding_name(target),
            attacker_strength,
            defender_strength
        )
    };
    state.log(line);
    state.combat_log.push(report.clone());
    report
}

fn clear_battle_effects(state: &mut GameState, player: PlayerId) {
    state
        .player_mut(player)
        .active_effects
        .retain(|e| !e.is_battle_modifier());
}

/// Captured towns lose every fortification on them, and each placer
/// gets their counter back.
fn strip_fortifications(state: &mut GameState, town: HoldingId) {
    let counts = state.holding(town).forts_by_player.clone();
    for (i, &n) in counts.iter().enumerate() {
        if n > 0 {
            state.players[i].fortifications_placed -= n;
        }
    }
    for slot in &mut state.holding_mut(town).forts_by_player {
        *slot = 0;
    }
}

// ═══════════════════════════════════════════════════════════════════════
