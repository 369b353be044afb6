// ═══════════════════════════════════════════════════════════════════════
// Titles and claims — ladder prerequisites, jurisdiction, ownership
// transfer with its cascading title bookkeeping.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::{county_towns, holding_def};
use crate::types::*;

/// Towns a player holds inside a county.
pub fn towns_held_in_county(state: &GameState, player: PlayerId, county: County) -> usize {
    county_towns(county)
        .iter()
        .filter(|&&t| state.holding(t).owner == Some(player))
        .count()
}

pub fn has_town_in_duchy(state: &GameState, player: PlayerId, duchy: Duchy) -> bool {
    duchy
        .counties()
        .iter()
        .any(|&c| towns_held_in_county(state, player, c) >= 1)
}

/// Count prerequisite: 2 of the county's 3 towns.
pub fn can_claim_count(state: &GameState, player: PlayerId, county: County) -> bool {
    towns_held_in_county(state, player, county) >= 2
}

/// Duke prerequisite: Count of one county of the duchy plus at least
/// one town in the duchy's other county.
pub fn can_claim_duke(state: &GameState, player: PlayerId, duchy: Duchy) -> bool {
    let p = state.player(player);
    let [a, b] = duchy.counties();
    if p.counties.contains(&a) {
        return towns_held_in_county(state, player, b) >= 1;
    }
    if p.counties.contains(&b) {
        return towns_held_in_county(state, player, a) >= 1;
    }
    false
}

/// King prerequisite: one full duchy plus a town in the opposite duchy,
/// or both duchies outright.
pub fn can_claim_king(state: &GameState, player: PlayerId) -> bool {
    let p = state.player(player);
    if p.duchies.is_empty() {
        return false;
    }
    if p.duchies.len() >= 2 {
        return true;
    }
    has_town_in_duchy(state, player, p.duchies[0].opposite())
}

/// Recompute the title tier from held components. The tier is always
/// the highest implied by counties / duchies / the crown.
pub fn refresh_title(player: &mut Player) {
    player.title = if player.is_king {
        Title::King
    } else if !player.duchies.is_empty() {
        Title::Duke
    } else if !player.counties.is_empty() {
        Title::Count
    } else {
        Title::Baron
    };
}

/// Is the holding under this player's own jurisdiction? Counts rule
/// their counties, Dukes their duchies, the King the whole realm.
pub fn in_own_domain(state: &GameState, player: PlayerId, holding: HoldingId) -> bool {
    let p = state.player(player);
    if p.is_king {
        return true;
    }
    let def = holding_def(holding);
    if let Some(d) = def.duchy {
        if p.duchies.contains(&d) {
            return true;
        }
    }
    if let Some(c) = def.county {
        if p.counties.contains(&c) {
            return true;
        }
    }
    false
}

/// An implicit claim exists while the player currently meets the
/// castle's title prerequisite. Towns never carry implicit claims.
pub fn implicit_claim(state: &GameState, player: PlayerId, target: HoldingId) -> bool {
    let def = holding_def(target);
    match def.kind {
        HoldingKind::Town => false,
        HoldingKind::CountyCastle => def
            .county
            .map_or(false, |c| can_claim_count(state, player, c)),
        HoldingKind::DuchyCastle => def
            .duchy
            .map_or(false, |d| can_claim_duke(state, player, d)),
        HoldingKind::KingCastle => can_claim_king(state, player),
    }
}

/// Explicit or implicit claim on a holding.
pub fn has_valid_claim(state: &GameState, player: PlayerId, target: HoldingId) -> bool {
    state.player(player).has_claim_on(target) || implicit_claim(state, player, target)
}

/// Hand a holding to a new owner, keeping the owner/holdings pairing
/// intact and cascading title components when a castle changes hands.
pub fn transfer_holding(state: &mut GameState, target: HoldingId, new_owner: PlayerId) {
    let def = holding_def(target);

    if let Some(old_id) = state.holding(target).owner {
        let old = state.player_mut(old_id);
        old.holdings.retain(|&h| h != target);
        match def.kind {
            HoldingKind::Town => {}
            HoldingKind::CountyCastle => {
                if let Some(c) = def.county {
                    old.counties.retain(|&x| x != c);
                }
            }
            HoldingKind::DuchyCastle => {
                if let Some(d) = def.duchy {
                    old.duchies.retain(|&x| x != d);
                }
            }
            HoldingKind::KingCastle => old.is_king = false,
        }
        refresh_title(old);
    }

    let new = state.player_mut(new_owner);
    new.holdings.push(target);
    match def.kind {
        HoldingKind::Town => {}
        HoldingKind::CountyCastle => {
            if let Some(c) = def.county {
                new.counties.push(c);
            }
        }
        HoldingKind::DuchyCastle => {
            if let Some(d) = def.duchy {
                new.duchies.push(d);
            }
        }
        HoldingKind::KingCastle => new.is_king = true,
    }
    refresh_title(new);

    state.holding_mut(target).owner = Some(new_owner);
}

// ═══════════════════════════════════════════════════════════════════════
