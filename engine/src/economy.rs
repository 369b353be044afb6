// ═══════════════════════════════════════════════════════════════════════
// Economy — round income, title stipends, army caps, prestige.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::holding_def;
use crate::types::*;

/// What one player collects at the top of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Income {
    pub gold: u32,
    pub soldiers: u32,
}

/// Holding yields, plus the fortification bonus, plus the stipend for
/// the player's current tier. The owner collects the fortification
/// bonus no matter who paid for the walls.
pub fn income(state: &GameState, player: PlayerId) -> Income {
    let p = state.player(player);
    let mut gold = 0;
    let mut soldiers = 0;
    for &hid in &p.holdings {
        let def = holding_def(hid);
        gold += def.gold_yield;
        soldiers += def.soldier_yield;
        let forts = state.holding(hid).fortification_count();
        if forts >= 1 {
            gold += 2;
        }
        if forts >= 2 {
            gold += 5;
        }
    }
    gold += stipend(p);
    Income { gold, soldiers }
}

/// Stipend for the current tier only. Lower tiers stop paying once a
/// player rises past them.
fn stipend(player: &Player) -> u32 {
    match player.title {
        Title::Baron => 0,
        Title::Count => 2 * player.counties.len() as u32,
        Title::Duke => 4 * player.duchies.len() as u32,
        Title::King => 8,
    }
}

/// Clamp a player's soldiers to their army cap.
pub fn cap_soldiers(player: &mut Player) {
    player.soldiers = player.soldiers.min(player.army_cap());
}

/// Prestige derived from the board right now: 1 per town, 2 per county,
/// 4 per duchy, 6 for the crown.
pub fn derived_prestige(state: &GameState, player: PlayerId) -> u32 {
    let p = state.player(player);
    let towns = p
        .holdings
        .iter()
        .filter(|&&h| holding_def(h).kind == HoldingKind::Town)
        .count() as u32;
    let mut vp = towns + 2 * p.counties.len() as u32 + 4 * p.duchies.len() as u32;
    if p.is_king {
        vp += 6;
    }
    vp
}

/// Derived prestige plus the awards banked over the game. Awards
/// survive losing the holdings that earned them.
pub fn total_prestige(state: &GameState, player: PlayerId) -> u32 {
    derived_prestige(state, player) + state.player(player).prestige
}

// ═══════════════════════════════════════════════════════════════════════
