// ═══════════════════════════════════════════════════════════════════════
// Agent trait — interface every computer player implements.
//
// Agents never judge legality. The engine generates the complete list
// of legal actions and the agent only ranks them, so a misbehaving
// agent can at worst play badly, never illegally. Battle commitments
// and the opening seat pick go through their own methods because they
// answer prompts rather than spend the turn.
// ═══════════════════════════════════════════════════════════════════════

use kingdom_engine::types::*;
use kingdom_engine::Action;

pub trait Agent: Send + Sync {
    /// Human-readable name for this strategy (e.g. "Random", "Heuristic").
    fn name(&self) -> &str;

    /// Pick a starting town from the open candidates.
    fn choose_starting_town(
        &mut self,
        state: &GameState,
        player: PlayerId,
        open: &[HoldingId],
    ) -> HoldingId;

    /// Pick one of the legal actions for this turn. Agents may rewrite
    /// the soldier count on an attack template; the engine re-validates.
    fn choose_action(&mut self, state: &GameState, player: PlayerId, valid: &[Action]) -> Action;

    /// Commit soldiers against an incoming attack. The engine rounds
    /// the answer to hundreds and clamps it to the pool.
    fn choose_commitment(
        &mut self,
        state: &GameState,
        player: PlayerId,
        pending: &PendingCombat,
    ) -> u32;
}
