// ═══════════════════════════════════════════════════════════════════════
// Heuristic agent — simple strategic scoring over the legal actions.
// Significantly stronger than RandomAgent.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use kingdom_engine::board::holding_def;
use kingdom_engine::types::*;
use kingdom_engine::Action;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct HeuristicAgent {
    rng: ChaCha8Rng,
}

impl HeuristicAgent {
    pub fn new(seed: u64) -> Self {
        HeuristicAgent {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Dice-point advantage a defence of this holding enjoys: terrain,
    /// the owner's walls, and the militia bonus towns always get.
    fn defence_cover(&self, state: &GameState, target: HoldingId) -> i32 {
        let def = holding_def(target);
        let mut cover = def.defense;
        if let Some(owner) = state.holding(target).owner {
            cover += match state.holding(target).forts_of(owner) {
                0 => 0,
                1 => 1,
                _ => 3,
            };
        }
        if def.is_town() {
            cover += 1;
        }
        cover
    }

    /// Soldiers worth marching on this target given our pool: cover the
    /// ground advantage, outweigh the garrison, keep a 300 margin.
    fn attack_commitment(&self, state: &GameState, player: PlayerId, target: HoldingId) -> u32 {
        let pool = state.player(player).soldiers;
        let garrison = state
            .holding(target)
            .owner
            .map_or(0, |o| state.player(o).soldiers);
        let needed = self.defence_cover(state, target) * 100 + (garrison * 8 / 10) as i32 + 300;
        round_to_hundred((needed.max(200) as u32).min(pool))
    }

    fn score_action(&mut self, state: &GameState, player: PlayerId, action: &Action) -> i32 {
        let me = state.player(player);
        let score = match action {
            // titles are the game: take them the moment they open
            Action::ClaimTitle { .. } => 90,
            Action::ClaimTown { .. } => 70,
            Action::Attack { target, .. } => {
                let commitment = self.attack_commitment(state, player, *target);
                let def = holding_def(*target);
                let mut s = if def.is_castle() {
                    40
                } else {
                    20 + def.gold_yield as i32 + (def.soldier_yield / 100) as i32
                };
                if state.holding(*target).owner.is_none() {
                    s += 10;
                }
                // risky when the estimate eats the whole pool
                if commitment >= me.soldiers {
                    s -= 30;
                }
                s
            }
            Action::PlayCard { card, .. } => match state.card_effect(*card) {
                e if e.is_claim() => 30,
                CardEffect::Adventurer if me.soldiers + 500 <= me.army_cap() => 25,
                CardEffect::BigWar if me.soldiers >= me.army_cap() => 20,
                CardEffect::Spy => 4,
                CardEffect::EnforcePeace | CardEffect::ForbidMercenaries => 3,
                _ => 1,
            },
            Action::BuildFortification { target, .. } if me.gold >= 20 => {
                8 + holding_def(*target).defense
            }
            Action::FakeClaim { .. } if me.gold >= 50 => 10,
            Action::Move { .. } => 1,
            Action::Recruit { .. } => 1,
            _ => 0,
        };
        score + self.rng.gen_range(0..3)
    }
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str {
        "Heuristic"
    }

    fn choose_starting_town(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
        open: &[HoldingId],
    ) -> HoldingId {
        // soldiers win the early wars; gold buys the first title
        let mut best = open[0];
        let mut best_score = i32::MIN;
        for &town in open {
            let def = holding_def(town);
            let mut score =
                (def.soldier_yield / 100) as i32 * 3 + def.gold_yield as i32 * 2 + def.defense;
            score += self.rng.gen_range(0..2);
            if score > best_score {
                best_score = score;
                best = town;
            }
        }
        best
    }

    fn choose_action(&mut self, state: &GameState, player: PlayerId, valid: &[Action]) -> Action {
        let mut best = valid.last().expect("no legal actions").clone();
        let mut best_score = i32::MIN;
        for action in valid {
            let score = self.score_action(state, player, action);
            if score > best_score {
                best_score = score;
                best = action.clone();
            }
        }
        if let Action::Attack {
            player: p,
            target,
            soldiers,
            ..
        } = &mut best
        {
            *soldiers = self.attack_commitment(state, *p, *target);
        }
        best
    }

    fn choose_commitment(
        &mut self,
        state: &GameState,
        player: PlayerId,
        pending: &PendingCombat,
    ) -> u32 {
        let pool = state.player(player).soldiers;
        let cover = self.defence_cover(state, pending.target);
        // match the attack with a 100-soldier edge, minus what the
        // walls already cover; a cornered garrison goes all-in
        let want = (pending.attacker_soldiers as i32 + 100 - cover * 100).max(0) as u32;
        let mut commit = round_to_hundred(want).min(pool);
        if commit > pool * 8 / 10 {
            commit = pool;
        }
        commit
    }
}
