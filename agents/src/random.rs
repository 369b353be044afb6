// ═══════════════════════════════════════════════════════════════════════
// Random agent — picks uniformly among the legal actions.
// The baseline opponent, and a fuzzer for the rules engine.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use kingdom_engine::types::*;
use kingdom_engine::Action;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        RandomAgent {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "Random"
    }

    fn choose_starting_town(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
        open: &[HoldingId],
    ) -> HoldingId {
        *open.choose(&mut self.rng).expect("no open towns")
    }

    fn choose_action(&mut self, state: &GameState, _player: PlayerId, valid: &[Action]) -> Action {
        let mut action = valid
            .choose(&mut self.rng)
            .expect("no legal actions")
            .clone();
        // attack templates arrive at the minimum; march a random share
        if let Action::Attack {
            player, soldiers, ..
        } = &mut action
        {
            let pool = state.player(*player).soldiers;
            if pool > *soldiers {
                *soldiers = self.rng.gen_range(2..=pool / 100) * 100;
            }
        }
        action
    }

    fn choose_commitment(
        &mut self,
        state: &GameState,
        player: PlayerId,
        _pending: &PendingCombat,
    ) -> u32 {
        let pool = state.player(player).soldiers;
        if pool < 100 {
            return 0;
        }
        self.rng.gen_range(0..=pool / 100) * 100
    }
}
