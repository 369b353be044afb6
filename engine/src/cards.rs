// ═══════════════════════════════════════════════════════════════════════
// Card catalogue — deck composition, effect metadata, shuffling
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{CardEffect, CardId, CardKind, County};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

// ── Deck composition ───────────────────────────────────────────────────

/// Per-effect quantity table a deck is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSpec {
    pub entries: Vec<(CardEffect, u8)>,
}

impl DeckSpec {
    /// The standard 88-card deck.
    pub fn standard() -> DeckSpec {
        DeckSpec {
            entries: vec![
                // Personal events (instant)
                (CardEffect::GoldChest(5), 4),
                (CardEffect::GoldChest(10), 4),
                (CardEffect::GoldChest(15), 3),
                (CardEffect::GoldChest(25), 3),
                (CardEffect::Raiders, 5),
                // Global events (instant)
                (CardEffect::Crusade, 4),
                // Bonus cards
                (CardEffect::BigWar, 5),
                (CardEffect::Adventurer, 5),
                (CardEffect::Excalibur, 5),
                (CardEffect::PoisonedArrows, 5),
                (CardEffect::ForbidMercenaries, 3),
                (CardEffect::TalentedCommander, 4),
                (CardEffect::VassalRevolt, 3),
                (CardEffect::EnforcePeace, 3),
                (CardEffect::Duel, 1),
                (CardEffect::Spy, 1),
                // Claims
                (CardEffect::CountyClaim(County::X), 7),
                (CardEffect::CountyClaim(County::U), 7),
                (CardEffect::CountyClaim(County::V), 7),
                (CardEffect::CountyClaim(County::Q), 7),
                (CardEffect::UltimateClaim, 1),
                (CardEffect::DuchyClaim, 1),
            ],
        }
    }

    pub fn card_count(&self) -> usize {
        self.entries.iter().map(|&(_, n)| n as usize).sum()
    }
}

impl Default for DeckSpec {
    fn default() -> Self {
        DeckSpec::standard()
    }
}

/// Materialize the catalogue: one entry per physical card, ids 0..n.
pub fn build_catalogue(spec: &DeckSpec) -> Vec<CardEffect> {
    let mut catalogue = Vec::with_capacity(spec.card_count());
    for &(effect, count) in &spec.entries {
        for _ in 0..count {
            catalogue.push(effect);
        }
    }
    catalogue
}

/// A freshly shuffled draw pile over the whole catalogue. The top of
/// the deck is the back of the vec.
pub fn shuffled_deck(catalogue_len: usize, rng: &mut ChaCha8Rng) -> Vec<CardId> {
    let mut deck: Vec<CardId> = (0..catalogue_len).map(|i| CardId(i as u16)).collect();
    deck.shuffle(rng);
    deck
}

// ── Effect metadata ────────────────────────────────────────────────────

pub fn effect_kind(effect: CardEffect) -> CardKind {
    match effect {
        CardEffect::GoldChest(_) | CardEffect::Raiders => CardKind::PersonalEvent,
        CardEffect::Crusade => CardKind::GlobalEvent,
        CardEffect::BigWar
        | CardEffect::Adventurer
        | CardEffect::Excalibur
        | CardEffect::PoisonedArrows
        | CardEffect::ForbidMercenaries
        | CardEffect::TalentedCommander
        | CardEffect::VassalRevolt
        | CardEffect::EnforcePeace
        | CardEffect::Duel
        | CardEffect::Spy => CardKind::Bonus,
        CardEffect::CountyClaim(_) | CardEffect::UltimateClaim | CardEffect::DuchyClaim => {
            CardKind::Claim
        }
    }
}

pub fn is_instant(effect: CardEffect) -> bool {
    effect_kind(effect).is_instant()
}

pub fn effect_name(effect: CardEffect) -> &'static str {
    match effect {
        CardEffect::GoldChest(5) => "Gold Chest (5)",
        CardEffect::GoldChest(10) => "Gold Chest (10)",
        CardEffect::GoldChest(15) => "Gold Chest (15)",
        CardEffect::GoldChest(25) => "Gold Chest (25)",
        CardEffect::GoldChest(_) => "Gold Chest",
        CardEffect::Raiders => "Raiders",
        CardEffect::Crusade => "Crusade",
        CardEffect::BigWar => "Big War",
        CardEffect::Adventurer => "Adventurer",
        CardEffect::Excalibur => "Excalibur",
        CardEffect::PoisonedArrows => "Poisoned Arrows",
        CardEffect::ForbidMercenaries => "Forbid Mercenaries",
        CardEffect::TalentedCommander => "Talented Commander",
        CardEffect::VassalRevolt => "Vassal Revolt",
        CardEffect::EnforcePeace => "Enforce Peace",
        CardEffect::Duel => "Duel",
        CardEffect::Spy => "Spy",
        CardEffect::CountyClaim(County::X) => "Claim: County X",
        CardEffect::CountyClaim(County::U) => "Claim: County U",
        CardEffect::CountyClaim(County::V) => "Claim: County V",
        CardEffect::CountyClaim(County::Q) => "Claim: County Q",
        CardEffect::UltimateClaim => "Ultimate Claim",
        CardEffect::DuchyClaim => "Duchy Claim",
    }
}

pub fn effect_text(effect: CardEffect) -> &'static str {
    match effect {
        CardEffect::GoldChest(_) => "A treasure! Gain the gold immediately.",
        CardEffect::Raiders => "Raiders attack! Lose all collected taxes from this turn.",
        CardEffect::Crusade => {
            "A holy crusade is called! All players lose half their Gold and half their soldiers."
        }
        CardEffect::BigWar => "Military expansion! Double your army cap until your next war.",
        CardEffect::Adventurer => {
            "A wandering hero! Buy 500 soldiers for 25 Gold (above your cap limit)."
        }
        CardEffect::Excalibur => {
            "Legendary sword! Roll dice twice in combat and take the higher result."
        }
        CardEffect::PoisonedArrows => {
            "Deadly toxins! Your opponent's dice score is halved in the next combat."
        }
        CardEffect::ForbidMercenaries => {
            "Economic sanctions! No player may buy or trade soldiers for one complete turn."
        }
        CardEffect::TalentedCommander => {
            "Brilliant tactics! You lose no soldiers when winning a combat."
        }
        CardEffect::VassalRevolt => {
            "Rebellion stirs! Higher tier lords may attack their vassals this turn."
        }
        CardEffect::EnforcePeace => {
            "The Pope intervenes! No wars may be waged for one complete turn."
        }
        CardEffect::Duel => {
            "Challenge to single combat! An army-less fight where only dice determine the winner."
        }
        CardEffect::Spy => "Intelligence network! View the next 3 cards in the deck.",
        CardEffect::CountyClaim(County::X) => "Press a claim on any town in County X.",
        CardEffect::CountyClaim(County::U) => "Press a claim on any town in County U.",
        CardEffect::CountyClaim(County::V) => "Press a claim on any town in County V.",
        CardEffect::CountyClaim(County::Q) => "Press a claim on any town in County Q.",
        CardEffect::UltimateClaim => "Divine right! Claim any town or title on the board.",
        CardEffect::DuchyClaim => "Noble heritage! Claim any town or Duke title and above.",
    }
}

// ═══════════════════════════════════════════════════════════════════════
