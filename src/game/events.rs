//! Weighted round-event selection and all randomness used by the engine.
//!
//! Every random draw the simulation makes flows through one `EventSelector`
//! so a fixed seed reproduces a full game tick-for-tick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::registry::PlayerRegistry;
use crate::game::state::PlayerId;

/// Round event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Attack a random opponent (sometimes with the special ability)
    Duel,
    /// Take heavy damage from a surprise attacker
    Ambush,
    /// Recover health and energy
    Blessing,
    /// Find a class-appropriate item
    Treasure,
    /// An ally turns on the player
    Betrayal,
    /// Complete a quest for a small reward
    Quest,
}

/// Fixed probability table; weights are renormalized over their sum
const EVENT_TABLE: [(EventKind, f32); 6] = [
    (EventKind::Duel, 0.25),
    (EventKind::Ambush, 0.20),
    (EventKind::Blessing, 0.15),
    (EventKind::Treasure, 0.20),
    (EventKind::Betrayal, 0.10),
    (EventKind::Quest, 0.10),
];

/// Source of all engine randomness
#[derive(Debug)]
pub struct EventSelector {
    rng: StdRng,
}

impl EventSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic selector for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Weighted draw over the fixed event table
    pub fn pick_event(&mut self) -> EventKind {
        let total: f32 = EVENT_TABLE.iter().map(|(_, w)| w).sum();
        let mut roll = self.rng.gen::<f32>() * total;
        for (kind, weight) in EVENT_TABLE {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        // Floating point leftovers land on the first entry
        EVENT_TABLE[0].0
    }

    /// Uniform draw over living players other than `excluding`.
    /// `None` means no opponent exists and the caller skips the event.
    pub fn pick_opponent(
        &mut self,
        registry: &PlayerRegistry,
        excluding: PlayerId,
    ) -> Option<PlayerId> {
        let candidates: Vec<PlayerId> = registry
            .living_players()
            .into_iter()
            .filter(|id| *id != excluding)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..candidates.len());
        Some(candidates[index])
    }

    /// Up to `max` living players other than `excluding`, in join order
    pub fn pick_targets(
        &mut self,
        registry: &PlayerRegistry,
        excluding: PlayerId,
        max: usize,
    ) -> Vec<PlayerId> {
        registry
            .living_players()
            .into_iter()
            .filter(|id| *id != excluding)
            .take(max)
            .collect()
    }

    /// Independent Bernoulli draw
    pub fn roll(&mut self, chance: f32) -> bool {
        chance > 0.0 && self.rng.gen::<f32>() < chance
    }

    pub fn roll_critical(&mut self, chance: f32) -> bool {
        self.roll(chance)
    }

    pub fn roll_dodge(&mut self, chance: f32) -> bool {
        self.roll(chance)
    }

    /// Uniform index into a non-empty slice
    pub fn choose_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

impl Default for EventSelector {
    fn default() -> Self {
        Self::new()
    }
}
