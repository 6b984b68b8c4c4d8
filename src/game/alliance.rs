//! Pairwise alliances: synergy bonuses, growth, and betrayal checks.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::game::constants::alliance as consts;
use crate::game::error::ActionError;
use crate::game::events::EventSelector;
use crate::game::registry::PlayerRegistry;
use crate::game::state::{AllianceId, Class, PlayerId};

/// Synergy flavor derived from the pair of classes (symmetric lookup)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SynergyType {
    ShieldWall,
    Spellblade,
    Vanguard,
    Strikeforce,
    ArcaneCircle,
    SpellVolley,
    Shadowcraft,
    Crossfire,
    Huntsmen,
    Twinblades,
}

impl SynergyType {
    /// Symmetric: `for_pair(a, b) == for_pair(b, a)`
    pub fn for_pair(a: Class, b: Class) -> Self {
        use Class::{Archer, Mage, Rogue, Warrior};
        let key = {
            let ia = Class::ALL.iter().position(|c| *c == a).unwrap_or(0);
            let ib = Class::ALL.iter().position(|c| *c == b).unwrap_or(0);
            if ia <= ib { (a, b) } else { (b, a) }
        };
        match key {
            (Warrior, Warrior) => SynergyType::ShieldWall,
            (Warrior, Mage) => SynergyType::Spellblade,
            (Warrior, Archer) => SynergyType::Vanguard,
            (Warrior, Rogue) => SynergyType::Strikeforce,
            (Mage, Mage) => SynergyType::ArcaneCircle,
            (Mage, Archer) => SynergyType::SpellVolley,
            (Mage, Rogue) => SynergyType::Shadowcraft,
            (Archer, Archer) => SynergyType::Crossfire,
            (Archer, Rogue) => SynergyType::Huntsmen,
            (Rogue, Rogue) => SynergyType::Twinblades,
            // Unreachable: the key is sorted by class order
            _ => SynergyType::ShieldWall,
        }
    }
}

/// An active alliance between two living players
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alliance {
    pub id: AllianceId,
    pub members: [PlayerId; 2],
    pub synergy_type: SynergyType,
    /// Grows each round up to 1.0; scales the periodic bonus
    pub synergy_value: f32,
    pub created_round: u32,
}

impl Alliance {
    pub fn partner_of(&self, id: PlayerId) -> Option<PlayerId> {
        if self.members[0] == id {
            Some(self.members[1])
        } else if self.members[1] == id {
            Some(self.members[0])
        } else {
            None
        }
    }
}

/// A betrayal selected during the round pipeline; the arena executes the
/// attack and dissolves the alliance regardless of outcome.
#[derive(Debug, Clone, Copy)]
pub struct Betrayal {
    pub alliance_id: AllianceId,
    pub betrayer: PlayerId,
    pub victim: PlayerId,
}

/// Owner of all alliance state
///
/// Insertion order is kept so per-round processing is stable under a seed.
#[derive(Debug, Default)]
pub struct AllianceManager {
    alliances: HashMap<AllianceId, Alliance>,
    by_player: HashMap<PlayerId, AllianceId>,
    order: Vec<AllianceId>,
}

impl AllianceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form an alliance between two distinct living unallied players
    pub fn propose(
        &mut self,
        registry: &PlayerRegistry,
        a: PlayerId,
        b: PlayerId,
        round: u32,
    ) -> Result<AllianceId, ActionError> {
        if a == b {
            return Err(ActionError::SelfAlliance);
        }
        if !registry.is_alive(a) || !registry.is_alive(b) {
            return Err(ActionError::TargetNotLiving);
        }
        if self.by_player.contains_key(&a) || self.by_player.contains_key(&b) {
            return Err(ActionError::AlreadyAllied);
        }

        let class_a = registry.class(a).ok_or(ActionError::UnknownPlayer)?;
        let class_b = registry.class(b).ok_or(ActionError::UnknownPlayer)?;

        let id = Uuid::new_v4();
        let alliance = Alliance {
            id,
            members: [a, b],
            synergy_type: SynergyType::for_pair(class_a, class_b),
            synergy_value: consts::INITIAL_SYNERGY,
            created_round: round,
        };
        debug!(alliance = %id, ?alliance.synergy_type, "alliance formed");

        self.by_player.insert(a, id);
        self.by_player.insert(b, id);
        self.order.push(id);
        self.alliances.insert(id, alliance);
        Ok(id)
    }

    pub fn alliance_of(&self, player: PlayerId) -> Option<&Alliance> {
        self.by_player
            .get(&player)
            .and_then(|id| self.alliances.get(id))
    }

    pub fn get(&self, id: AllianceId) -> Option<&Alliance> {
        self.alliances.get(&id)
    }

    /// Active alliances in creation order
    pub fn active(&self) -> Vec<&Alliance> {
        self.order
            .iter()
            .filter_map(|id| self.alliances.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alliances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alliances.is_empty()
    }

    /// Grant each member the synergy bonus, then grow the synergy value.
    /// Returns `(alliance_id, bonus)` per alliance for notifications.
    pub fn apply_periodic_effects(
        &mut self,
        registry: &mut PlayerRegistry,
    ) -> Vec<(AllianceId, u32)> {
        let mut applied = Vec::new();
        for id in &self.order {
            let Some(alliance) = self.alliances.get_mut(id) else {
                continue;
            };
            let bonus = (alliance.synergy_value * consts::SYNERGY_STAT_SCALE) as u32;
            for member in alliance.members {
                if registry.is_alive(member) {
                    registry.heal(member, bonus);
                    registry.restore_energy(member, bonus);
                }
            }
            alliance.synergy_value =
                (alliance.synergy_value + consts::SYNERGY_GROWTH).min(consts::MAX_SYNERGY);
            applied.push((*id, bonus));
        }
        applied
    }

    /// Betrayal probability for a given round, clamped at `BETRAYAL_CAP`
    pub fn betrayal_chance(round: u32) -> f32 {
        (consts::BETRAYAL_RATE_PER_ROUND * round as f32).min(consts::BETRAYAL_CAP)
    }

    /// Roll betrayals for the current round, in creation order
    pub fn pending_betrayals(
        &self,
        selector: &mut EventSelector,
        round: u32,
    ) -> Vec<Betrayal> {
        let chance = Self::betrayal_chance(round);
        let mut betrayals = Vec::new();
        for id in &self.order {
            let Some(alliance) = self.alliances.get(id) else {
                continue;
            };
            if selector.roll(chance) {
                let betrayer_index = selector.choose_index(2);
                betrayals.push(Betrayal {
                    alliance_id: *id,
                    betrayer: alliance.members[betrayer_index],
                    victim: alliance.members[1 - betrayer_index],
                });
            }
        }
        betrayals
    }

    /// Explicit break; no combat is triggered on a voluntary dissolve
    pub fn dissolve(&mut self, id: AllianceId) -> Option<Alliance> {
        let alliance = self.alliances.remove(&id)?;
        for member in alliance.members {
            self.by_player.remove(&member);
        }
        self.order.retain(|a| *a != id);
        debug!(alliance = %id, "alliance dissolved");
        Some(alliance)
    }

    /// Tear down the alliance containing `player`, if any.
    /// Used the instant a member is eliminated or leaves.
    pub fn remove_player(&mut self, player: PlayerId) -> Option<Alliance> {
        let id = self.by_player.get(&player).copied()?;
        self.dissolve(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Player;

    fn roster(classes: &[Class]) -> (PlayerRegistry, Vec<PlayerId>) {
        let mut registry = PlayerRegistry::new();
        let ids: Vec<PlayerId> = classes
            .iter()
            .map(|class| {
                let id = Uuid::new_v4();
                registry.add_player(Player::new(id, *class));
                id
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_synergy_type_is_symmetric() {
        for a in Class::ALL {
            for b in Class::ALL {
                assert_eq!(SynergyType::for_pair(a, b), SynergyType::for_pair(b, a));
            }
        }
    }

    #[test]
    fn test_propose_validations() {
        let (mut registry, ids) = roster(&[Class::Warrior, Class::Mage, Class::Rogue]);
        let mut manager = AllianceManager::new();

        assert_eq!(
            manager.propose(&registry, ids[0], ids[0], 1).unwrap_err(),
            ActionError::SelfAlliance
        );

        registry.apply_damage(ids[2], 100);
        assert_eq!(
            manager.propose(&registry, ids[0], ids[2], 1).unwrap_err(),
            ActionError::TargetNotLiving
        );

        manager.propose(&registry, ids[0], ids[1], 1).unwrap();
        assert_eq!(
            manager.propose(&registry, ids[1], ids[0], 1).unwrap_err(),
            ActionError::AlreadyAllied
        );
    }

    #[test]
    fn test_periodic_effects_grant_and_grow() {
        let (mut registry, ids) = roster(&[Class::Warrior, Class::Mage]);
        let mut manager = AllianceManager::new();
        let id = manager.propose(&registry, ids[0], ids[1], 1).unwrap();

        registry.apply_damage(ids[0], 50);
        registry.spend_energy(ids[1], 50);

        let applied = manager.apply_periodic_effects(&mut registry);
        // floor(0.1 * 10) = 1
        assert_eq!(applied, vec![(id, 1)]);
        assert_eq!(registry.snapshot(ids[0]).unwrap().health, 51);
        assert_eq!(registry.snapshot(ids[1]).unwrap().energy, 51);

        let value = manager.get(id).unwrap().synergy_value;
        assert!((value - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_synergy_value_is_capped() {
        let (mut registry, ids) = roster(&[Class::Rogue, Class::Rogue]);
        let mut manager = AllianceManager::new();
        let id = manager.propose(&registry, ids[0], ids[1], 1).unwrap();

        for _ in 0..50 {
            manager.apply_periodic_effects(&mut registry);
        }
        assert!(manager.get(id).unwrap().synergy_value <= consts::MAX_SYNERGY);
    }

    #[test]
    fn test_betrayal_chance_is_clamped() {
        assert!(AllianceManager::betrayal_chance(1) < 0.03);
        assert_eq!(AllianceManager::betrayal_chance(25), consts::BETRAYAL_CAP);
        assert_eq!(AllianceManager::betrayal_chance(500), consts::BETRAYAL_CAP);
    }

    #[test]
    fn test_betrayal_names_both_members() {
        let (registry, ids) = roster(&[Class::Warrior, Class::Mage]);
        let mut manager = AllianceManager::new();
        manager.propose(&registry, ids[0], ids[1], 1).unwrap();

        let mut selector = EventSelector::with_seed(11);
        // Chance is clamped at the cap for huge rounds, so betrayals occur
        let betrayals: Vec<Betrayal> = (0..200)
            .flat_map(|_| manager.pending_betrayals(&mut selector, 1000))
            .collect();
        assert!(!betrayals.is_empty());
        for betrayal in betrayals {
            assert!(ids.contains(&betrayal.betrayer));
            assert!(ids.contains(&betrayal.victim));
            assert_ne!(betrayal.betrayer, betrayal.victim);
        }
    }

    #[test]
    fn test_remove_player_tears_down_alliance() {
        let (registry, ids) = roster(&[Class::Archer, Class::Rogue]);
        let mut manager = AllianceManager::new();
        manager.propose(&registry, ids[0], ids[1], 3).unwrap();

        let removed = manager.remove_player(ids[1]).unwrap();
        assert_eq!(removed.members, [ids[0], ids[1]]);
        assert!(manager.alliance_of(ids[0]).is_none());
        assert!(manager.alliance_of(ids[1]).is_none());
        assert!(manager.is_empty());
    }
}
