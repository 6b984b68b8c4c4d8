//! The per-player mutable state table.
//!
//! Every mutation of player state goes through one registry call that
//! performs the full operation; callers never read-modify-write around it.
//! Eliminated players (health 0) are frozen: mutators become no-ops and
//! the player drops out of `living_players`.

use hashbrown::HashMap;
use tracing::debug;

use crate::game::constants::stats;
use crate::game::state::{Class, Effect, EffectKind, Item, Player, PlayerId};

/// Table of per-player state, iterated in stable join order
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
    join_order: Vec<PlayerId>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_player(&mut self, player: Player) {
        if self.players.contains_key(&player.id) {
            return;
        }
        self.join_order.push(player.id);
        self.players.insert(player.id, player);
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.players.get(&id).is_some_and(Player::is_alive)
    }

    pub fn class(&self, id: PlayerId) -> Option<Class> {
        self.players.get(&id).map(|p| p.class)
    }

    /// Eventually-consistent copy for UI and notifications
    pub fn snapshot(&self, id: PlayerId) -> Option<Player> {
        self.players.get(&id).cloned()
    }

    /// Read-only view used by combat math within the serialization domain
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Living player ids in join order
    pub fn living_players(&self) -> Vec<PlayerId> {
        self.join_order
            .iter()
            .copied()
            .filter(|id| self.is_alive(*id))
            .collect()
    }

    pub fn living_count(&self) -> usize {
        self.join_order.iter().filter(|id| self.is_alive(**id)).count()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Apply damage; returns the new health, or `None` if the player is
    /// missing or already eliminated.
    pub fn apply_damage(&mut self, id: PlayerId, amount: u32) -> Option<u32> {
        let player = self.players.get_mut(&id).filter(|p| p.is_alive())?;
        player.health = player.health.saturating_sub(amount);
        Some(player.health)
    }

    pub fn heal(&mut self, id: PlayerId, amount: u32) -> Option<u32> {
        let player = self.players.get_mut(&id).filter(|p| p.is_alive())?;
        player.health = (player.health + amount).min(stats::MAX_HEALTH);
        Some(player.health)
    }

    pub fn restore_energy(&mut self, id: PlayerId, amount: u32) -> Option<u32> {
        let player = self.players.get_mut(&id).filter(|p| p.is_alive())?;
        player.energy = (player.energy + amount).min(stats::MAX_ENERGY);
        Some(player.energy)
    }

    /// Spend energy if available; false leaves the player untouched
    pub fn spend_energy(&mut self, id: PlayerId, amount: u32) -> bool {
        match self.players.get_mut(&id).filter(|p| p.is_alive()) {
            Some(player) if player.energy >= amount => {
                player.energy -= amount;
                true
            }
            _ => false,
        }
    }

    pub fn add_effect(&mut self, id: PlayerId, effect: Effect) {
        if let Some(player) = self.players.get_mut(&id).filter(|p| p.is_alive()) {
            player.effects.push(effect);
        }
    }

    pub fn charges(&self, id: PlayerId) -> u8 {
        self.players.get(&id).map_or(0, |p| p.special_uses)
    }

    /// Consume one special charge; false means none remained
    pub fn spend_charge(&mut self, id: PlayerId) -> bool {
        match self.players.get_mut(&id).filter(|p| p.is_alive()) {
            Some(player) if player.special_uses > 0 => {
                player.special_uses -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn restore_charge(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(&id).filter(|p| p.is_alive()) {
            player.special_uses = (player.special_uses + 1).min(stats::MAX_CHARGES);
        }
    }

    pub fn record_kill(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.kills += 1;
        }
    }

    pub fn grant_item(&mut self, id: PlayerId, item: Item) {
        if let Some(player) = self.players.get_mut(&id).filter(|p| p.is_alive()) {
            player.inventory.push(item);
        }
    }

    /// Remove and return the item at `index`; `None` if out of bounds
    pub fn consume_item(&mut self, id: PlayerId, index: usize) -> Option<Item> {
        let player = self.players.get_mut(&id).filter(|p| p.is_alive())?;
        if index >= player.inventory.len() {
            return None;
        }
        Some(player.inventory.remove(index))
    }

    /// One end-of-round pass: apply poison and regeneration, then decrement
    /// durations and drop expired effects. Returns ids eliminated by poison.
    pub fn tick_effects(&mut self) -> Vec<PlayerId> {
        let mut eliminated = Vec::new();
        for id in self.join_order.clone() {
            let Some(player) = self.players.get_mut(&id).filter(|p| p.is_alive()) else {
                continue;
            };

            let mut damage = 0u32;
            let mut heal = 0u32;
            for effect in &player.effects {
                match effect.kind {
                    EffectKind::Poison => damage += effect.magnitude.max(0.0) as u32,
                    EffectKind::Regeneration => heal += effect.magnitude.max(0.0) as u32,
                    _ => {}
                }
            }

            player.health = (player.health + heal).min(stats::MAX_HEALTH);
            player.health = player.health.saturating_sub(damage);

            for effect in &mut player.effects {
                effect.rounds_left = effect.rounds_left.saturating_sub(1);
            }
            player.effects.retain(|e| e.rounds_left > 0);

            if player.health == 0 {
                debug!(player = %id, "player succumbed to poison");
                eliminated.push(id);
            }
        }
        eliminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn registry_with(class: Class) -> (PlayerRegistry, PlayerId) {
        let mut registry = PlayerRegistry::new();
        let id = Uuid::new_v4();
        registry.add_player(Player::new(id, class));
        (registry, id)
    }

    #[test]
    fn test_damage_and_heal_clamp() {
        let (mut registry, id) = registry_with(Class::Warrior);

        assert_eq!(registry.apply_damage(id, 30), Some(70));
        assert_eq!(registry.heal(id, 1000), Some(100));
        assert_eq!(registry.apply_damage(id, 1000), Some(0));
        // eliminated: further mutation is a no-op
        assert_eq!(registry.heal(id, 50), None);
        assert_eq!(registry.apply_damage(id, 5), None);
        assert!(!registry.is_alive(id));
    }

    #[test]
    fn test_energy_clamp_and_spend() {
        let (mut registry, id) = registry_with(Class::Mage);

        assert!(registry.spend_energy(id, 40));
        assert_eq!(registry.restore_energy(id, 500), Some(100));
        assert!(!registry.spend_energy(id, 101));
        assert_eq!(registry.snapshot(id).unwrap().energy, 100);
    }

    #[test]
    fn test_living_players_join_order_excludes_dead() {
        let mut registry = PlayerRegistry::new();
        let ids: Vec<PlayerId> = (0..3).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            registry.add_player(Player::new(*id, Class::Rogue));
        }

        registry.apply_damage(ids[1], 100);

        assert_eq!(registry.living_players(), vec![ids[0], ids[2]]);
        assert_eq!(registry.living_count(), 2);
    }

    #[test]
    fn test_charges_spend_and_restore_cap() {
        let (mut registry, id) = registry_with(Class::Archer);

        assert!(registry.spend_charge(id));
        assert!(registry.spend_charge(id));
        assert!(!registry.spend_charge(id));
        registry.restore_charge(id);
        registry.restore_charge(id);
        registry.restore_charge(id);
        assert_eq!(registry.charges(id), stats::MAX_CHARGES);
    }

    #[test]
    fn test_tick_effects_poison_regen_and_expiry() {
        let (mut registry, id) = registry_with(Class::Rogue);
        registry.add_effect(id, Effect::new(EffectKind::Poison, 2, 10.0));
        registry.add_effect(id, Effect::new(EffectKind::Regeneration, 1, 5.0));
        registry.apply_damage(id, 50);

        let eliminated = registry.tick_effects();
        assert!(eliminated.is_empty());
        // 50 - 10 poison + 5 regen
        assert_eq!(registry.snapshot(id).unwrap().health, 45);
        // regen expired, poison has one round left
        let effects = registry.snapshot(id).unwrap().effects;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, EffectKind::Poison);
        assert_eq!(effects[0].rounds_left, 1);

        let eliminated = registry.tick_effects();
        assert!(eliminated.is_empty());
        assert!(registry.snapshot(id).unwrap().effects.is_empty());
    }

    #[test]
    fn test_poison_can_eliminate() {
        let (mut registry, id) = registry_with(Class::Mage);
        registry.apply_damage(id, 95);
        registry.add_effect(id, Effect::new(EffectKind::Poison, 3, 10.0));

        let eliminated = registry.tick_effects();
        assert_eq!(eliminated, vec![id]);
        assert!(!registry.is_alive(id));
    }

    #[test]
    fn test_consume_item_bounds() {
        let (mut registry, id) = registry_with(Class::Warrior);
        registry.grant_item(
            id,
            crate::game::state::Item::weapon("Sword", 40, crate::game::state::Rarity::Common, None),
        );

        assert!(registry.consume_item(id, 3).is_none());
        assert!(registry.consume_item(id, 0).is_some());
        assert!(registry.consume_item(id, 0).is_none());
    }
}
