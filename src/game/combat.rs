//! Combat resolution: plain attacks and class special abilities.
//!
//! Pure, non-blocking computation over the registry; callers handle the
//! consequences of eliminations (alliance teardown, notifications).

use tracing::debug;

use crate::game::constants::{ability, combat};
use crate::game::error::ActionError;
use crate::game::events::EventSelector;
use crate::game::registry::PlayerRegistry;
use crate::game::state::{Class, Effect, EffectKind, PlayerId};

/// Result of one resolved attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatOutcome {
    pub attacker: PlayerId,
    pub defender: PlayerId,
    /// Integer damage actually dealt (0 on dodge)
    pub damage: u32,
    pub critical: bool,
    pub dodged: bool,
    /// Damage returned to the attacker by a reflect effect
    pub reflected: u32,
    pub defender_health: u32,
    pub defender_eliminated: bool,
    /// Reflected damage can finish off the attacker
    pub attacker_eliminated: bool,
}

/// Result of one special ability use
#[derive(Debug, Clone)]
pub struct SpecialOutcome {
    pub attacker: PlayerId,
    /// Human-readable summary for the notification sink
    pub description: String,
    /// Damage applied per target
    pub hits: Vec<(PlayerId, u32)>,
    /// Targets eliminated by this ability (attacker gets kill credit)
    pub eliminated: Vec<PlayerId>,
    pub attacker_eliminated: bool,
    pub charges_left: u8,
}

/// Resolve a plain attack between two living players.
///
/// Base damage plus scaled best-weapon power, times the class modifier;
/// the defender rolls dodge first, then armor reduces multiplicatively and
/// mitigation effects shave further fractions.
pub fn resolve_attack(
    registry: &mut PlayerRegistry,
    selector: &mut EventSelector,
    attacker_id: PlayerId,
    defender_id: PlayerId,
) -> Result<CombatOutcome, ActionError> {
    if !registry.is_alive(attacker_id) {
        return Err(ActionError::InvalidActorState);
    }
    if !registry.is_alive(defender_id) {
        return Err(ActionError::TargetNotLiving);
    }

    let (mut damage, attacker_class, stealthed, double_damage, berserk) = {
        let attacker = registry.get(attacker_id).ok_or(ActionError::UnknownPlayer)?;
        let weapon_power = attacker.best_weapon().map_or(0.0, |w| w.power as f32);
        (
            combat::BASE_DAMAGE + weapon_power * combat::WEAPON_POWER_SCALE,
            attacker.class,
            attacker.has_effect(EffectKind::Stealth),
            attacker.has_effect(EffectKind::DoubleDamage),
            attacker.has_effect(EffectKind::Berserk),
        )
    };

    let mut critical = false;
    match attacker_class {
        Class::Warrior => damage *= combat::WARRIOR_MODIFIER,
        Class::Archer => {
            critical = selector.roll_critical(attacker_class.spec().crit_chance);
            if critical {
                damage *= 2.0;
            }
        }
        Class::Mage => {
            // Empowered cast only if the energy is there; spend_energy is
            // the atomic check-and-debit
            if registry.spend_energy(attacker_id, combat::MAGE_ENERGY_COST) {
                damage *= combat::MAGE_MODIFIER;
            }
        }
        Class::Rogue => {
            if stealthed {
                damage *= combat::ROGUE_STEALTH_MODIFIER;
            }
        }
    }
    if double_damage || berserk {
        damage *= 2.0;
    }

    let defender = registry.get(defender_id).ok_or(ActionError::UnknownPlayer)?;
    let dodge_chance = defender.class.spec().dodge_chance + defender.item_dodge_bonus();
    if selector.roll_dodge(dodge_chance) {
        debug!(attacker = %attacker_id, defender = %defender_id, "attack dodged");
        return Ok(CombatOutcome {
            attacker: attacker_id,
            defender: defender_id,
            damage: 0,
            critical,
            dodged: true,
            reflected: 0,
            defender_health: defender.health,
            defender_eliminated: false,
            attacker_eliminated: false,
        });
    }

    if let Some(armor) = defender.best_armor() {
        damage *= 1.0 - armor.defense as f32 * combat::ARMOR_DEFENSE_SCALE;
    }
    if defender.has_effect_or_passive(EffectKind::SpellShield) {
        damage *= combat::SPELL_SHIELD_FACTOR;
    }
    if defender.has_effect_or_passive(EffectKind::Fortify) {
        damage *= combat::FORTIFY_FACTOR;
    }

    let reflects = defender.has_effect_or_passive(EffectKind::ReflectDamage);
    let final_damage = damage.max(0.0) as u32;
    let reflected = if reflects {
        (final_damage as f32 * combat::REFLECT_FRACTION) as u32
    } else {
        0
    };

    let defender_health = registry
        .apply_damage(defender_id, final_damage)
        .unwrap_or(0);
    let defender_eliminated = defender_health == 0;
    if defender_eliminated {
        registry.record_kill(attacker_id);
    }

    let mut attacker_eliminated = false;
    if reflected > 0 {
        if let Some(0) = registry.apply_damage(attacker_id, reflected) {
            attacker_eliminated = true;
        }
    }

    Ok(CombatOutcome {
        attacker: attacker_id,
        defender: defender_id,
        damage: final_damage,
        critical,
        dodged: false,
        reflected,
        defender_health,
        defender_eliminated,
        attacker_eliminated,
    })
}

/// Resolve a class special ability against `target_id`.
///
/// The charge check happens before any mutation: with no charges left the
/// call fails with `NoChargesRemaining` and state is untouched.
pub fn resolve_special(
    registry: &mut PlayerRegistry,
    selector: &mut EventSelector,
    attacker_id: PlayerId,
    target_id: PlayerId,
) -> Result<SpecialOutcome, ActionError> {
    if !registry.is_alive(attacker_id) {
        return Err(ActionError::InvalidActorState);
    }
    if !registry.is_alive(target_id) {
        return Err(ActionError::TargetNotLiving);
    }
    if registry.charges(attacker_id) == 0 {
        return Err(ActionError::NoChargesRemaining);
    }

    let class = registry
        .class(attacker_id)
        .ok_or(ActionError::UnknownPlayer)?;
    registry.spend_charge(attacker_id);

    let base = combat::BASE_DAMAGE * ability::SPECIAL_DAMAGE_MULT;
    let mut hits = Vec::new();
    let mut eliminated = Vec::new();
    let mut attacker_eliminated = false;

    let description = match class {
        Class::Warrior => {
            // Berserk: double the special damage, take a cut of it yourself
            let damage = (base * ability::BERSERK_MULT) as u32;
            let self_damage = (damage as f32 * ability::BERSERK_SELF_FRACTION) as u32;

            if let Some(0) = registry.apply_damage(target_id, damage) {
                registry.record_kill(attacker_id);
                eliminated.push(target_id);
            }
            hits.push((target_id, damage));

            if let Some(0) = registry.apply_damage(attacker_id, self_damage) {
                attacker_eliminated = true;
            }
            format!("enters a berserker rage and deals {damage} damage")
        }
        Class::Mage => {
            if selector.roll(ability::ESCAPE_SUCCESS_CHANCE) {
                registry.heal(attacker_id, combat::HEAL_AMOUNT);
                registry.add_effect(
                    attacker_id,
                    Effect::new(EffectKind::SpellShield, ability::ESCAPE_SHIELD_ROUNDS, 0.0),
                );
                "teleports to safety and recovers health".to_string()
            } else {
                "failed to teleport".to_string()
            }
        }
        Class::Archer => {
            let damage = (base * ability::VOLLEY_FRACTION) as u32;
            let targets = selector.pick_targets(registry, attacker_id, ability::VOLLEY_TARGETS);
            for id in &targets {
                if let Some(0) = registry.apply_damage(*id, damage) {
                    registry.record_kill(attacker_id);
                    eliminated.push(*id);
                }
                hits.push((*id, damage));
            }
            format!("fires a volley of arrows, hitting {} targets", hits.len())
        }
        Class::Rogue => {
            let target_health = registry.get(target_id).map_or(0, |p| p.health);
            let description = if target_health < ability::EXECUTE_THRESHOLD {
                registry.apply_damage(target_id, target_health);
                registry.record_kill(attacker_id);
                eliminated.push(target_id);
                hits.push((target_id, target_health));
                "executes a lethal assassination".to_string()
            } else {
                let damage = (base * ability::EXECUTE_FALLBACK_MULT) as u32;
                if let Some(0) = registry.apply_damage(target_id, damage) {
                    registry.record_kill(attacker_id);
                    eliminated.push(target_id);
                }
                hits.push((target_id, damage));
                format!("strikes from the shadows for {damage} damage")
            };
            registry.add_effect(
                attacker_id,
                Effect::new(EffectKind::Stealth, ability::ASSASSINATE_STEALTH_ROUNDS, 0.0),
            );
            description
        }
    };

    Ok(SpecialOutcome {
        attacker: attacker_id,
        description,
        hits,
        eliminated,
        attacker_eliminated,
        charges_left: registry.charges(attacker_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Item, Player, Rarity};
    use uuid::Uuid;

    fn duel_setup(attacker_class: Class, defender_class: Class) -> (PlayerRegistry, PlayerId, PlayerId) {
        let mut registry = PlayerRegistry::new();
        let attacker = Uuid::new_v4();
        let defender = Uuid::new_v4();
        registry.add_player(Player::new(attacker, attacker_class));
        registry.add_player(Player::new(defender, defender_class));
        (registry, attacker, defender)
    }

    #[test]
    fn test_warrior_duel_deals_18_and_no_kill_credit() {
        // Warrior vs Mage, no weapons, no armor: 15 * 1.2 = 18.
        // Neither class rolls dodge or crit, so the outcome is scripted.
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Mage);

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();

        assert!(!outcome.dodged);
        assert!(!outcome.critical);
        assert_eq!(outcome.damage, 18);
        assert_eq!(outcome.defender_health, 82);
        assert!(!outcome.defender_eliminated);
        assert_eq!(registry.snapshot(attacker).unwrap().kills, 0);
    }

    #[test]
    fn test_kill_credit_on_elimination() {
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Mage);
        registry.apply_damage(defender, 90); // 10 health left

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();

        assert!(outcome.defender_eliminated);
        assert_eq!(outcome.defender_health, 0);
        assert_eq!(registry.snapshot(attacker).unwrap().kills, 1);
        assert!(!registry.is_alive(defender));
    }

    #[test]
    fn test_weapon_power_scales_damage() {
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Mage);
        registry.grant_item(attacker, Item::weapon("Iron Sword", 40, Rarity::Common, None));

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();

        // (15 + 40 * 0.1) * 1.2 = 22.8 -> 22
        assert_eq!(outcome.damage, 22);
    }

    #[test]
    fn test_mage_spends_energy_for_bonus_until_exhausted() {
        let (mut registry, attacker, defender) = duel_setup(Class::Mage, Class::Warrior);

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();
        // 15 * 1.5 = 22.5 -> 22
        assert_eq!(outcome.damage, 22);
        assert_eq!(registry.snapshot(attacker).unwrap().energy, 80);

        // Drain energy below the cost: no bonus, no debit
        while registry.spend_energy(attacker, 20) {}
        let before = registry.snapshot(attacker).unwrap().energy;
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();
        assert_eq!(outcome.damage, 15);
        assert_eq!(registry.snapshot(attacker).unwrap().energy, before);
    }

    #[test]
    fn test_rogue_stealth_multiplier() {
        let (mut registry, attacker, defender) = duel_setup(Class::Rogue, Class::Warrior);
        registry.add_effect(attacker, Effect::new(EffectKind::Stealth, 1, 0.0));

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();
        // 15 * 1.8 = 27
        assert_eq!(outcome.damage, 27);
    }

    #[test]
    fn test_armor_reduction_is_multiplicative() {
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Mage);
        registry.grant_item(defender, Item::armor("Iron Shield", 30, Rarity::Common, None));

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();
        // 18 * (1 - 30 * 0.001) = 17.46 -> 17
        assert_eq!(outcome.damage, 17);
    }

    #[test]
    fn test_spell_shield_mitigation() {
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Mage);
        registry.add_effect(defender, Effect::new(EffectKind::SpellShield, 2, 0.0));

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();
        // 18 * 0.7 = 12.6 -> 12
        assert_eq!(outcome.damage, 12);
    }

    #[test]
    fn test_guaranteed_dodge_deals_no_damage() {
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Mage);
        registry.grant_item(
            defender,
            Item::armor("Mirror Cloak", 0, Rarity::Epic, None).with_dodge_bonus(1.0),
        );

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();
        assert!(outcome.dodged);
        assert_eq!(outcome.damage, 0);
        assert_eq!(registry.snapshot(defender).unwrap().health, 100);
    }

    #[test]
    fn test_reflect_returns_fraction_to_attacker() {
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Warrior);
        registry.add_effect(defender, Effect::new(EffectKind::ReflectDamage, 2, 0.0));

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_attack(&mut registry, &mut selector, attacker, defender).unwrap();
        assert_eq!(outcome.damage, 18);
        // floor(18 * 0.3) = 5
        assert_eq!(outcome.reflected, 5);
        assert_eq!(registry.snapshot(attacker).unwrap().health, 95);
    }

    #[test]
    fn test_special_no_charges_is_rejected_without_mutation() {
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Mage);
        while registry.spend_charge(attacker) {}
        let before = registry.snapshot(defender).unwrap();

        let mut selector = EventSelector::with_seed(0);
        let result = resolve_special(&mut registry, &mut selector, attacker, defender);

        assert_eq!(result.unwrap_err(), ActionError::NoChargesRemaining);
        assert_eq!(registry.snapshot(defender).unwrap().health, before.health);
        assert_eq!(registry.charges(attacker), 0);
    }

    #[test]
    fn test_warrior_berserk_hits_both_sides() {
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Mage);

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_special(&mut registry, &mut selector, attacker, defender).unwrap();

        // 30 * 2 = 60 to the target, 15 back to the attacker
        assert_eq!(outcome.hits, vec![(defender, 60)]);
        assert_eq!(registry.snapshot(defender).unwrap().health, 40);
        assert_eq!(registry.snapshot(attacker).unwrap().health, 85);
        assert_eq!(outcome.charges_left, 1);
    }

    #[test]
    fn test_rogue_execute_below_threshold() {
        let (mut registry, attacker, defender) = duel_setup(Class::Rogue, Class::Mage);
        registry.apply_damage(defender, 80); // 20 health, below the 30 threshold

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_special(&mut registry, &mut selector, attacker, defender).unwrap();

        assert_eq!(outcome.eliminated, vec![defender]);
        assert!(!registry.is_alive(defender));
        assert_eq!(registry.snapshot(attacker).unwrap().kills, 1);
        assert!(registry.snapshot(attacker).unwrap().has_effect(EffectKind::Stealth));
    }

    #[test]
    fn test_rogue_heavy_hit_above_threshold() {
        let (mut registry, attacker, defender) = duel_setup(Class::Rogue, Class::Warrior);

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_special(&mut registry, &mut selector, attacker, defender).unwrap();

        // 30 * 1.5 = 45
        assert_eq!(outcome.hits, vec![(defender, 45)]);
        assert_eq!(registry.snapshot(defender).unwrap().health, 55);
        assert!(outcome.eliminated.is_empty());
    }

    #[test]
    fn test_archer_volley_hits_up_to_three() {
        let mut registry = PlayerRegistry::new();
        let archer = Uuid::new_v4();
        registry.add_player(Player::new(archer, Class::Archer));
        let others: Vec<PlayerId> = (0..4)
            .map(|_| {
                let id = Uuid::new_v4();
                registry.add_player(Player::new(id, Class::Warrior));
                id
            })
            .collect();

        let mut selector = EventSelector::with_seed(0);
        let outcome = resolve_special(&mut registry, &mut selector, archer, others[0]).unwrap();

        // floor(30 * 0.6) = 18 per target, capped at three targets
        assert_eq!(outcome.hits.len(), 3);
        assert!(outcome.hits.iter().all(|(_, d)| *d == 18));
        assert_eq!(registry.snapshot(others[3]).unwrap().health, 100);
    }

    #[test]
    fn test_attack_against_dead_target_is_target_not_living() {
        let (mut registry, attacker, defender) = duel_setup(Class::Warrior, Class::Mage);
        registry.apply_damage(defender, 100);

        let mut selector = EventSelector::with_seed(0);
        let result = resolve_attack(&mut registry, &mut selector, attacker, defender);
        assert_eq!(result.unwrap_err(), ActionError::TargetNotLiving);
    }
}
