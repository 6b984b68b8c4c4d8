//! Consumable item activation.
//!
//! Validation happens before any mutation: a rejected use leaves the item
//! at its inventory index and the rest of the state untouched.

use tracing::debug;

use crate::game::constants::items;
use crate::game::error::ActionError;
use crate::game::events::EventSelector;
use crate::game::registry::PlayerRegistry;
use crate::game::state::{Effect, EffectKind, ItemUse, PlayerId};

/// Result of a successful item use
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub user: PlayerId,
    pub item_name: String,
    /// Human-readable summary for the notification sink
    pub description: String,
    /// Opponents eliminated by the item (user gets kill credit)
    pub eliminated: Vec<PlayerId>,
}

/// Use the consumable at `index` in the player's inventory.
///
/// Equipped items (weapons, armor) contribute passively and cannot be
/// "used"; selecting one is `InvalidItem`. A class-locked item held by the
/// wrong class is `ClassMismatch` and stays where it is.
pub fn use_item(
    registry: &mut PlayerRegistry,
    selector: &mut EventSelector,
    user: PlayerId,
    index: usize,
) -> Result<ItemReport, ActionError> {
    if !registry.is_alive(user) {
        return Err(ActionError::InvalidActorState);
    }

    let (on_use, name) = {
        let player = registry.get(user).ok_or(ActionError::UnknownPlayer)?;
        let item = player.inventory.get(index).ok_or(ActionError::InvalidItem)?;
        if let Some(required) = item.class_lock {
            if required != player.class {
                return Err(ActionError::ClassMismatch(required));
            }
        }
        let on_use = item.on_use.ok_or(ActionError::InvalidItem)?;
        (on_use, item.name.clone())
    };

    // Validations passed; the consumable leaves the inventory now
    registry
        .consume_item(user, index)
        .ok_or(ActionError::InvalidItem)?;
    debug!(player = %user, item = %name, "item used");

    let mut eliminated = Vec::new();
    let description = match on_use {
        ItemUse::Heal(amount) => {
            let health = registry.heal(user, amount).unwrap_or(0);
            format!("restores {amount} health (now {health})")
        }
        ItemUse::RestoreEnergyAndCharge(amount) => {
            registry.restore_energy(user, amount);
            registry.restore_charge(user);
            format!("restores {amount} energy and a special charge")
        }
        ItemUse::GrantEffect(effect) => {
            registry.add_effect(user, effect);
            format!("grants {:?} for {} rounds", effect.kind, effect.rounds_left)
        }
        ItemUse::PoisonTarget => match selector.pick_opponent(registry, user) {
            Some(target) => {
                registry.add_effect(
                    target,
                    Effect::new(EffectKind::Poison, items::POISON_ROUNDS, items::POISON_DAMAGE),
                );
                "poisons an unsuspecting opponent".to_string()
            }
            None => "fizzles with no opponent in reach".to_string(),
        },
        ItemUse::ChainLightning => {
            let targets = selector.pick_targets(registry, user, items::CHAIN_LIGHTNING_TARGETS);
            for target in &targets {
                if let Some(0) = registry.apply_damage(*target, items::CHAIN_LIGHTNING_DAMAGE) {
                    registry.record_kill(user);
                    eliminated.push(*target);
                }
            }
            format!("arcs lightning through {} opponents", targets.len())
        }
    };

    Ok(ItemReport {
        user,
        item_name: name,
        description,
        eliminated,
    })
}
