//! Per-class dispatch table: combat tuning, event modifiers, starter kits
//! and treasure pools.
//!
//! Class-conditioned behavior lives here as one record per class so the
//! combat and ability code stays free of repeated switch logic.

use crate::game::constants::{combat, items};
use crate::game::state::{Class, Effect, EffectKind, Item, ItemUse, Rarity};

/// Static tuning record for one class
#[derive(Debug, Clone, Copy)]
pub struct ClassSpec {
    pub class: Class,
    /// Critical strike chance (only Archers roll it on plain attacks)
    pub crit_chance: f32,
    /// Innate dodge chance
    pub dodge_chance: f32,
    /// Multiplier applied to event damage taken
    pub event_damage_mod: f32,
    /// Multiplier applied to event healing received
    pub event_heal_mod: f32,
    /// Display name of the class special ability
    pub special_name: &'static str,
}

const WARRIOR: ClassSpec = ClassSpec {
    class: Class::Warrior,
    crit_chance: combat::CRIT_CHANCE,
    dodge_chance: 0.0,
    event_damage_mod: 0.8,
    event_heal_mod: 1.2,
    special_name: "berserk",
};

const MAGE: ClassSpec = ClassSpec {
    class: Class::Mage,
    crit_chance: combat::CRIT_CHANCE,
    dodge_chance: 0.0,
    event_damage_mod: 1.2,
    event_heal_mod: 1.1,
    special_name: "teleport",
};

const ARCHER: ClassSpec = ClassSpec {
    class: Class::Archer,
    crit_chance: 0.25,
    dodge_chance: 0.0,
    event_damage_mod: 1.1,
    event_heal_mod: 0.9,
    special_name: "multishot",
};

const ROGUE: ClassSpec = ClassSpec {
    class: Class::Rogue,
    crit_chance: combat::CRIT_CHANCE,
    dodge_chance: 0.2,
    event_damage_mod: 1.3,
    event_heal_mod: 0.8,
    special_name: "assassinate",
};

impl Class {
    pub fn spec(&self) -> &'static ClassSpec {
        match self {
            Class::Warrior => &WARRIOR,
            Class::Mage => &MAGE,
            Class::Archer => &ARCHER,
            Class::Rogue => &ROGUE,
        }
    }
}

/// Starting equipment handed out when a player locks in a class
pub fn starter_kit(class: Class) -> Vec<Item> {
    match class {
        Class::Warrior => vec![
            Item::weapon("Iron Sword", 40, Rarity::Common, Some(Class::Warrior)),
            Item::armor("Iron Shield", 30, Rarity::Common, Some(Class::Warrior)),
        ],
        Class::Mage => vec![
            Item::weapon("Apprentice Staff", 45, Rarity::Common, Some(Class::Mage)),
            Item::consumable(
                "Spellbook",
                Rarity::Common,
                Some(Class::Mage),
                ItemUse::RestoreEnergyAndCharge(items::MANA_RESTORE),
            ),
        ],
        Class::Archer => vec![
            Item::weapon("Hunting Bow", 35, Rarity::Common, Some(Class::Archer)),
            Item::consumable(
                "Quiver",
                Rarity::Common,
                Some(Class::Archer),
                ItemUse::GrantEffect(Effect::new(
                    EffectKind::DoubleDamage,
                    items::DOUBLE_DAMAGE_ROUNDS,
                    0.0,
                )),
            ),
        ],
        Class::Rogue => vec![
            Item::weapon("Steel Dagger", 30, Rarity::Common, Some(Class::Rogue)),
            Item::consumable(
                "Smoke Bomb",
                Rarity::Common,
                Some(Class::Rogue),
                ItemUse::GrantEffect(Effect::new(
                    EffectKind::Stealth,
                    items::STEALTH_ROUNDS,
                    0.0,
                )),
            ),
        ],
    }
}

/// Treasure drops a player of this class can find
///
/// Class gear first, then artifacts anyone can pull.
pub fn treasure_pool(class: Class) -> Vec<Item> {
    let mut pool = match class {
        Class::Warrior => vec![
            Item::weapon("Excalibur", 90, Rarity::Legendary, Some(Class::Warrior)),
            Item::armor("Holy Aegis", 85, Rarity::Legendary, Some(Class::Warrior))
                .with_passive(EffectKind::ReflectDamage),
        ],
        Class::Mage => vec![
            Item::weapon("Mystic Staff", 85, Rarity::Legendary, Some(Class::Mage)),
            Item::armor("Ethereal Robe", 75, Rarity::Epic, Some(Class::Mage))
                .with_passive(EffectKind::SpellShield),
        ],
        Class::Archer => vec![
            Item::weapon("Artemis Bow", 75, Rarity::Epic, Some(Class::Archer)),
            Item::consumable(
                "Poison Vial",
                Rarity::Epic,
                Some(Class::Archer),
                ItemUse::PoisonTarget,
            ),
        ],
        Class::Rogue => vec![
            Item::weapon("Shadow Blade", 70, Rarity::Epic, Some(Class::Rogue)),
            Item::armor("Fox Cloak", 65, Rarity::Epic, Some(Class::Rogue)).with_dodge_bonus(0.15),
        ],
    };

    pool.push(Item::consumable(
        "Dragon Heart",
        Rarity::Legendary,
        None,
        ItemUse::Heal(items::REGEN_HEAL),
    ));
    pool.push(Item::consumable(
        "Thunder Essence",
        Rarity::Epic,
        None,
        ItemUse::ChainLightning,
    ));
    pool
}
