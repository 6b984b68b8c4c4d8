//! Core state definitions: players, classes, effects, items.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::game::constants::stats;

/// Unique player identifier (opaque external user id)
pub type PlayerId = Uuid;

/// Unique alliance identifier
pub type AllianceId = Uuid;

/// Character classes (closed set)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Class {
    Warrior,
    Mage,
    Archer,
    Rogue,
}

impl Class {
    /// All classes, in display order
    pub const ALL: [Class; 4] = [Class::Warrior, Class::Mage, Class::Archer, Class::Rogue];

    pub fn name(&self) -> &'static str {
        match self {
            Class::Warrior => "warrior",
            Class::Mage => "mage",
            Class::Archer => "archer",
            Class::Rogue => "rogue",
        }
    }
}

impl Default for Class {
    /// Assigned when a player never answers the class prompt
    fn default() -> Self {
        Class::Warrior
    }
}

/// Timed status modifier kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EffectKind {
    /// Deals `magnitude` damage each round
    Poison,
    /// Rogues deal bonus damage while stealthed
    Stealth,
    /// Reduces incoming damage while active
    SpellShield,
    /// Bonus outgoing damage
    Berserk,
    /// Heals `magnitude` health each round
    Regeneration,
    /// Returns a fraction of received damage to the attacker
    ReflectDamage,
    /// Doubles outgoing damage
    DoubleDamage,
    /// Reduces incoming damage (warrior flavored)
    Fortify,
}

/// A timed status effect attached to a single player
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    /// Remaining duration in rounds; decremented once per round, removed at 0
    pub rounds_left: u32,
    /// Effect-specific payload (poison damage, regen heal, stealth bonus)
    pub magnitude: f32,
}

impl Effect {
    pub fn new(kind: EffectKind, rounds_left: u32, magnitude: f32) -> Self {
        Self {
            kind,
            rounds_left,
            magnitude,
        }
    }
}

/// Item slot: equipped items contribute passively to combat
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemSlot {
    Weapon,
    Armor,
    Artifact,
}

/// Item rarity tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rarity {
    Common,
    Epic,
    Legendary,
}

/// On-use payload for consumable items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ItemUse {
    /// Restore health
    Heal(u32),
    /// Restore energy and one special charge
    RestoreEnergyAndCharge(u32),
    /// Attach an effect to the user
    GrantEffect(Effect),
    /// Poison a random living opponent
    PoisonTarget,
    /// Strike up to N opponents for fixed damage
    ChainLightning,
}

/// An inventory item definition
///
/// `consumable: false` items are "equipped": weapons add power and armor
/// adds defense passively during combat. Consumables apply their `on_use`
/// payload once and are removed from the inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub name: String,
    pub slot: ItemSlot,
    /// Attack contribution for weapons
    pub power: u32,
    /// Damage reduction contribution for armor
    pub defense: u32,
    pub rarity: Rarity,
    /// Some items may only be used by one class
    pub class_lock: Option<Class>,
    /// Effect applied when the item is used (consumables)
    pub on_use: Option<ItemUse>,
    pub consumable: bool,
    /// Extra dodge chance while equipped (e.g. a Fox Cloak)
    pub dodge_bonus: f32,
    /// Effect the item counts as while equipped (e.g. reflect on a Holy Aegis)
    pub passive: Option<EffectKind>,
}

impl Item {
    /// Passive equipped weapon
    pub fn weapon(name: &str, power: u32, rarity: Rarity, class_lock: Option<Class>) -> Self {
        Self {
            name: name.to_string(),
            slot: ItemSlot::Weapon,
            power,
            defense: 0,
            rarity,
            class_lock,
            on_use: None,
            consumable: false,
            dodge_bonus: 0.0,
            passive: None,
        }
    }

    /// Passive equipped armor
    pub fn armor(name: &str, defense: u32, rarity: Rarity, class_lock: Option<Class>) -> Self {
        Self {
            name: name.to_string(),
            slot: ItemSlot::Armor,
            power: 0,
            defense,
            rarity,
            class_lock,
            on_use: None,
            consumable: false,
            dodge_bonus: 0.0,
            passive: None,
        }
    }

    /// Single-use artifact
    pub fn consumable(
        name: &str,
        rarity: Rarity,
        class_lock: Option<Class>,
        on_use: ItemUse,
    ) -> Self {
        Self {
            name: name.to_string(),
            slot: ItemSlot::Artifact,
            power: 0,
            defense: 0,
            rarity,
            class_lock,
            on_use: Some(on_use),
            consumable: true,
            dodge_bonus: 0.0,
            passive: None,
        }
    }

    pub fn with_dodge_bonus(mut self, bonus: f32) -> Self {
        self.dodge_bonus = bonus;
        self
    }

    pub fn with_passive(mut self, kind: EffectKind) -> Self {
        self.passive = Some(kind);
        self
    }
}

/// Per-player mutable state
///
/// All mutation goes through `PlayerRegistry`; nothing outside the registry
/// holds a `&mut Player`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub class: Class,
    /// Health, clamped to [0, 100]; 0 means eliminated
    pub health: u32,
    /// Energy, clamped to [0, 100]
    pub energy: u32,
    pub kills: u32,
    /// Remaining special ability charges
    pub special_uses: u8,
    /// Active timed effects, in application order
    pub effects: SmallVec<[Effect; 4]>,
    /// Inventory, in acquisition order
    pub inventory: Vec<Item>,
}

impl Player {
    pub fn new(id: PlayerId, class: Class) -> Self {
        Self {
            id,
            class,
            health: stats::MAX_HEALTH,
            energy: stats::MAX_ENERGY,
            kills: 0,
            special_uses: stats::STARTING_CHARGES,
            effects: SmallVec::new(),
            inventory: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// Best equipped weapon by power, if any
    pub fn best_weapon(&self) -> Option<&Item> {
        self.inventory
            .iter()
            .filter(|i| !i.consumable && i.slot == ItemSlot::Weapon)
            .max_by_key(|i| i.power)
    }

    /// Best equipped armor by defense, if any
    pub fn best_armor(&self) -> Option<&Item> {
        self.inventory
            .iter()
            .filter(|i| !i.consumable && i.slot == ItemSlot::Armor)
            .max_by_key(|i| i.defense)
    }

    /// True if an active effect or an equipped item provides this effect kind
    pub fn has_effect_or_passive(&self, kind: EffectKind) -> bool {
        self.has_effect(kind)
            || self
                .inventory
                .iter()
                .any(|i| !i.consumable && i.passive == Some(kind))
    }

    /// Extra dodge chance contributed by equipped items
    pub fn item_dodge_bonus(&self) -> f32 {
        self.inventory
            .iter()
            .filter(|i| !i.consumable)
            .map(|i| i.dodge_bonus)
            .sum()
    }
}

/// Arena lifecycle phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ArenaPhase {
    /// Roster assembling, classes being chosen
    Pending,
    /// Round loop running
    Active,
    /// Terminal; no further registry mutation permitted
    Ended,
}

impl Default for ArenaPhase {
    fn default() -> Self {
        Self::Pending
    }
}
