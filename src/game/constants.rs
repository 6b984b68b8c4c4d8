/// Stat bounds and starting values
pub mod stats {
    /// Maximum (and starting) health
    pub const MAX_HEALTH: u32 = 100;
    /// Maximum (and starting) energy
    pub const MAX_ENERGY: u32 = 100;
    /// Special ability charges each player starts with
    pub const STARTING_CHARGES: u8 = 2;
    /// Hard cap on special ability charges
    pub const MAX_CHARGES: u8 = 2;
}

/// Combat math constants
pub mod combat {
    /// Base damage before weapon and class modifiers
    pub const BASE_DAMAGE: f32 = 15.0;
    /// Fallback critical strike chance when the class table has none
    pub const CRIT_CHANCE: f32 = 0.2;
    /// Best-weapon power contribution: damage += power * WEAPON_POWER_SCALE
    pub const WEAPON_POWER_SCALE: f32 = 0.1;
    /// Armor reduction is multiplicative: damage *= 1 - defense * ARMOR_DEFENSE_SCALE
    pub const ARMOR_DEFENSE_SCALE: f32 = 0.001;
    /// Warrior flat attack multiplier
    pub const WARRIOR_MODIFIER: f32 = 1.2;
    /// Mage empowered-attack multiplier (costs energy)
    pub const MAGE_MODIFIER: f32 = 1.5;
    /// Energy spent by a Mage to empower an attack
    pub const MAGE_ENERGY_COST: u32 = 20;
    /// Rogue multiplier while a stealth effect is active
    pub const ROGUE_STEALTH_MODIFIER: f32 = 1.8;
    /// Damage fraction a SpellShield lets through
    pub const SPELL_SHIELD_FACTOR: f32 = 0.7;
    /// Damage fraction a Fortify effect lets through
    pub const FORTIFY_FACTOR: f32 = 0.6;
    /// Fraction of dealt damage returned by ReflectDamage
    pub const REFLECT_FRACTION: f32 = 0.3;
    /// Base heal used by blessings and escape abilities
    pub const HEAL_AMOUNT: u32 = 25;
}

/// Special ability constants
pub mod ability {
    /// Special abilities start from double base damage
    pub const SPECIAL_DAMAGE_MULT: f32 = 2.0;
    /// Berserk: attacker takes this fraction of the damage dealt
    pub const BERSERK_SELF_FRACTION: f32 = 0.25;
    /// Berserk doubles the special damage again
    pub const BERSERK_MULT: f32 = 2.0;
    /// Escape succeeds with this probability
    pub const ESCAPE_SUCCESS_CHANCE: f32 = 0.8;
    /// Rounds of SpellShield granted by a successful escape
    pub const ESCAPE_SHIELD_ROUNDS: u32 = 2;
    /// Maximum targets hit by a volley
    pub const VOLLEY_TARGETS: usize = 3;
    /// Per-target damage fraction of a volley
    pub const VOLLEY_FRACTION: f32 = 0.6;
    /// Execute threshold: targets below this health are eliminated outright
    pub const EXECUTE_THRESHOLD: u32 = 30;
    /// Multiplier applied when the execute threshold is not met
    pub const EXECUTE_FALLBACK_MULT: f32 = 1.5;
    /// Rounds of stealth gained after an assassination attempt
    pub const ASSASSINATE_STEALTH_ROUNDS: u32 = 1;
}

/// Round event constants
pub mod events {
    /// Chance each living player receives an event in a round
    pub const EVENT_CHANCE: f32 = 0.7;
    /// Chance a duel is resolved with the special ability instead of a plain attack
    pub const DUEL_SPECIAL_CHANCE: f32 = 0.2;
    /// Ambush damage multiplier over base damage
    pub const AMBUSH_DAMAGE_MULT: f32 = 1.5;
    /// Chance a Rogue turns an ambush into a counterattack
    pub const ROGUE_COUNTER_CHANCE: f32 = 0.4;
    /// Energy restored by a blessing
    pub const BLESSING_ENERGY: u32 = 20;
    /// Health granted by completing a quest
    pub const QUEST_HEALTH: u32 = 10;
    /// Energy granted by completing a quest
    pub const QUEST_ENERGY: u32 = 15;
    /// Chance a betrayal event turns violent instead of an amicable split
    pub const TURNCOAT_CHANCE: f32 = 0.3;
}

/// Alliance and synergy constants
pub mod alliance {
    /// Synergy value a fresh alliance starts at
    pub const INITIAL_SYNERGY: f32 = 0.1;
    /// Synergy growth per round (rewards longevity)
    pub const SYNERGY_GROWTH: f32 = 0.05;
    /// Synergy is bounded at 1.0
    pub const MAX_SYNERGY: f32 = 1.0;
    /// Periodic bonus = floor(synergy * SYNERGY_STAT_SCALE) health and energy
    pub const SYNERGY_STAT_SCALE: f32 = 10.0;
    /// Betrayal probability grows by this much per round
    pub const BETRAYAL_RATE_PER_ROUND: f32 = 0.02;
    /// Betrayal probability cap; growth past round 25 is clamped here
    pub const BETRAYAL_CAP: f32 = 0.5;
}

/// Item effect constants
pub mod items {
    /// Health restored by a regeneration artifact
    pub const REGEN_HEAL: u32 = 40;
    /// Energy restored by a mana item
    pub const MANA_RESTORE: u32 = 50;
    /// Poison damage applied each round
    pub const POISON_DAMAGE: f32 = 10.0;
    /// Poison duration in rounds
    pub const POISON_ROUNDS: u32 = 3;
    /// Stealth duration in rounds when granted by an item
    pub const STEALTH_ROUNDS: u32 = 2;
    /// SpellShield duration in rounds when granted by an item
    pub const SPELL_SHIELD_ROUNDS: u32 = 3;
    /// DoubleDamage duration in rounds
    pub const DOUBLE_DAMAGE_ROUNDS: u32 = 2;
    /// Chain lightning per-target damage
    pub const CHAIN_LIGHTNING_DAMAGE: u32 = 25;
    /// Maximum targets struck by chain lightning
    pub const CHAIN_LIGHTNING_TARGETS: usize = 3;
}
