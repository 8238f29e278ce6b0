//! Charsheet domain: the character model, the rules that derive its
//! dependent statistics, and the storage keys records are addressed by.

pub mod character_sheet;
pub mod derivation;
pub mod error;
pub mod game_systems;
pub mod ids;
mod record;
pub mod storage_key;

pub use character_sheet::{
    default_skills, Ability, AbilityScore, AbilityScores, Attack, Character, Coins, CombatStats,
    EquipmentProficiencies, MagicItemAttunement, Personality, Skill, Spell, SpellSlot, SpellSlots,
    Spellcasting, DEFAULT_CHARACTER_NAME, PERCEPTION_SKILL, SKILLS,
};
pub use derivation::{ability_modifier, proficiency_bonus, recompute, recompute_with};
pub use error::DomainError;
pub use game_systems::{
    experience_for_level, experience_for_next_level, CalculationEngine, Dnd5eSystem,
    ProficiencyLevel, MAX_LEVEL,
};
pub use ids::{AttackId, SpellId};
pub use storage_key::{sanitize, StorageKey, MAX_STORAGE_KEY_LEN};
