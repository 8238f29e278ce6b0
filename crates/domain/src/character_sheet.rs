//! Character sheet model.
//!
//! A [`Character`] is persisted as one flat camelCase JSON object. Every
//! struct here deserializes leniently: a field missing from a stored record
//! takes its default, so records written by older clients still load.
//!
//! Fields documented as *derived* are owned by [`crate::derivation`] and are
//! overwritten on every recompute.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{AttackId, SpellId};

/// Display name given to a freshly created character.
pub const DEFAULT_CHARACTER_NAME: &str = "New Character";

// =============================================================================
// Abilities
// =============================================================================

/// The six fixed ability slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    /// Lowercase name as stored in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ability::Strength => "strength",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Charisma => "charisma",
        }
    }

}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    /// Accepts full names and abbreviations, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strength" | "str" => Ok(Ability::Strength),
            "dexterity" | "dex" => Ok(Ability::Dexterity),
            "constitution" | "con" => Ok(Ability::Constitution),
            "intelligence" | "int" => Ok(Ability::Intelligence),
            "wisdom" | "wis" => Ok(Ability::Wisdom),
            "charisma" | "cha" => Ok(Ability::Charisma),
            _ => Err(DomainError::parse(format!("Unknown ability: {}", s))),
        }
    }
}

/// One ability slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AbilityScore {
    /// Raw score, conventionally 1-30.
    pub score: i32,
    /// Derived.
    pub modifier: i32,
    pub saving_throw_proficiency: bool,
    /// Derived.
    pub saving_throw_bonus: i32,
}

impl Default for AbilityScore {
    fn default() -> Self {
        Self {
            score: 10,
            modifier: 0,
            saving_throw_proficiency: false,
            saving_throw_bonus: 0,
        }
    }
}

/// All six ability slots. A slot missing from a stored record defaults to a
/// score of 10.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AbilityScores {
    pub strength: AbilityScore,
    pub dexterity: AbilityScore,
    pub constitution: AbilityScore,
    pub intelligence: AbilityScore,
    pub wisdom: AbilityScore,
    pub charisma: AbilityScore,
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> &AbilityScore {
        match ability {
            Ability::Strength => &self.strength,
            Ability::Dexterity => &self.dexterity,
            Ability::Constitution => &self.constitution,
            Ability::Intelligence => &self.intelligence,
            Ability::Wisdom => &self.wisdom,
            Ability::Charisma => &self.charisma,
        }
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut AbilityScore {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        }
    }

    /// Current (already derived) modifier of an ability.
    pub fn modifier(&self, ability: Ability) -> i32 {
        self.get(ability).modifier
    }
}

// =============================================================================
// Skills
// =============================================================================

/// The fixed skill list, in sheet order, with each skill's governing ability.
pub const SKILLS: [(&str, Ability); 18] = [
    ("Acrobatics", Ability::Dexterity),
    ("Animal Handling", Ability::Wisdom),
    ("Arcana", Ability::Intelligence),
    ("Athletics", Ability::Strength),
    ("Deception", Ability::Charisma),
    ("History", Ability::Intelligence),
    ("Insight", Ability::Wisdom),
    ("Intimidation", Ability::Charisma),
    ("Investigation", Ability::Intelligence),
    ("Medicine", Ability::Wisdom),
    ("Nature", Ability::Intelligence),
    ("Perception", Ability::Wisdom),
    ("Performance", Ability::Charisma),
    ("Persuasion", Ability::Charisma),
    ("Religion", Ability::Intelligence),
    ("Sleight of Hand", Ability::Dexterity),
    ("Stealth", Ability::Dexterity),
    ("Survival", Ability::Wisdom),
];

/// Name of the skill passive perception is computed from.
pub const PERCEPTION_SKILL: &str = "Perception";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    pub ability: Ability,
    #[serde(default)]
    pub proficiency: bool,
    #[serde(default)]
    pub expertise: bool,
    /// Derived.
    #[serde(default)]
    pub bonus: i32,
}

impl Skill {
    pub fn new(name: impl Into<String>, ability: Ability) -> Self {
        Self {
            name: name.into(),
            ability,
            proficiency: false,
            expertise: false,
            bonus: 0,
        }
    }
}

/// The default skill list with no proficiencies.
pub fn default_skills() -> Vec<Skill> {
    SKILLS
        .iter()
        .map(|(name, ability)| Skill::new(*name, *ability))
        .collect()
}

// =============================================================================
// Combat
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CombatStats {
    pub armor_class: i32,
    pub shield: i32,
    /// Derived.
    pub initiative: i32,
    pub speed: i32,
    pub size: String,
    /// Derived.
    pub passive_perception: i32,
    pub hit_point_maximum: i32,
    pub hit_point_current: i32,
    pub hit_point_temporary: i32,
    pub hit_dice_total: String,
    pub hit_dice_spent: String,
    pub hit_dice_max: String,
    pub death_save_successes: i32,
    pub death_save_failures: i32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            armor_class: 10,
            shield: 0,
            initiative: 0,
            speed: 30,
            size: "Medium".to_string(),
            passive_perception: 10,
            hit_point_maximum: 0,
            hit_point_current: 0,
            hit_point_temporary: 0,
            hit_dice_total: String::new(),
            hit_dice_spent: String::new(),
            hit_dice_max: String::new(),
            death_save_successes: 0,
            death_save_failures: 0,
        }
    }
}

/// Free-form weapon/attack row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    #[serde(default)]
    pub id: AttackId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attack_bonus: String,
    #[serde(default)]
    pub damage: String,
    #[serde(default)]
    pub notes: String,
}

impl Attack {
    pub fn blank() -> Self {
        Self {
            id: AttackId::new(),
            name: String::new(),
            attack_bonus: String::new(),
            damage: String::new(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EquipmentProficiencies {
    pub armor_light: bool,
    pub armor_medium: bool,
    pub armor_heavy: bool,
    pub armor_shields: bool,
    pub weapons: String,
    pub tools: String,
}

// =============================================================================
// Spellcasting
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    #[serde(default)]
    pub id: SpellId,
    #[serde(default)]
    pub name: String,
    /// 0 = cantrip
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub casting_time: String,
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub concentration: bool,
    #[serde(default)]
    pub ritual: bool,
    #[serde(default)]
    pub material: bool,
    #[serde(default)]
    pub notes: String,
}

impl Spell {
    pub fn blank(level: u8) -> Self {
        Self {
            id: SpellId::new(),
            name: String::new(),
            level,
            casting_time: String::new(),
            range: String::new(),
            concentration: false,
            ritual: false,
            material: false,
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellSlot {
    pub total: u32,
    pub expended: u32,
}

/// The nine fixed spell-slot tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpellSlots {
    pub level1: SpellSlot,
    pub level2: SpellSlot,
    pub level3: SpellSlot,
    pub level4: SpellSlot,
    pub level5: SpellSlot,
    pub level6: SpellSlot,
    pub level7: SpellSlot,
    pub level8: SpellSlot,
    pub level9: SpellSlot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Spellcasting {
    /// Ability name, or empty when the character does not cast.
    pub ability: String,
    /// Derived.
    pub spellcasting_modifier: i32,
    /// Derived.
    #[serde(rename = "saveDC")]
    pub save_dc: i32,
    /// Derived.
    pub attack_bonus: i32,
    pub spell_slots: SpellSlots,
    pub spells: Vec<Spell>,
}

impl Spellcasting {
    /// The casting ability, if `ability` names one.
    pub fn casting_ability(&self) -> Option<Ability> {
        self.ability.parse().ok()
    }
}

// =============================================================================
// Equipment and personality
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MagicItemAttunement {
    pub slot1: String,
    pub slot2: String,
    pub slot3: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coins {
    pub copper: i64,
    pub silver: i64,
    pub electrum: i64,
    pub gold: i64,
    pub platinum: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Personality {
    pub backstory_and_personality: String,
    pub appearance: String,
    pub alignment: String,
    pub languages: String,
}

// =============================================================================
// Character
// =============================================================================

/// Root entity of a character sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Character {
    // Header
    pub name: String,
    pub background: String,
    pub class: String,
    pub species: String,
    pub subclass: String,
    /// 1-20.
    pub level: i32,
    pub experience_points: i64,
    /// Derived: XP threshold of the next level.
    pub experience_next_level: i64,

    // Core stats
    /// Derived.
    pub proficiency_bonus: i32,
    pub heroic_inspiration: bool,
    pub ability_scores: AbilityScores,
    pub skills: Vec<Skill>,

    pub combat: CombatStats,
    pub attacks: Vec<Attack>,

    // Features
    pub class_features: String,
    pub species_traits: String,
    pub feats: String,
    pub equipment_proficiencies: EquipmentProficiencies,

    pub spellcasting: Spellcasting,

    pub equipment: String,
    pub magic_item_attunement: MagicItemAttunement,
    pub coins: Coins,
    pub personality: Personality,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            name: DEFAULT_CHARACTER_NAME.to_string(),
            background: String::new(),
            class: String::new(),
            species: String::new(),
            subclass: String::new(),
            level: 1,
            experience_points: 0,
            experience_next_level: 300,
            proficiency_bonus: 2,
            heroic_inspiration: false,
            ability_scores: AbilityScores::default(),
            skills: default_skills(),
            combat: CombatStats::default(),
            attacks: Vec::new(),
            class_features: String::new(),
            species_traits: String::new(),
            feats: String::new(),
            equipment_proficiencies: EquipmentProficiencies::default(),
            spellcasting: Spellcasting::default(),
            equipment: String::new(),
            magic_item_attunement: MagicItemAttunement::default(),
            coins: Coins::default(),
            personality: Personality::default(),
        }
    }
}

impl Character {
    /// A default character with all derived fields computed.
    pub fn new() -> Self {
        let mut character = Self::default();
        crate::derivation::recompute(&mut character);
        character
    }

    /// Builder-style name setter.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the display name has any non-whitespace content.
    pub fn has_display_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn skill_mut(&mut self, name: &str) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|s| s.name == name)
    }

    /// Append a blank attack row and return its id.
    pub fn add_attack(&mut self) -> AttackId {
        let attack = Attack::blank();
        let id = attack.id;
        self.attacks.push(attack);
        id
    }

    /// Remove an attack row. Returns false when no row has that id.
    pub fn remove_attack(&mut self, id: AttackId) -> bool {
        match self.attacks.iter().position(|a| a.id == id) {
            Some(index) => {
                self.attacks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Append a blank spell of the given level (0 = cantrip) and return its id.
    pub fn add_spell(&mut self, level: u8) -> SpellId {
        let spell = Spell::blank(level);
        let id = spell.id;
        self.spellcasting.spells.push(spell);
        id
    }

    /// Remove a spell. Returns false when no spell has that id.
    pub fn remove_spell(&mut self, id: SpellId) -> bool {
        match self.spellcasting.spells.iter().position(|s| s.id == id) {
            Some(index) => {
                self.spellcasting.spells.remove(index);
                true
            }
            None => false,
        }
    }
}
