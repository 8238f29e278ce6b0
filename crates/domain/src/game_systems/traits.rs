//! Calculation traits for game-system-specific mechanics.

/// Calculation rules that vary per game system.
///
/// Implements the mathematical formulas specific to each ruleset. All
/// methods are total: out-of-range inputs are clamped, never rejected.
pub trait CalculationEngine: Send + Sync {
    /// Calculate ability modifier from score.
    ///
    /// For D&D-like systems: floor((score - 10) / 2)
    fn ability_modifier(&self, score: i32) -> i32;

    /// Calculate proficiency bonus from character level.
    ///
    /// For D&D 5e: floor((level - 1) / 4) + 2
    fn proficiency_bonus(&self, level: i32) -> i32;

    /// Bonus for a skill check given the governing ability's modifier.
    fn skill_modifier(
        &self,
        ability_modifier: i32,
        proficiency_bonus: i32,
        proficiency_level: ProficiencyLevel,
    ) -> i32 {
        ability_modifier + proficiency_bonus * proficiency_level.multiplier()
    }

    /// Bonus for a saving throw.
    fn saving_throw_modifier(
        &self,
        ability_modifier: i32,
        proficiency_bonus: i32,
        proficient: bool,
    ) -> i32 {
        if proficient {
            ability_modifier + proficiency_bonus
        } else {
            ability_modifier
        }
    }

    /// Passive score for a skill (e.g. passive Perception).
    fn passive_score(&self, skill_bonus: i32) -> i32 {
        10 + skill_bonus
    }

    /// Spell save DC for a casting ability modifier.
    fn spell_save_dc(&self, casting_modifier: i32, proficiency_bonus: i32) -> i32;

    /// Spell attack bonus for a casting ability modifier.
    fn spell_attack_bonus(&self, casting_modifier: i32, proficiency_bonus: i32) -> i32;

    /// XP needed to reach the level after `level`.
    fn experience_for_next_level(&self, level: i32) -> i64;
}

/// Proficiency level for skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProficiencyLevel {
    /// Not proficient
    None,
    /// Standard proficiency
    Proficient,
    /// Expertise (double proficiency)
    Expert,
}

impl ProficiencyLevel {
    /// Resolve the sheet's two checkboxes. Expertise wins over proficiency;
    /// the bonuses never stack.
    pub fn from_flags(proficient: bool, expertise: bool) -> Self {
        if expertise {
            ProficiencyLevel::Expert
        } else if proficient {
            ProficiencyLevel::Proficient
        } else {
            ProficiencyLevel::None
        }
    }

    /// Get the multiplier for this proficiency level.
    pub fn multiplier(&self) -> i32 {
        match self {
            ProficiencyLevel::None => 0,
            ProficiencyLevel::Proficient => 1,
            ProficiencyLevel::Expert => 2,
        }
    }
}
