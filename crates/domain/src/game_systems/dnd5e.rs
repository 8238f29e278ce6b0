//! D&D 5th Edition calculation rules.

use super::traits::CalculationEngine;

/// Highest character level.
pub const MAX_LEVEL: i32 = 20;

/// XP thresholds for each level in D&D 5e.
/// Index is level - 1 (so level 1 = index 0).
const XP_THRESHOLDS: [i64; 20] = [
    0,      // Level 1
    300,    // Level 2
    900,    // Level 3
    2700,   // Level 4
    6500,   // Level 5
    14000,  // Level 6
    23000,  // Level 7
    34000,  // Level 8
    48000,  // Level 9
    64000,  // Level 10
    85000,  // Level 11
    100000, // Level 12
    120000, // Level 13
    140000, // Level 14
    165000, // Level 15
    195000, // Level 16
    225000, // Level 17
    265000, // Level 18
    305000, // Level 19
    355000, // Level 20
];

fn clamp_level(level: i32) -> i32 {
    level.clamp(1, MAX_LEVEL)
}

/// XP required to reach a given level.
pub fn experience_for_level(level: i32) -> i64 {
    XP_THRESHOLDS[(clamp_level(level) - 1) as usize]
}

/// XP required for the level after `current_level`; the level-20 threshold
/// once the cap is reached.
pub fn experience_for_next_level(current_level: i32) -> i64 {
    experience_for_level((clamp_level(current_level) + 1).min(MAX_LEVEL))
}

/// D&D 5th Edition game system.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dnd5eSystem;

impl Dnd5eSystem {
    /// Create a new D&D 5e system instance.
    pub fn new() -> Self {
        Self
    }
}

impl CalculationEngine for Dnd5eSystem {
    fn ability_modifier(&self, score: i32) -> i32 {
        // Rust's / rounds toward zero; the rules want floor division.
        (score - 10).div_euclid(2)
    }

    fn proficiency_bonus(&self, level: i32) -> i32 {
        (clamp_level(level) - 1) / 4 + 2
    }

    fn spell_save_dc(&self, casting_modifier: i32, proficiency_bonus: i32) -> i32 {
        8 + casting_modifier + proficiency_bonus
    }

    fn spell_attack_bonus(&self, casting_modifier: i32, proficiency_bonus: i32) -> i32 {
        casting_modifier + proficiency_bonus
    }

    fn experience_for_next_level(&self, level: i32) -> i64 {
        experience_for_next_level(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_systems::ProficiencyLevel;

    #[test]
    fn ability_modifier_calculation() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.ability_modifier(1), -5);
        assert_eq!(system.ability_modifier(7), -2);
        assert_eq!(system.ability_modifier(8), -1);
        assert_eq!(system.ability_modifier(9), -1);
        assert_eq!(system.ability_modifier(10), 0);
        assert_eq!(system.ability_modifier(11), 0);
        assert_eq!(system.ability_modifier(15), 2);
        assert_eq!(system.ability_modifier(16), 3);
        assert_eq!(system.ability_modifier(20), 5);
        assert_eq!(system.ability_modifier(30), 10);
    }

    #[test]
    fn ability_modifier_matches_floor_formula() {
        let system = Dnd5eSystem::new();
        for score in -5..=40 {
            let expected = ((score - 10) as f64 / 2.0).floor() as i32;
            assert_eq!(system.ability_modifier(score), expected, "score {score}");
        }
    }

    #[test]
    fn proficiency_bonus_progression() {
        let system = Dnd5eSystem::new();
        for level in 1..=4 {
            assert_eq!(system.proficiency_bonus(level), 2);
        }
        for level in 5..=8 {
            assert_eq!(system.proficiency_bonus(level), 3);
        }
        for level in 9..=12 {
            assert_eq!(system.proficiency_bonus(level), 4);
        }
        for level in 13..=16 {
            assert_eq!(system.proficiency_bonus(level), 5);
        }
        for level in 17..=20 {
            assert_eq!(system.proficiency_bonus(level), 6);
        }
    }

    #[test]
    fn proficiency_bonus_clamps_out_of_range_levels() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.proficiency_bonus(0), 2);
        assert_eq!(system.proficiency_bonus(-3), 2);
        assert_eq!(system.proficiency_bonus(25), 6);
    }

    #[test]
    fn spell_save_dc_calculation() {
        let system = Dnd5eSystem::new();
        // DC = 8 + proficiency (3) + WIS mod (1) = 12
        assert_eq!(system.spell_save_dc(1, 3), 12);
        assert_eq!(system.spell_attack_bonus(1, 3), 4);
    }

    #[test]
    fn skill_modifier_with_proficiency() {
        let system = Dnd5eSystem::new();
        assert_eq!(system.skill_modifier(2, 3, ProficiencyLevel::None), 2);
        assert_eq!(system.skill_modifier(2, 3, ProficiencyLevel::Proficient), 5);
        assert_eq!(system.skill_modifier(2, 3, ProficiencyLevel::Expert), 8);
    }

    #[test]
    fn expertise_does_not_stack_with_proficiency() {
        assert_eq!(
            ProficiencyLevel::from_flags(true, true),
            ProficiencyLevel::Expert
        );
        assert_eq!(
            ProficiencyLevel::from_flags(false, true),
            ProficiencyLevel::Expert
        );
        assert_eq!(
            ProficiencyLevel::from_flags(true, false),
            ProficiencyLevel::Proficient
        );
    }

    #[test]
    fn experience_thresholds() {
        assert_eq!(experience_for_level(1), 0);
        assert_eq!(experience_for_level(5), 6500);
        assert_eq!(experience_for_next_level(1), 300);
        assert_eq!(experience_for_next_level(4), 6500);
        assert_eq!(experience_for_next_level(19), 355000);
        assert_eq!(experience_for_next_level(20), 355000);
        assert_eq!(experience_for_next_level(0), 300);
    }
}
