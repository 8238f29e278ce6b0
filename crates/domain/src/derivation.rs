//! Derivation engine.
//!
//! Recomputes every derived field of a [`Character`] from its base fields.
//! Recomputing is idempotent and never fails; it only overwrites derived
//! fields, so it is safe to call after every mutation.
//!
//! Order matters: the proficiency bonus is computed first, ability modifiers
//! and saving throws next, then skills, and finally the values that read
//! modifiers or skill bonuses (passive perception, initiative, spellcasting).

use crate::character_sheet::{Ability, Character, PERCEPTION_SKILL};
use crate::game_systems::{CalculationEngine, Dnd5eSystem, ProficiencyLevel};

/// Recompute all derived fields with the D&D 5e rules.
pub fn recompute(character: &mut Character) {
    recompute_with(&Dnd5eSystem::new(), character);
}

/// Recompute all derived fields with the given rules.
pub fn recompute_with(engine: &dyn CalculationEngine, character: &mut Character) {
    let proficiency_bonus = engine.proficiency_bonus(character.level);
    character.proficiency_bonus = proficiency_bonus;
    character.experience_next_level = engine.experience_for_next_level(character.level);

    for ability in Ability::ALL {
        let slot = character.ability_scores.get_mut(ability);
        slot.modifier = engine.ability_modifier(slot.score);
        slot.saving_throw_bonus = engine.saving_throw_modifier(
            slot.modifier,
            proficiency_bonus,
            slot.saving_throw_proficiency,
        );
    }

    let abilities = &character.ability_scores;
    for skill in &mut character.skills {
        let level = ProficiencyLevel::from_flags(skill.proficiency, skill.expertise);
        skill.bonus = engine.skill_modifier(
            abilities.modifier(skill.ability),
            proficiency_bonus,
            level,
        );
    }

    let perception_bonus = character
        .skill(PERCEPTION_SKILL)
        .map(|skill| skill.bonus)
        .unwrap_or_else(|| abilities.modifier(Ability::Wisdom));
    character.combat.passive_perception = engine.passive_score(perception_bonus);
    character.combat.initiative = abilities.modifier(Ability::Dexterity);

    let spellcasting = &mut character.spellcasting;
    match spellcasting.casting_ability() {
        Some(ability) => {
            let modifier = abilities.modifier(ability);
            spellcasting.spellcasting_modifier = modifier;
            spellcasting.save_dc = engine.spell_save_dc(modifier, proficiency_bonus);
            spellcasting.attack_bonus = engine.spell_attack_bonus(modifier, proficiency_bonus);
        }
        None => {
            spellcasting.spellcasting_modifier = 0;
            spellcasting.save_dc = 0;
            spellcasting.attack_bonus = 0;
        }
    }
}

/// floor((score - 10) / 2)
pub fn ability_modifier(score: i32) -> i32 {
    Dnd5eSystem::new().ability_modifier(score)
}

/// floor((level - 1) / 4) + 2, with level clamped into 1-20.
pub fn proficiency_bonus(level: i32) -> i32 {
    Dnd5eSystem::new().proficiency_bonus(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character_with(level: i32, scores: [i32; 6]) -> Character {
        let mut character = Character::default();
        character.level = level;
        for (ability, score) in Ability::ALL.into_iter().zip(scores) {
            character.ability_scores.get_mut(ability).score = score;
        }
        character
    }

    #[test]
    fn free_functions_match_rules() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(15), 2);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(20), 5);
        assert_eq!(proficiency_bonus(1), 2);
        assert_eq!(proficiency_bonus(17), 6);
    }

    #[test]
    fn recomputes_modifiers_and_saves() {
        let mut character = character_with(5, [16, 14, 12, 8, 13, 10]);
        character.ability_scores.strength.saving_throw_proficiency = true;

        recompute(&mut character);

        assert_eq!(character.proficiency_bonus, 3);
        assert_eq!(character.ability_scores.strength.modifier, 3);
        assert_eq!(character.ability_scores.strength.saving_throw_bonus, 6);
        assert_eq!(character.ability_scores.dexterity.saving_throw_bonus, 2);
        assert_eq!(character.ability_scores.intelligence.modifier, -1);
        assert_eq!(character.ability_scores.wisdom.modifier, 1);
    }

    #[test]
    fn skill_bonuses_follow_proficiency_flags() {
        let mut character = character_with(9, [10, 18, 10, 10, 10, 10]);
        if let Some(stealth) = character.skill_mut("Stealth") {
            stealth.expertise = true;
            stealth.proficiency = true;
        }
        if let Some(acrobatics) = character.skill_mut("Acrobatics") {
            acrobatics.proficiency = true;
        }

        recompute(&mut character);

        // PB 4, DEX +4
        assert_eq!(character.skill("Stealth").map(|s| s.bonus), Some(12));
        assert_eq!(character.skill("Acrobatics").map(|s| s.bonus), Some(8));
        assert_eq!(character.skill("Sleight of Hand").map(|s| s.bonus), Some(4));
        assert_eq!(character.skill("Athletics").map(|s| s.bonus), Some(0));
    }

    #[test]
    fn passive_perception_uses_perception_bonus() {
        let mut character = character_with(1, [10, 10, 10, 10, 6, 10]);
        if let Some(perception) = character.skill_mut("Perception") {
            perception.proficiency = true;
        }

        recompute(&mut character);

        // WIS -2 + PB 2 = 0, so passive perception is exactly 10.
        assert_eq!(character.skill("Perception").map(|s| s.bonus), Some(0));
        assert_eq!(character.combat.passive_perception, 10);
    }

    #[test]
    fn passive_perception_falls_back_to_wisdom() {
        let mut character = character_with(1, [10, 10, 10, 10, 14, 10]);
        character.skills.retain(|s| s.name != "Perception");

        recompute(&mut character);

        assert_eq!(character.combat.passive_perception, 12);
    }

    #[test]
    fn initiative_is_dexterity_modifier() {
        let mut character = character_with(1, [10, 7, 10, 10, 10, 10]);
        recompute(&mut character);
        assert_eq!(character.combat.initiative, -2);
    }

    #[test]
    fn spellcasting_derives_from_casting_ability() {
        let mut character = character_with(5, [10, 10, 10, 18, 10, 10]);
        character.spellcasting.ability = "intelligence".to_string();

        recompute(&mut character);

        assert_eq!(character.spellcasting.spellcasting_modifier, 4);
        assert_eq!(character.spellcasting.save_dc, 15);
        assert_eq!(character.spellcasting.attack_bonus, 7);

        character.spellcasting.ability = String::new();
        recompute(&mut character);
        assert_eq!(character.spellcasting.spellcasting_modifier, 0);
        assert_eq!(character.spellcasting.save_dc, 0);
        assert_eq!(character.spellcasting.attack_bonus, 0);
    }

    #[test]
    fn unknown_casting_ability_yields_zero() {
        let mut character = character_with(5, [10, 10, 10, 18, 10, 10]);
        character.spellcasting.ability = "moxie".to_string();
        recompute(&mut character);
        assert_eq!(character.spellcasting.save_dc, 0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut character = character_with(13, [8, 15, 14, 12, 17, 9]);
        character.ability_scores.wisdom.saving_throw_proficiency = true;
        character.spellcasting.ability = "wisdom".to_string();
        if let Some(insight) = character.skill_mut("Insight") {
            insight.expertise = true;
        }

        recompute(&mut character);
        let once = character.clone();
        recompute(&mut character);

        assert_eq!(character, once);
    }

    #[test]
    fn recompute_leaves_base_fields_untouched() {
        let mut character = character_with(25, [3, 30, 10, 10, 10, 10]);
        character.name = "Out of Range".to_string();

        recompute(&mut character);

        assert_eq!(character.level, 25);
        assert_eq!(character.proficiency_bonus, 6);
        assert_eq!(character.ability_scores.strength.score, 3);
        assert_eq!(character.ability_scores.strength.modifier, -4);
        assert_eq!(character.ability_scores.dexterity.modifier, 10);
        assert_eq!(character.name, "Out of Range");
    }

    #[test]
    fn level_five_dexterity_sixteen() {
        let mut character = character_with(5, [10, 16, 10, 10, 10, 10]);
        recompute(&mut character);
        assert_eq!(character.proficiency_bonus, 3);
        assert_eq!(character.ability_scores.dexterity.modifier, 3);
        assert_eq!(character.combat.initiative, 3);
        assert_eq!(character.experience_next_level, 14000);
    }
}
