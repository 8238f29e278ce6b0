//! Game system rules.
//!
//! The derivation engine is written against [`CalculationEngine`]; the sheet
//! ships with the D&D 5th Edition (2024) rules in [`Dnd5eSystem`].

mod dnd5e;
mod traits;

pub use dnd5e::{experience_for_level, experience_for_next_level, Dnd5eSystem, MAX_LEVEL};
pub use traits::{CalculationEngine, ProficiencyLevel};
