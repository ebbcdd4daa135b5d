//! Budget calculators: a custom amount, treasure per encounter, NPC gear.
//!
//! Table values are whole gold pieces.

use hoard_core::variables::{Magnitude, Rate};
use hoard_core::Gold;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BudgetError {
    #[error("{what} {value} is out of range ({min}..={max})")]
    OutOfRange { what: &'static str, value: u32, min: u32, max: u32 },
    #[error("budget overflow")]
    Overflow,
}

/// Treasure per encounter by average party level, columns slow/medium/fast.
const ENCOUNTER_GP: [[u64; 3]; 20] = [
    [170, 260, 400],
    [350, 550, 800],
    [550, 800, 1_200],
    [750, 1_150, 1_700],
    [1_000, 1_550, 2_300],
    [1_350, 2_000, 3_000],
    [1_750, 2_600, 3_900],
    [2_200, 3_350, 5_000],
    [2_850, 4_250, 6_400],
    [3_650, 5_450, 8_200],
    [4_650, 7_000, 10_500],
    [6_000, 9_000, 13_500],
    [7_750, 11_600, 17_500],
    [10_000, 15_000, 22_000],
    [13_000, 19_500, 29_000],
    [16_500, 25_000, 38_000],
    [22_000, 32_000, 48_000],
    [28_000, 41_000, 62_000],
    [35_000, 53_000, 79_000],
    [44_000, 67_000, 100_000],
];

/// NPC gear value by level 1..=21 (21 is only reachable as a heroic 20).
const NPC_GEAR_GP: [u64; 21] = [
    260, 390, 780, 1_650, 2_400, 3_450, 4_650, 6_000, 7_800, 10_050, 12_750, 16_350, 21_000,
    27_000, 34_800, 45_000, 58_500, 75_000, 96_000, 123_000, 159_000,
];

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 20;

#[inline]
pub fn budget_custom(gold: Gold) -> Gold {
    gold
}

pub fn budget_encounter(apl: u32, rate: Rate, magnitude: Magnitude) -> Result<Gold, BudgetError> {
    check_level("apl", apl)?;
    let row = ENCOUNTER_GP[(apl - 1) as usize];
    let gp = match rate {
        Rate::Slow => row[0],
        Rate::Medium => row[1],
        Rate::Fast => row[2],
    };
    let (num, den) = magnitude.factor();
    Gold::from_gp(gp)
        .and_then(|g| g.scale(num, den))
        .ok_or(BudgetError::Overflow)
}

/// Heroic NPCs are equipped as one level higher.
pub fn budget_npc_gear(level: u32, heroic: bool) -> Result<Gold, BudgetError> {
    check_level("level", level)?;
    let effective = if heroic { level + 1 } else { level };
    Gold::from_gp(NPC_GEAR_GP[(effective - 1) as usize]).ok_or(BudgetError::Overflow)
}

fn check_level(what: &'static str, value: u32) -> Result<(), BudgetError> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&value) {
        Ok(())
    } else {
        Err(BudgetError::OutOfRange { what, value, min: MIN_LEVEL, max: MAX_LEVEL })
    }
}
