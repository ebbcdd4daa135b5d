//! Creature families mapped to the treasure categories they customarily carry.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::category::{Category, SelectionSet};
use crate::errors::CoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum Preset {
    None,
    All,
    Aberration,
    AberrationCunning,
    Animal,
    Construct,
    ConstructGuardian,
    Dragon,
    Fey,
    Humanoid,
    HumanoidCommunity,
    #[cfg_attr(feature = "serde", serde(rename = "magicalbeast"))]
    MagicalBeast,
    #[cfg_attr(feature = "serde", serde(rename = "monstroushumanoid"))]
    MonstrousHumanoid,
    Ooze,
    Outsider,
    Plant,
    Undead,
    UndeadIntelligent,
    Vermin,
}

impl Preset {
    pub const ALL: [Preset; 19] = [
        Preset::None,
        Preset::All,
        Preset::Aberration,
        Preset::AberrationCunning,
        Preset::Animal,
        Preset::Construct,
        Preset::ConstructGuardian,
        Preset::Dragon,
        Preset::Fey,
        Preset::Humanoid,
        Preset::HumanoidCommunity,
        Preset::MagicalBeast,
        Preset::MonstrousHumanoid,
        Preset::Ooze,
        Preset::Outsider,
        Preset::Plant,
        Preset::Undead,
        Preset::UndeadIntelligent,
        Preset::Vermin,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Preset::None => "none",
            Preset::All => "all",
            Preset::Aberration => "aberration",
            Preset::AberrationCunning => "aberration_cunning",
            Preset::Animal => "animal",
            Preset::Construct => "construct",
            Preset::ConstructGuardian => "construct_guardian",
            Preset::Dragon => "dragon",
            Preset::Fey => "fey",
            Preset::Humanoid => "humanoid",
            Preset::HumanoidCommunity => "humanoid_community",
            Preset::MagicalBeast => "magicalbeast",
            Preset::MonstrousHumanoid => "monstroushumanoid",
            Preset::Ooze => "ooze",
            Preset::Outsider => "outsider",
            Preset::Plant => "plant",
            Preset::Undead => "undead",
            Preset::UndeadIntelligent => "undead_intelligent",
            Preset::Vermin => "vermin",
        }
    }

    /// Category letters for this family.
    pub const fn codes(self) -> &'static str {
        match self {
            Preset::None => "",
            Preset::All => "abcdefghi",
            Preset::Aberration => "abde",
            Preset::AberrationCunning => "abdefgh",
            Preset::Animal => "abde",
            Preset::Construct => "ef",
            Preset::ConstructGuardian => "bcefh",
            Preset::Dragon => "abchi",
            Preset::Fey => "bcdg",
            Preset::Humanoid => "abdefg",
            Preset::HumanoidCommunity => "abdefgh",
            Preset::MagicalBeast => "abde",
            Preset::MonstrousHumanoid => "abcdeh",
            Preset::Ooze => "abd",
            Preset::Outsider => "abdefg",
            Preset::Plant => "abde",
            Preset::Undead => "abde",
            Preset::UndeadIntelligent => "abdefg",
            Preset::Vermin => "abd",
        }
    }

    pub fn types(self) -> SelectionSet {
        self.codes()
            .chars()
            .filter_map(|c| Category::from_code(c).ok())
            .collect()
    }

    /// Advisory text shown alongside the selection, if any.
    pub const fn note(self) -> Option<&'static str> {
        match self {
            Preset::Outsider => Some("outsiders may carry any gear; adjust categories to the individual"),
            _ => None,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or(CoreError::InvalidPreset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for p in Preset::ALL {
            assert_eq!(p.name().parse::<Preset>().unwrap(), p);
        }
        assert_eq!("Dragon".parse::<Preset>().unwrap(), Preset::Dragon);
        assert_eq!("kobold".parse::<Preset>(), Err(CoreError::InvalidPreset));
    }

    #[test]
    fn table_matches_known_families() {
        assert_eq!(Preset::Dragon.types().codes(), "abchi");
        assert_eq!(Preset::Fey.types().codes(), "bcdg");
        assert_eq!(Preset::ConstructGuardian.types().codes(), "bcefh");
        assert_eq!(Preset::All.types(), SelectionSet::all());
        assert!(Preset::None.types().is_empty());
    }

    #[test]
    fn every_code_string_is_valid() {
        for p in Preset::ALL {
            assert_eq!(p.types().codes(), p.codes(), "{p}");
        }
    }

    #[test]
    fn only_outsider_has_note() {
        assert!(Preset::Outsider.note().is_some());
        assert_eq!(Preset::ALL.iter().filter(|p| p.note().is_some()).count(), 1);
    }
}
