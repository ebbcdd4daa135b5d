//! variables.rs: Run parameters and the enums they are built from.
//! Wire tokens are explicit; `Params` carries safe defaults and domain checks.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// ------------ Macros ------------

/// Define a closed enum with explicit wire tokens, `Display`, and a
/// case-insensitive `FromStr`.
macro_rules! token_enum {
    ($(#[$meta:meta])* $name:ident => { $($variant:ident = $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or(CoreError::DomainOutOfRange(stringify!($name)))
            }
        }
    };
}

/// ------------ Canonical enums (wire tokens explicit) ------------

token_enum!(
    /// How a lot's weight is derived from its cost and cost tier.
    WeightScheme => {
        PowerOfTwo   = "power_of_two",
        Fibonacci    = "fibonacci",
        Cost         = "cost",
        DoubledCost  = "doubled_cost",
        SquaredCost  = "squared_cost",
    }
);

token_enum!(
    /// Campaign advancement speed for the per-encounter treasure table.
    Rate => {
        Slow   = "slow",
        Medium = "medium",
        Fast   = "fast",
    }
);

token_enum!(
    /// Size of an encounter's treasure relative to the table value.
    Magnitude => {
        Incidental = "incidental",
        Standard   = "standard",
        Double     = "double",
        Triple     = "triple",
    }
);

impl Default for WeightScheme {
    fn default() -> Self {
        WeightScheme::PowerOfTwo
    }
}

impl WeightScheme {
    /// Parse a configuration token, treating anything unknown as `Cost`.
    /// Returns the scheme and whether the fallback was taken.
    pub fn from_token_lenient(s: &str) -> (WeightScheme, bool) {
        match s.parse() {
            Ok(w) => (w, false),
            Err(_) => (WeightScheme::Cost, true),
        }
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::Medium
    }
}

impl Default for Magnitude {
    fn default() -> Self {
        Magnitude::Standard
    }
}

impl Magnitude {
    /// Multiplier as `(numerator, denominator)`.
    pub const fn factor(self) -> (u64, u64) {
        match self {
            Magnitude::Incidental => (1, 2),
            Magnitude::Standard => (1, 1),
            Magnitude::Double => (2, 1),
            Magnitude::Triple => (3, 1),
        }
    }
}

/// ------------ Params ------------

pub const DEFAULT_MAX_ATTEMPTS: u32 = 1_000;
pub const MAX_ATTEMPTS_CEILING: u32 = 100_000;
pub const DEFAULT_GENERATE_CAP: u32 = 100;
pub const GENERATE_CAP_CEILING: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default, deny_unknown_fields))]
pub struct Params {
    pub weighting: WeightScheme,
    /// Selection-loop iteration ceiling, 1..=100000.
    pub max_attempts: u32,
    /// ChaCha20 seed; `None` draws one from OS entropy at run time.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub seed: Option<u64>,
    /// Per-category item cap for the generation request, 1..=10000.
    pub generate_cap: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            weighting: WeightScheme::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
            generate_cap: DEFAULT_GENERATE_CAP,
        }
    }
}

impl Params {
    pub fn validate_domains(&self) -> Result<(), CoreError> {
        if !(1..=MAX_ATTEMPTS_CEILING).contains(&self.max_attempts) {
            return Err(CoreError::DomainOutOfRange("max_attempts"));
        }
        if !(1..=GENERATE_CAP_CEILING).contains(&self.generate_cap) {
            return Err(CoreError::DomainOutOfRange("generate_cap"));
        }
        Ok(())
    }
}
