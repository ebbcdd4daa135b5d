//! hoard_core: Core types, domains, ordering helpers, and seeded RNG.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! workspace (`hoard_algo`, `hoard_io`, `hoard_pipeline`, `hoard_cli`).
//!
//! - Treasure categories `a`..`i` and the `SelectionSet` of enabled ones
//! - `Gold`: exact, integer-copper money with price-string parsing
//! - `Lot` / `Catalog`: priced, categorized treasure-table entries
//! - Creature presets → category selections
//! - `Params` (weighting scheme, attempt ceiling, seed, generation cap)
//! - Seedable RNG (ChaCha20) and the `DrawSource` seam used by the allocator
//!
//! Serialization derives are gated behind `serde` feature.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidCategory,
        InvalidPrice,
        InvalidPreset,
        DomainOutOfRange(&'static str),
        Overflow,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidCategory => write!(f, "invalid treasure category (expected a..i)"),
                CoreError::InvalidPrice => write!(f, "invalid price"),
                CoreError::InvalidPreset => write!(f, "unknown creature preset"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
                CoreError::Overflow => write!(f, "amount overflow"),
            }
        }
    }

    #[cfg(feature = "std")]
    impl std::error::Error for CoreError {}
}

pub mod category;
pub mod gold;
pub mod lot;
pub mod presets;
pub mod determinism;
pub mod rng;
pub mod variables;

pub use category::{Category, SelectionSet};
pub use errors::CoreError;
pub use gold::Gold;
pub use lot::{Catalog, Lot};
pub use presets::Preset;
pub use rng::{DrawSource, HoardRng};
pub use variables::Params;
