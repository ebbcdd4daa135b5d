// crates/hoard_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Allocation algorithms over `hoard_core` types. No I/O.

pub mod hoard;
pub mod weighting;
pub mod counters;

#[cfg(feature = "budget")]
pub mod budget;

// Convenience re-exports (pipeline imports these from crate root)
pub use hoard::{
    allocate, allocate_with_limit, assign_tiers, select_bucket, tier_weights, AllocError,
    Allocation, Pick, StopReason, MAX_ATTEMPTS,
};
pub use weighting::{scheme_from_config, WeightScheme, Weighting, MAX_POW2_TIER};
pub use counters::{adjust_count, allocated_total, reset_all_counts, AllocatedTotal, CountOp};

#[cfg(feature = "budget")]
pub use budget::{budget_custom, budget_encounter, budget_npc_gear, BudgetError};
