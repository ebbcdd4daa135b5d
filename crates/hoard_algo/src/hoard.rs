//! Budget-constrained weighted-random hoard allocation.
//!
//! Contract:
//! - Pool = copies of every lot in a selected category with `cost <= budget`,
//!   sorted by `(cost, category, index)`.
//! - Tiers: walk the sorted pool; the tier rises by one whenever the cost
//!   strictly increases. Weight = `weighting.weight(cost, tier)`, computed
//!   once for the initial pool.
//! - Loop (at most `max_attempts` iterations, while budget remains): drop the
//!   unaffordable suffix, draw `r` in `[0, total_weight)`, take the first lot
//!   whose cumulative weight exceeds `r`, bump its `count`, pay its cost.
//!
//! Determinism:
//! - Pool order and tiers depend only on the catalog and selection.
//! - Randomness comes solely from the supplied `DrawSource`.

use hoard_core::determinism::{is_sorted_by_key, sort_canonical};
use hoard_core::{Catalog, Category, DrawSource, Gold, SelectionSet};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::weighting::Weighting;

/// Default iteration ceiling for one run.
pub const MAX_ATTEMPTS: u32 = 1_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("no treasure category selected; pick at least one category")]
    EmptySelection,
    #[error("nothing in the selected categories fits the budget; raise the budget or change the selection")]
    NoAffordableLots,
    #[error("malformed catalog: lot at {category}[{position}] does not match its slot")]
    MalformedCatalog { category: Category, position: usize },
    #[error("selection weight exceeds the u128 range")]
    WeightOverflow,
}

impl AllocError {
    /// Outcomes the user fixes by changing inputs, as opposed to broken callers.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, AllocError::EmptySelection | AllocError::NoAffordableLots)
    }
}

/// Why the selection loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopReason {
    BudgetExhausted,
    PoolExhausted,
    AttemptLimit,
    ZeroWeight,
    /// The draw source returned nothing (scripted sources only).
    DrawsExhausted,
}

impl StopReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            StopReason::BudgetExhausted => "budget_exhausted",
            StopReason::PoolExhausted => "pool_exhausted",
            StopReason::AttemptLimit => "attempt_limit",
            StopReason::ZeroWeight => "zero_weight",
            StopReason::DrawsExhausted => "draws_exhausted",
        }
    }
}

impl core::fmt::Display for StopReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selection, in the order made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pick {
    pub category: Category,
    pub index: usize,
    pub cost: Gold,
    pub left_before: Gold,
    pub left_after: Gold,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub picks: Vec<Pick>,
    pub budget: Gold,
    pub left: Gold,
    pub spent: Gold,
    /// Loop iterations used, including the one that found nothing left to do.
    pub attempts: u32,
    pub stop: StopReason,
}

/// Pool entry: a tagged copy of an eligible lot plus its fixed weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    category: Category,
    index: usize,
    cost: Gold,
    weight: u128,
}

/// [`allocate_with_limit`] with the default [`MAX_ATTEMPTS`].
pub fn allocate<W, D>(
    catalog: &mut Catalog,
    selection: &SelectionSet,
    budget: Gold,
    weighting: &W,
    draws: &mut D,
) -> Result<Allocation, AllocError>
where
    W: Weighting + ?Sized,
    D: DrawSource + ?Sized,
{
    allocate_with_limit(catalog, selection, budget, weighting, draws, MAX_ATTEMPTS)
}

/// Spend `budget` on random affordable lots from the selected categories.
///
/// Increments `count` on each picked lot in `catalog`. Existing counts are
/// left as found; callers reset them between runs if they want a fresh tally.
#[instrument(level = "debug", skip_all, fields(budget = %budget, max_attempts = max_attempts))]
pub fn allocate_with_limit<W, D>(
    catalog: &mut Catalog,
    selection: &SelectionSet,
    budget: Gold,
    weighting: &W,
    draws: &mut D,
    max_attempts: u32,
) -> Result<Allocation, AllocError>
where
    W: Weighting + ?Sized,
    D: DrawSource + ?Sized,
{
    if selection.is_empty() {
        return Err(AllocError::EmptySelection);
    }
    catalog
        .check_well_formed()
        .map_err(|m| AllocError::MalformedCatalog { category: m.category, position: m.position })?;

    // 1) Pool in canonical order.
    let mut lots: Vec<&hoard_core::Lot> = catalog
        .iter()
        .filter(|l| selection.contains(l.category) && l.cost <= budget)
        .collect();
    if lots.is_empty() {
        return Err(AllocError::NoAffordableLots);
    }
    sort_canonical(&mut lots);

    // 2) Tiers and weights.
    let costs: Vec<Gold> = lots.iter().map(|l| l.cost).collect();
    let weights = tier_weights(&costs, weighting)?;
    let mut pool: Vec<Entry> = lots
        .iter()
        .zip(weights)
        .map(|(l, weight)| Entry { category: l.category, index: l.index, cost: l.cost, weight })
        .collect();
    debug!(pool = pool.len(), "pool built");

    // 3) Selection loop.
    let mut left = budget;
    let mut picks: Vec<Pick> = Vec::new();
    let mut attempts: u32 = 0;

    let stop = loop {
        if left.is_zero() {
            break StopReason::BudgetExhausted;
        }
        if attempts >= max_attempts {
            break StopReason::AttemptLimit;
        }
        attempts += 1;

        let before = pool.len();
        trim_unaffordable(&mut pool, left);
        if pool.len() != before {
            debug!(dropped = before - pool.len(), remaining = pool.len(), left = %left, "trimmed pool");
        }
        if pool.is_empty() {
            break StopReason::PoolExhausted;
        }

        let total = pool
            .iter()
            .try_fold(0u128, |acc, e| acc.checked_add(e.weight))
            .ok_or(AllocError::WeightOverflow)?;
        if total == 0 {
            break StopReason::ZeroWeight;
        }

        let Some(r) = draws.draw_below(total) else {
            break StopReason::DrawsExhausted;
        };
        let Some(i) = select_bucket(pool.iter().map(|e| e.weight), r) else {
            // r < total guarantees a bucket; a misbehaving source gets cut off.
            break StopReason::DrawsExhausted;
        };
        let chosen = pool[i];

        if let Some(lot) = catalog.get_mut(chosen.category, chosen.index) {
            lot.count = lot.count.saturating_add(1);
        }
        let left_before = left;
        left = left.saturating_sub(chosen.cost);
        debug!(
            category = %chosen.category,
            index = chosen.index,
            cost = %chosen.cost,
            left = %left,
            "pick"
        );
        picks.push(Pick {
            category: chosen.category,
            index: chosen.index,
            cost: chosen.cost,
            left_before,
            left_after: left,
        });
    };

    let spent = budget.saturating_sub(left);
    info!(picks = picks.len(), spent = %spent, left = %left, attempts, stop = %stop, "allocation finished");

    Ok(Allocation { picks, budget, left, spent, attempts, stop })
}

/// Tier per position of a cost-sorted slice: 0 for the first, +1 at every
/// strict cost increase.
pub fn assign_tiers(sorted_costs: &[Gold]) -> Vec<u32> {
    let mut out = Vec::with_capacity(sorted_costs.len());
    let mut tier: u32 = 0;
    let mut prev: Option<Gold> = None;
    for &c in sorted_costs {
        if let Some(p) = prev {
            if c > p {
                tier = tier.saturating_add(1);
            }
        }
        out.push(tier);
        prev = Some(c);
    }
    out
}

/// Weights for a cost-sorted slice under `weighting`.
pub fn tier_weights<W: Weighting + ?Sized>(
    sorted_costs: &[Gold],
    weighting: &W,
) -> Result<Vec<u128>, AllocError> {
    assign_tiers(sorted_costs)
        .into_iter()
        .zip(sorted_costs)
        .map(|(tier, &cost)| weighting.weight(cost, tier).ok_or(AllocError::WeightOverflow))
        .collect()
}

/// Index of the first weight whose running sum strictly exceeds `r`.
/// `None` if `r` is not below the total.
pub fn select_bucket<I>(weights: I, r: u128) -> Option<usize>
where
    I: IntoIterator<Item = u128>,
{
    let mut acc: u128 = 0;
    for (i, w) in weights.into_iter().enumerate() {
        acc = acc.saturating_add(w);
        if r < acc {
            return Some(i);
        }
    }
    None
}

/// Drop everything from the first entry costing more than `left`.
fn trim_unaffordable(pool: &mut Vec<Entry>, left: Gold) {
    debug_assert!(is_sorted_by_key(pool.as_slice(), |e: &Entry| e.cost), "pool must stay cost-sorted");
    let cut = pool.partition_point(|e| e.cost <= left);
    pool.truncate(cut);
}
