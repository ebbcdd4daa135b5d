//! Determinism utilities: stable ordering for lots.
//!
//! The allocator pools lots across categories and must break cost ties the
//! same way on every run; `(cost, category, index)` is that total order.

use core::cmp::Ordering;

use crate::lot::Lot;

/* -------------------------------------------------------------------------- */
/*                               Stable Ordering                              */
/* -------------------------------------------------------------------------- */

/// Provide a **total**, stable order for values that must sort canonically.
pub trait StableOrd {
    fn stable_cmp(&self, other: &Self) -> Ordering;
}

impl StableOrd for Lot {
    /// Canonical lot order is **always** `(cost, category, index)`.
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then(self.category.cmp(&other.category))
            .then(self.index.cmp(&other.index))
    }
}

impl<T: StableOrd + ?Sized> StableOrd for &T {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        (**self).stable_cmp(*other)
    }
}

/// Sort **in place** into canonical order.
#[inline]
pub fn sort_canonical<T: StableOrd>(xs: &mut [T]) {
    xs.sort_by(|a, b| a.stable_cmp(b));
}

/// True if `xs` is non-decreasing under `key`.
#[inline]
pub fn is_sorted_by_key<T, K: Ord>(xs: &[T], key: impl Fn(&T) -> K) -> bool {
    xs.windows(2).all(|w| key(&w[0]) <= key(&w[1]))
}

/* ---------------------------------- Tests --------------------------------- */
