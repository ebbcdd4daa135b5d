//! Manual counter controls and the running allocated-total.
//!
//! Each lot's `count` can be zeroed, bumped, or lowered (never below zero).
//! Every adjustment reports its signed effect in copper so a running total can
//! follow along without rescanning the catalog.

use core::fmt;
use core::str::FromStr;

use hoard_core::{Catalog, Gold, Lot};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CountOp {
    Zero,
    Increment,
    Decrement,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown counter operation {0:?} (expected 0, p or m)")]
pub struct UnknownCountOp(pub String);

impl CountOp {
    /// Control token: `0`, `p`, `m`.
    pub const fn token(self) -> &'static str {
        match self {
            CountOp::Zero => "0",
            CountOp::Increment => "p",
            CountOp::Decrement => "m",
        }
    }
}

impl fmt::Display for CountOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for CountOp {
    type Err = UnknownCountOp;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(CountOp::Zero),
            "p" | "P" => Ok(CountOp::Increment),
            "m" | "M" => Ok(CountOp::Decrement),
            other => Err(UnknownCountOp(other.to_string())),
        }
    }
}

/// Apply `op` to `lot.count`; returns `(post − pre) × cost` in copper.
pub fn adjust_count(lot: &mut Lot, op: CountOp) -> i128 {
    let pre = lot.count;
    lot.count = match op {
        CountOp::Zero => 0,
        CountOp::Increment => pre.saturating_add(1),
        CountOp::Decrement => pre.saturating_sub(1),
    };
    (lot.count as i128 - pre as i128) * lot.cost.cp() as i128
}

/// Σ `count × cost` over the catalog (saturating).
pub fn allocated_total(catalog: &Catalog) -> Gold {
    catalog
        .iter()
        .map(|l| l.allocated().unwrap_or(Gold::MAX))
        .fold(Gold::ZERO, Gold::saturating_add)
}

/// Zero every count; returns what was allocated before.
pub fn reset_all_counts(catalog: &mut Catalog) -> Gold {
    let before = allocated_total(catalog);
    for lot in catalog.iter_mut() {
        lot.count = 0;
    }
    before
}

/// Running "total allocated" display value. Never drops below zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocatedTotal(Gold);

impl AllocatedTotal {
    pub fn new(start: Gold) -> Self {
        Self(start)
    }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self(allocated_total(catalog))
    }

    pub fn apply(&mut self, delta_cp: i128) -> Gold {
        let magnitude = Gold::from_cp(u64::try_from(delta_cp.unsigned_abs()).unwrap_or(u64::MAX));
        self.0 = if delta_cp >= 0 {
            self.0.saturating_add(magnitude)
        } else {
            self.0.saturating_sub(magnitude)
        };
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = Gold::ZERO;
    }

    pub fn get(&self) -> Gold {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoard_core::Category;

    fn lot(cp: u64, count: u32) -> Lot {
        let mut l = Lot::new(Category::A, 0, Gold::from_cp(cp));
        l.count = count;
        l
    }

    #[test]
    fn tokens_parse() {
        assert_eq!("0".parse::<CountOp>().unwrap(), CountOp::Zero);
        assert_eq!("p".parse::<CountOp>().unwrap(), CountOp::Increment);
        assert_eq!("m".parse::<CountOp>().unwrap(), CountOp::Decrement);
        assert!("x".parse::<CountOp>().is_err());
    }

    #[test]
    fn deltas_are_signed_copper() {
        let mut l = lot(250, 2);
        assert_eq!(adjust_count(&mut l, CountOp::Increment), 250);
        assert_eq!(l.count, 3);
        assert_eq!(adjust_count(&mut l, CountOp::Decrement), -250);
        assert_eq!(adjust_count(&mut l, CountOp::Zero), -500);
        assert_eq!(l.count, 0);
    }

    #[test]
    fn decrement_is_bounded_at_zero() {
        let mut l = lot(1_000, 0);
        assert_eq!(adjust_count(&mut l, CountOp::Decrement), 0);
        assert_eq!(l.count, 0);
    }

    #[test]
    fn reset_reports_prior_total() {
        let mut c = Catalog::new();
        c.insert_costs(Category::A, [Gold::from_cp(100), Gold::from_cp(300)]);
        c.get_mut(Category::A, 0).unwrap().count = 2;
        c.get_mut(Category::A, 1).unwrap().count = 1;
        assert_eq!(allocated_total(&c), Gold::from_cp(500));
        assert_eq!(reset_all_counts(&mut c), Gold::from_cp(500));
        assert_eq!(allocated_total(&c), Gold::ZERO);
    }

    #[test]
    fn running_total_tracks_adjustments() {
        let mut c = Catalog::new();
        c.insert_costs(Category::B, [Gold::from_cp(400)]);
        let mut total = AllocatedTotal::from_catalog(&c);
        let l = c.get_mut(Category::B, 0).unwrap();
        total.apply(adjust_count(l, CountOp::Increment));
        total.apply(adjust_count(l, CountOp::Increment));
        assert_eq!(total.get(), Gold::from_cp(800));
        total.apply(adjust_count(l, CountOp::Zero));
        assert_eq!(total.get(), Gold::ZERO);
        assert_eq!(total.apply(-5), Gold::ZERO);
    }
}
