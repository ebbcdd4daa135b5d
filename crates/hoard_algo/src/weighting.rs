//! Selection weights.
//!
//! A lot's weight is a function of its cost and its cost tier (the rank of
//! its distinct cost level in the sorted pool, starting at 0). All schemes are
//! integer-only; `None` signals that the weight left the `u128` range.

use hoard_core::Gold;
use tracing::warn;

pub use hoard_core::variables::WeightScheme;

/// Highest tier `power_of_two` can express (`2^127` is the largest u128 power).
pub const MAX_POW2_TIER: u32 = 127;

pub trait Weighting {
    fn weight(&self, cost: Gold, tier: u32) -> Option<u128>;
}

impl Weighting for WeightScheme {
    fn weight(&self, cost: Gold, tier: u32) -> Option<u128> {
        match self {
            WeightScheme::PowerOfTwo => pow2(tier),
            WeightScheme::Fibonacci => fibonacci(tier),
            WeightScheme::Cost => Some(cost.whole_gp() as u128),
            WeightScheme::DoubledCost => Some(cost.whole_gp() as u128 * 2),
            WeightScheme::SquaredCost => {
                let gp = cost.whole_gp() as u128;
                gp.checked_mul(gp)
            }
        }
    }
}

impl<F> Weighting for F
where
    F: Fn(Gold, u32) -> Option<u128>,
{
    #[inline]
    fn weight(&self, cost: Gold, tier: u32) -> Option<u128> {
        self(cost, tier)
    }
}

#[inline]
fn pow2(tier: u32) -> Option<u128> {
    if tier > MAX_POW2_TIER {
        None
    } else {
        Some(1u128 << tier)
    }
}

/// `F(tier)` over 1, 2, 3, 5, 8, 13, …
fn fibonacci(tier: u32) -> Option<u128> {
    let mut a: Option<u128> = Some(1);
    let mut b: Option<u128> = Some(2);
    for _ in 0..tier {
        let next = match (a, b) {
            (Some(x), Some(y)) => x.checked_add(y),
            _ => None,
        };
        a = b;
        b = next;
    }
    a
}

/// Configuration-facing parse: unknown tokens select `cost` and log a warning.
pub fn scheme_from_config(token: &str) -> WeightScheme {
    let (scheme, fell_back) = WeightScheme::from_token_lenient(token);
    if fell_back {
        warn!(token, "unrecognized weighting scheme; using cost");
    }
    scheme
}
