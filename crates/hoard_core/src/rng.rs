// crates/hoard_core/src/rng.rs
//
// Deterministic, integer-only RNG for the allocator's weighted draws.
// Unbiased ranges via rejection sampling, explicit u64 → ChaCha20 seed
// mapping, and a counter of 64-bit words consumed for the run record.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Source of uniform integer draws.
///
/// `draw_below(n)` yields a value in `[0, n)`, or `None` when `n == 0` or
/// the source has nothing left to give. The allocator only ever sees this
/// trait, so tests can script exact draws.
pub trait DrawSource {
    fn draw_below(&mut self, bound: u128) -> Option<u128>;
}

impl<T: DrawSource + ?Sized> DrawSource for &mut T {
    #[inline]
    fn draw_below(&mut self, bound: u128) -> Option<u128> {
        (**self).draw_below(bound)
    }
}

/// Seeded ChaCha20 stream.
///
/// The 64-bit seed goes into the first 8 bytes of the 32-byte ChaCha seed as
/// `seed.to_le_bytes()`; the remaining 24 bytes are zero. This keeps the
/// mapping stable across platforms.
#[derive(Debug, Clone)]
pub struct HoardRng {
    rng: ChaCha20Rng,
    seed: u64,
    words_consumed: u128,
}

impl HoardRng {
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            seed,
            words_consumed: 0,
        }
    }

    /// Seed from OS entropy. The chosen seed is kept so the run can be replayed.
    #[cfg(feature = "std")]
    pub fn from_entropy() -> Self {
        Self::from_seed_u64(rand_core::OsRng.next_u64())
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total number of 64-bit words drawn so far (saturating).
    #[inline]
    pub fn words_consumed(&self) -> u128 {
        self.words_consumed
    }

    /// Only place the counter advances.
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }

    /// Unbiased integer in `[0, n)`; `None` if `n == 0`.
    ///
    /// `threshold = 2^64 mod n` (computed as `n.wrapping_neg() % n`); a word
    /// `x >= threshold` makes `x % n` uniform.
    #[inline]
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// `gen_range` over u128. Bounds that fit in a u64 consume one word per
    /// attempt; wider bounds consume two (high word first).
    pub fn gen_range_u128(&mut self, n: u128) -> Option<u128> {
        if n == 0 {
            return None;
        }
        if let Ok(small) = u64::try_from(n) {
            return self.gen_range(small).map(u128::from);
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let hi = self.next_u64() as u128;
            let lo = self.next_u64() as u128;
            let x = (hi << 64) | lo;
            if x >= threshold {
                return Some(x % n);
            }
        }
    }
}

impl DrawSource for HoardRng {
    #[inline]
    fn draw_below(&mut self, bound: u128) -> Option<u128> {
        self.gen_range_u128(bound)
    }
}

/// Replays a fixed list of draws, each reduced modulo the requested bound.
/// Runs dry (returns `None`) once the list is used up.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDraws {
    queue: VecDeque<u128>,
}

impl ScriptedDraws {
    pub fn new(draws: impl IntoIterator<Item = u128>) -> Self {
        Self { queue: draws.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn into_remaining(self) -> Vec<u128> {
        self.queue.into_iter().collect()
    }
}

impl DrawSource for ScriptedDraws {
    fn draw_below(&mut self, bound: u128) -> Option<u128> {
        if bound == 0 {
            return None;
        }
        self.queue.pop_front().map(|r| r % bound)
    }
}

// ------------------------------
// Tests (determinism & basics)
// ------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_range_zero_none() {
        let mut rng = HoardRng::from_seed_u64(0xDEAD_BEEF_CAFE_BABE);
        assert_eq!(rng.gen_range(0), None);
        assert_eq!(rng.gen_range_u128(0), None);
        assert_eq!(rng.words_consumed(), 0);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = HoardRng::from_seed_u64(123_456_789);
        let mut b = HoardRng::from_seed_u64(123_456_789);
        let seq_a: Vec<u128> = (0..32).map(|_| a.draw_below(1_000).unwrap()).collect();
        let seq_b: Vec<u128> = (0..32).map(|_| b.draw_below(1_000).unwrap()).collect();
        assert_eq!(seq_a, seq_b);
        assert!(seq_a.iter().all(|&v| v < 1_000));
        assert_eq!(a.words_consumed(), b.words_consumed());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = HoardRng::from_seed_u64(1);
        let mut b = HoardRng::from_seed_u64(2);
        let seq_a: Vec<u64> = (0..8).map(|_| a.gen_range(u64::MAX).unwrap()).collect();
        let seq_b: Vec<u64> = (0..8).map(|_| b.gen_range(u64::MAX).unwrap()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn wide_bounds_use_two_words() {
        let mut rng = HoardRng::from_seed_u64(7);
        let bound = (u64::MAX as u128) * 4;
        let v = rng.gen_range_u128(bound).unwrap();
        assert!(v < bound);
        assert!(rng.words_consumed() >= 2);
        assert_eq!(rng.words_consumed() % 2, 0);
    }

    #[test]
    fn seed_is_remembered() {
        assert_eq!(HoardRng::from_seed_u64(42).seed(), 42);
    }

    #[test]
    fn scripted_draws_reduce_and_run_dry() {
        let mut s = ScriptedDraws::new([3, 12]);
        assert_eq!(s.draw_below(0), None);
        assert_eq!(s.draw_below(10), Some(3));
        assert_eq!(s.draw_below(10), Some(2));
        assert_eq!(s.draw_below(10), None);
        assert_eq!(s.remaining(), 0);
    }
}
