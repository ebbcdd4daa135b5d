//! Integer-first money.
//!
//! `Gold` holds an exact number of copper pieces (1 gp = 100 cp). Budgets and
//! lot costs are compared and subtracted exactly; there is no float state.
//!
//! Price strings follow the treasure tables: one or more `<amount> [pp|gp|sp|cp]`
//! pieces, unit defaulting to gp, thousand separators allowed, e.g.
//! `"1,250.50 gp"`, `"3 pp, 5 gp 2 sp"`, `"800"`.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use crate::errors::CoreError;

const CP_PER_SP: u64 = 10;
const CP_PER_GP: u64 = 100;
const CP_PER_PP: u64 = 1_000;

/// Non-negative amount of currency, in copper pieces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gold(u64);

impl Gold {
    pub const ZERO: Gold = Gold(0);
    pub const MAX: Gold = Gold(u64::MAX);

    #[inline]
    pub const fn from_cp(cp: u64) -> Self {
        Gold(cp)
    }

    /// Whole gold pieces; `None` on overflow.
    #[inline]
    pub const fn from_gp(gp: u64) -> Option<Self> {
        match gp.checked_mul(CP_PER_GP) {
            Some(cp) => Some(Gold(cp)),
            None => None,
        }
    }

    /// Gold pieces from a JSON-style number. At most two decimals survive;
    /// anything finer is rounded to the nearest copper.
    pub fn from_gp_f64(gp: f64) -> Result<Self, CoreError> {
        if !gp.is_finite() || gp < 0.0 {
            return Err(CoreError::InvalidPrice);
        }
        let cp = gp * CP_PER_GP as f64;
        if cp >= u64::MAX as f64 {
            return Err(CoreError::Overflow);
        }
        // f64::round is std-only; add-half-then-truncate is equivalent for cp >= 0.
        Ok(Gold((cp + 0.5) as u64))
    }

    #[inline]
    pub const fn cp(self) -> u64 {
        self.0
    }

    /// Truncated to whole gold pieces.
    #[inline]
    pub const fn whole_gp(self) -> u64 {
        self.0 / CP_PER_GP
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn checked_add(self, rhs: Gold) -> Option<Gold> {
        self.0.checked_add(rhs.0).map(Gold)
    }

    #[inline]
    pub fn checked_sub(self, rhs: Gold) -> Option<Gold> {
        self.0.checked_sub(rhs.0).map(Gold)
    }

    #[inline]
    pub fn saturating_add(self, rhs: Gold) -> Gold {
        Gold(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Gold) -> Gold {
        Gold(self.0.saturating_sub(rhs.0))
    }

    /// `self × n`, `None` on overflow.
    #[inline]
    pub fn checked_mul(self, n: u64) -> Option<Gold> {
        self.0.checked_mul(n).map(Gold)
    }

    /// `self × num / den`, truncating to whole copper. `None` if `den == 0`
    /// or the product leaves the u64 range.
    pub fn scale(self, num: u64, den: u64) -> Option<Gold> {
        if den == 0 {
            return None;
        }
        let v = (self.0 as u128) * (num as u128) / (den as u128);
        u64::try_from(v).ok().map(Gold)
    }
}

impl fmt::Display for Gold {
    /// `1,250.50 gp` (two decimals, grouped thousands).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / CP_PER_GP;
        let frac = self.0 % CP_PER_GP;
        write!(f, "{}.{:02} gp", group_thousands(whole), frac)
    }
}

fn group_thousands(mut n: u64) -> String {
    let mut groups: [u16; 7] = [0; 7];
    let mut len = 0usize;
    loop {
        groups[len] = (n % 1000) as u16;
        len += 1;
        n /= 1000;
        if n == 0 {
            break;
        }
    }
    let mut out = String::new();
    for i in (0..len).rev() {
        if i == len - 1 {
            out.push_str(&alloc::format!("{}", groups[i]));
        } else {
            out.push_str(&alloc::format!(",{:03}", groups[i]));
        }
    }
    out
}

impl FromStr for Gold {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = s.trim().as_bytes();
        if b.is_empty() {
            return Err(CoreError::InvalidPrice);
        }
        let mut i = 0usize;
        let mut total: u64 = 0;
        let mut pieces = 0u32;

        loop {
            while i < b.len() && (b[i] == b' ' || b[i] == b',' || b[i] == b'\t') {
                i += 1;
            }
            if i == b.len() {
                break;
            }

            // Integer part with optional thousand separators (a comma only
            // belongs to the number when a digit follows it).
            let mut whole: u64 = 0;
            let mut digits = 0u32;
            while i < b.len() {
                match b[i] {
                    d @ b'0'..=b'9' => {
                        whole = whole
                            .checked_mul(10)
                            .and_then(|w| w.checked_add((d - b'0') as u64))
                            .ok_or(CoreError::Overflow)?;
                        digits += 1;
                        i += 1;
                    }
                    b',' if digits > 0 && i + 1 < b.len() && b[i + 1].is_ascii_digit() => i += 1,
                    _ => break,
                }
            }
            if digits == 0 {
                return Err(CoreError::InvalidPrice);
            }

            // Fraction: one or two digits.
            let mut frac: u64 = 0;
            let mut frac_len = 0u32;
            if i < b.len() && b[i] == b'.' {
                i += 1;
                while i < b.len() && b[i].is_ascii_digit() {
                    if frac_len == 2 {
                        return Err(CoreError::InvalidPrice);
                    }
                    frac = frac * 10 + (b[i] - b'0') as u64;
                    frac_len += 1;
                    i += 1;
                }
                if frac_len == 0 {
                    return Err(CoreError::InvalidPrice);
                }
            }

            while i < b.len() && b[i] == b' ' {
                i += 1;
            }

            let unit_cp = if i + 1 < b.len() {
                match (b[i].to_ascii_lowercase(), b[i + 1].to_ascii_lowercase()) {
                    (b'p', b'p') => Some(CP_PER_PP),
                    (b'g', b'p') => Some(CP_PER_GP),
                    (b's', b'p') => Some(CP_PER_SP),
                    (b'c', b'p') => Some(1),
                    _ => None,
                }
            } else {
                None
            };
            let unit_cp = match unit_cp {
                Some(u) => {
                    i += 2;
                    if i < b.len() && b[i].is_ascii_alphabetic() {
                        return Err(CoreError::InvalidPrice);
                    }
                    u
                }
                None => {
                    if i < b.len() && !matches!(b[i], b' ' | b',' | b'\t') {
                        return Err(CoreError::InvalidPrice);
                    }
                    CP_PER_GP
                }
            };

            let scale = if frac_len == 1 { 10 } else { 100 };
            let frac_cp = if frac_len == 0 {
                0
            } else {
                let num = frac * unit_cp;
                if num % scale != 0 {
                    // Finer than a copper piece.
                    return Err(CoreError::InvalidPrice);
                }
                num / scale
            };
            let piece = whole
                .checked_mul(unit_cp)
                .and_then(|w| w.checked_add(frac_cp))
                .ok_or(CoreError::Overflow)?;
            total = total.checked_add(piece).ok_or(CoreError::Overflow)?;
            pieces += 1;
        }

        if pieces == 0 {
            return Err(CoreError::InvalidPrice);
        }
        Ok(Gold(total))
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialized as the display string (`"1,250.50 gp"`), which parses back exactly.
    impl Serialize for Gold {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    struct GoldVisitor;

    impl<'de> Visitor<'de> for GoldVisitor {
        type Value = Gold;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative gp amount or a price string like \"1,250 gp\"")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Gold, E> {
            Gold::from_gp(v).ok_or_else(|| E::custom("gold amount overflow"))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Gold, E> {
            if v < 0 {
                return Err(E::invalid_value(de::Unexpected::Signed(v), &self));
            }
            self.visit_u64(v as u64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Gold, E> {
            Gold::from_gp_f64(v).map_err(|_| E::invalid_value(de::Unexpected::Float(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Gold, E> {
            v.parse().map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    impl<'de> Deserialize<'de> for Gold {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_any(GoldVisitor)
        }
    }
}
