//! crates/hoard_io/src/hasher.rs
//!
//! Deterministic hashing and ID builders for canonical artifacts.
//!
//! - `sha256_canonical(..)` hashes JSON **values/structs** via canonical_json.
//! - `sha256_hex(..)` hashes **raw bytes**.
//! - IDs: `RES:<hex>` for result.json; `RUN:<YYYY-MM-DDTHH:MM:SSZ>:<hex>` for
//!   run_record.json. Hex digests are lowercase.

#![forbid(unsafe_code)]

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical_json::{to_canonical_bytes, to_canonical_json_bytes};
use crate::IoError;

/* ---------------------------------- Helpers ---------------------------------- */

/// True for a lowercase 64-hex string.
#[inline]
pub fn is_lower_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/* ---------------------------- Canonical hashing ---------------------------- */

/// SHA-256 over **canonical JSON bytes** of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

/// SHA-256 over an already-parsed JSON value, canonicalized.
pub fn sha256_canonical_value(v: &Value) -> String {
    sha256_hex(&to_canonical_json_bytes(v))
}

/* ------------------------------- Raw hashing ------------------------------- */

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/* ---------------------------- Artifact ID builders ---------------------------- */

/// `RES:<hex>` over the canonical bytes of `value` (callers pass the doc without its `id`).
pub fn res_id_from_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(format!("RES:{}", sha256_canonical(value)?))
}

/// `RUN:<ts>:<hex>`; `timestamp_utc` is normalized to RFC3339 seconds with `Z`.
pub fn run_id_from_canonical<T: Serialize>(timestamp_utc: &str, value: &T) -> Result<String, IoError> {
    let ts = normalize_rfc3339_utc_seconds(timestamp_utc)?;
    Ok(format!("RUN:{ts}:{}", sha256_canonical(value)?))
}

/// Accepts `YYYY-MM-DDTHH:MM:SS[.frac](Z|+00:00|-00:00)`; returns `YYYY-MM-DDTHH:MM:SSZ`.
pub fn normalize_rfc3339_utc_seconds(ts: &str) -> Result<String, IoError> {
    let bad = || IoError::Invalid(format!("timestamp must be RFC3339 UTC: {ts}"));
    let b = ts.as_bytes();
    if b.len() < 20 || !b.is_ascii() {
        return Err(bad());
    }
    let num = |r: core::ops::Range<usize>| -> Result<u32, IoError> {
        ts[r].parse::<u32>().map_err(|_| bad())
    };
    for (i, sep) in [(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':')] {
        if b[i] != sep {
            return Err(bad());
        }
    }
    let (y, m, d) = (num(0..4)?, num(5..7)?, num(8..10)?);
    let (hh, mm, ss) = (num(11..13)?, num(14..16)?, num(17..19)?);
    if !(1..=12).contains(&m) || !(1..=31).contains(&d) || hh > 23 || mm > 59 || ss > 60 {
        return Err(bad());
    }

    let mut idx = 19;
    if b[idx] == b'.' {
        idx += 1;
        let start = idx;
        while idx < b.len() && b[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == start || idx - start > 9 {
            return Err(bad());
        }
    }
    if !matches!(&ts[idx..], "Z" | "+00:00" | "-00:00") {
        return Err(bad());
    }
    Ok(format!("{y:04}-{m:02}-{d:02}T{hh:02}:{mm:02}:{ss:02}Z"))
}

/* ------------------------------------ Tests ------------------------------------ */

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hex_is_lowercase_and_known() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(is_lower_hex_64(&sha256_hex(b"")));
        assert!(!is_lower_hex_64(&"A".repeat(64)));
    }

    #[test]
    fn canonical_hash_ignores_key_order() {
        let a = json!({"x": 1, "y": [1, 2]});
        let b = json!({"y": [1, 2], "x": 1});
        assert_eq!(sha256_canonical(&a).unwrap(), sha256_canonical(&b).unwrap());
        assert_eq!(sha256_canonical_value(&a), sha256_canonical(&a).unwrap());
    }

    #[test]
    fn ids_have_prefixes() {
        let v = json!({"k": 1});
        let res = res_id_from_canonical(&v).unwrap();
        assert!(res.starts_with("RES:") && res.len() == 4 + 64);
        let run = run_id_from_canonical("2025-08-12T10:00:00.123456Z", &v).unwrap();
        assert!(run.starts_with("RUN:2025-08-12T10:00:00Z:"));
    }

    #[test]
    fn timestamps_normalize_or_fail() {
        assert_eq!(
            normalize_rfc3339_utc_seconds("2025-01-02T03:04:05+00:00").unwrap(),
            "2025-01-02T03:04:05Z"
        );
        for bad in ["2025-01-02 03:04:05Z", "2025-13-02T03:04:05Z", "2025-01-02T03:04:05+02:00", "2025-01-02T03:04:05.Z"] {
            assert!(normalize_rfc3339_utc_seconds(bad).is_err(), "{bad}");
        }
    }
}
