//! Loader: read a local catalog JSON file, check its shape, and return a typed
//! `Catalog` plus the SHA-256 of its canonical bytes. No network I/O.
//!
//! Wire shape:
//! ```json
//! { "a": [ {"index": 0, "cost": 50, "item": "50 gp", "description": "coins", "count": 0} ] }
//! ```
//! `cost` is a number of gp (at most two decimals) or a price string such as
//! `"1,250 gp"`. `index` is optional but must equal the array position when
//! present. `count` defaults to 0. Unknown entry fields are ignored.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hoard_core::{Catalog, Category, Gold, Lot};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::IoError;

/// Per-file size ceiling.
pub const MAX_FILE_BYTES: u64 = 8 * 1024 * 1024;

/// Parsed catalog with its canonical digest.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub sha256: String,
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    index: Option<usize>,
    cost: Gold,
    #[serde(default)]
    count: u32,
    #[serde(default)]
    item: String,
    #[serde(default)]
    description: String,
}

// ----------------------------- Entry points -----------------------------

pub fn load_catalog(path: &Path) -> Result<LoadedCatalog, IoError> {
    let v = read_json_value_with_limits(path)?;
    let catalog = catalog_from_value(&v)?;
    let sha256 = digest_of(&v)?;
    debug!(path = %path.display(), lots = catalog.len(), "catalog loaded");
    Ok(LoadedCatalog { catalog, sha256 })
}

/// Build a catalog from an already-parsed JSON document.
pub fn catalog_from_value(v: &Value) -> Result<Catalog, IoError> {
    let obj = v.as_object().ok_or_else(|| IoError::Json {
        pointer: "/".into(),
        msg: "catalog must be an object keyed by category letter".into(),
    })?;

    let mut catalog = Catalog::new();
    for (key, table) in obj {
        let category: Category = key.parse().map_err(|_| IoError::Json {
            pointer: format!("/{key}"),
            msg: format!("unknown treasure category {key:?}"),
        })?;
        let entries = table.as_array().ok_or_else(|| IoError::Json {
            pointer: format!("/{key}"),
            msg: "expected an array of lots".into(),
        })?;

        let mut lots = Vec::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            let pointer = format!("/{key}/{pos}");
            let raw = RawEntry::deserialize(entry)
                .map_err(|e| IoError::Json { pointer: pointer.clone(), msg: e.to_string() })?;
            if let Some(i) = raw.index {
                if i != pos {
                    return Err(IoError::Json {
                        pointer: format!("{pointer}/index"),
                        msg: format!("index {i} does not match position {pos}"),
                    });
                }
            }
            let mut lot = Lot::new(category, pos, raw.cost)
                .with_item(raw.item)
                .with_description(raw.description);
            lot.count = raw.count;
            lots.push(lot);
        }
        catalog.insert_table(category, lots);
    }
    Ok(catalog)
}

/// Read a JSON file, refusing anything over [`MAX_FILE_BYTES`].
pub fn read_json_value_with_limits(path: &Path) -> Result<Value, IoError> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let len = f.metadata().map(|m| m.len()).unwrap_or(0);
    if len > MAX_FILE_BYTES {
        return Err(IoError::Limit(format!(
            "{} is {len} bytes (max {MAX_FILE_BYTES})",
            path.display()
        )));
    }
    let mut buf = Vec::with_capacity(len as usize);
    f.take(MAX_FILE_BYTES + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > MAX_FILE_BYTES {
        return Err(IoError::Limit(format!("{} exceeds {MAX_FILE_BYTES} bytes", path.display())));
    }
    serde_json::from_slice(&buf).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{}: {e}", path.display()),
    })
}

#[cfg(feature = "hash")]
fn digest_of(v: &Value) -> Result<String, IoError> {
    Ok(crate::hasher::sha256_canonical_value(v))
}

#[cfg(not(feature = "hash"))]
fn digest_of(_v: &Value) -> Result<String, IoError> {
    Err(IoError::Hash("hash feature disabled".into()))
}
