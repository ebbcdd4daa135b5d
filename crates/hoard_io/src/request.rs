//! Generation request: the per-category `{index, count}` lists handed to the
//! item generator once counts are settled.
//!
//! ```json
//! {"mode":"hoard_generate","a":[{"index":0,"count":3}],"d":[{"index":4,"count":1}]}
//! ```
//!
//! Each category's total is capped. Entries are taken in table order, each
//! one's count clipped to what is left under the cap; the list stops at the
//! first entry that would get nothing.

use std::collections::BTreeMap;

use hoard_core::{Catalog, Category};
use serde::{Deserialize, Serialize};

pub const MODE_HOARD_GENERATE: &str = "hoard_generate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub index: usize,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub mode: String,
    #[serde(flatten)]
    pub tables: BTreeMap<Category, Vec<CountEntry>>,
}

impl GenerateRequest {
    /// Items requested across all categories.
    pub fn total(&self) -> u64 {
        self.tables.values().flatten().map(|e| e.count as u64).sum()
    }
}

/// Collect non-zero counts from `catalog`, capping each category at `cap`.
/// Categories with nothing requested are omitted.
pub fn build_generate_request(catalog: &Catalog, cap: u32) -> GenerateRequest {
    let mut tables = BTreeMap::new();
    for (category, lots) in catalog.tables() {
        let mut remaining = cap;
        let mut entries = Vec::new();
        for lot in lots.iter().filter(|l| l.count > 0) {
            let c = lot.count.min(remaining);
            if c == 0 {
                break;
            }
            remaining -= c;
            entries.push(CountEntry { index: lot.index, count: c });
        }
        if !entries.is_empty() {
            tables.insert(category, entries);
        }
    }
    GenerateRequest { mode: MODE_HOARD_GENERATE.to_string(), tables }
}
