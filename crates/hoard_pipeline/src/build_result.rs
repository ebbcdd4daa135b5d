//! build_result.rs: assemble `result.json` from an allocation.
//!
//! The id is `RES:<sha256>` over the canonical JSON of the document with the
//! `id` field left out. Picks keep selection order; category totals are keyed
//! in canonical category order.

use std::collections::BTreeMap;

use hoard_algo::Allocation;
use hoard_core::{Catalog, Category, Gold};
use hoard_io::hasher::res_id_from_canonical;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickRow {
    /// 1-based position in selection order.
    pub n: u32,
    pub category: Category,
    pub index: usize,
    pub item: String,
    pub cost: Gold,
    /// Budget left after this pick.
    pub left: Gold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub picks: u32,
    pub spent: Gold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDoc {
    pub id: String,
    pub budget: Gold,
    pub spent: Gold,
    pub left: Gold,
    pub stop_reason: String,
    pub attempts: u32,
    pub picks: Vec<PickRow>,
    pub per_category: BTreeMap<Category, CategoryTotal>,
}

#[derive(Serialize)]
struct ResultNoId<'a> {
    budget: Gold,
    spent: Gold,
    left: Gold,
    stop_reason: &'a str,
    attempts: u32,
    picks: &'a [PickRow],
    per_category: &'a BTreeMap<Category, CategoryTotal>,
}

pub fn build_result(alloc: &Allocation, catalog: &Catalog) -> Result<ResultDoc, PipelineError> {
    let mut picks = Vec::with_capacity(alloc.picks.len());
    let mut per_category: BTreeMap<Category, CategoryTotal> = BTreeMap::new();

    for (n, p) in alloc.picks.iter().enumerate() {
        let lot = catalog.get(p.category, p.index).ok_or_else(|| {
            PipelineError::Build(format!("pick {} refers to missing lot {}[{}]", n + 1, p.category, p.index))
        })?;
        let n = u32::try_from(n + 1).map_err(|_| PipelineError::Build("too many picks".into()))?;
        picks.push(PickRow {
            n,
            category: p.category,
            index: p.index,
            item: lot.item.clone(),
            cost: p.cost,
            left: p.left_after,
        });

        let total = per_category.entry(p.category).or_default();
        total.picks += 1;
        total.spent = total.spent.saturating_add(p.cost);
    }

    let stop_reason = alloc.stop.as_str();
    let id = res_id_from_canonical(&ResultNoId {
        budget: alloc.budget,
        spent: alloc.spent,
        left: alloc.left,
        stop_reason,
        attempts: alloc.attempts,
        picks: &picks,
        per_category: &per_category,
    })?;

    Ok(ResultDoc {
        id,
        budget: alloc.budget,
        spent: alloc.spent,
        left: alloc.left,
        stop_reason: stop_reason.to_string(),
        attempts: alloc.attempts,
        picks,
        per_category,
    })
}
