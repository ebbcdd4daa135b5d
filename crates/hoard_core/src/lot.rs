//! Treasure-table entries and the per-category catalog.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::gold::Gold;

/// One purchasable treasure-table entry.
///
/// `index` is the lot's position inside its category and survives any
/// sorting of copies, so a pick can always be traced back to the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Lot {
    pub category: Category,
    pub index: usize,
    pub cost: Gold,
    #[cfg_attr(feature = "serde", serde(default))]
    pub count: u32,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "String::is_empty"))]
    pub item: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "String::is_empty"))]
    pub description: String,
}

impl Lot {
    pub fn new(category: Category, index: usize, cost: Gold) -> Self {
        Self {
            category,
            index,
            cost,
            count: 0,
            item: String::new(),
            description: String::new(),
        }
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = item.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `count × cost`; `None` on overflow.
    pub fn allocated(&self) -> Option<Gold> {
        self.cost.checked_mul(self.count as u64)
    }
}

/// First lot whose `category`/`index` disagrees with where it sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Misplaced {
    pub category: Category,
    pub position: usize,
}

/// Lots grouped by category, each list in table order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Catalog(BTreeMap<Category, Vec<Lot>>);

impl Catalog {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build one category's table from costs, assigning `index` by position.
    pub fn insert_costs<I>(&mut self, category: Category, costs: I)
    where
        I: IntoIterator<Item = Gold>,
    {
        let lots = costs
            .into_iter()
            .enumerate()
            .map(|(i, c)| Lot::new(category, i, c))
            .collect();
        self.0.insert(category, lots);
    }

    /// Replace one category's table wholesale. No well-formedness check here;
    /// see [`Catalog::check_well_formed`].
    pub fn insert_table(&mut self, category: Category, lots: Vec<Lot>) -> Option<Vec<Lot>> {
        self.0.insert(category, lots)
    }

    /// Append a lot, stamping `category` and `index` to match its slot.
    pub fn push(&mut self, category: Category, mut lot: Lot) -> usize {
        let table = self.0.entry(category).or_default();
        let index = table.len();
        lot.category = category;
        lot.index = index;
        table.push(lot);
        index
    }

    pub fn table(&self, category: Category) -> &[Lot] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, category: Category, index: usize) -> Option<&Lot> {
        self.0.get(&category).and_then(|t| t.get(index))
    }

    pub fn get_mut(&mut self, category: Category, index: usize) -> Option<&mut Lot> {
        self.0.get_mut(&category).and_then(|t| t.get_mut(index))
    }

    /// Categories that have a table (possibly empty), in canonical order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.keys().copied()
    }

    /// Every lot, category-major then by index.
    pub fn iter(&self) -> impl Iterator<Item = &Lot> + '_ {
        self.0.values().flat_map(|t| t.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Lot> + '_ {
        self.0.values_mut().flat_map(|t| t.iter_mut())
    }

    pub fn tables(&self) -> impl Iterator<Item = (Category, &[Lot])> + '_ {
        self.0.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ok iff every lot under key `k` has `category == k` and `index == position`.
    pub fn check_well_formed(&self) -> Result<(), Misplaced> {
        for (cat, table) in &self.0 {
            for (pos, lot) in table.iter().enumerate() {
                if lot.category != *cat || lot.index != pos {
                    return Err(Misplaced { category: *cat, position: pos });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gp(n: u64) -> Gold {
        Gold::from_gp(n).unwrap()
    }

    #[test]
    fn insert_costs_assigns_positions() {
        let mut c = Catalog::new();
        c.insert_costs(Category::B, [gp(5), gp(10), gp(20)]);
        let t = c.table(Category::B);
        assert_eq!(t.len(), 3);
        assert_eq!(t[2].index, 2);
        assert_eq!(t[2].category, Category::B);
        assert!(c.check_well_formed().is_ok());
        assert!(c.table(Category::A).is_empty());
    }

    #[test]
    fn push_stamps_slot() {
        let mut c = Catalog::new();
        let i0 = c.push(Category::C, Lot::new(Category::A, 99, gp(1)).with_item("ring"));
        let i1 = c.push(Category::C, Lot::new(Category::A, 99, gp(2)));
        assert_eq!((i0, i1), (0, 1));
        assert_eq!(c.get(Category::C, 0).unwrap().item, "ring");
        assert!(c.check_well_formed().is_ok());
    }

    #[test]
    fn misplaced_lot_is_reported() {
        let mut c = Catalog::new();
        c.insert_table(
            Category::A,
            vec![Lot::new(Category::A, 0, gp(1)), Lot::new(Category::A, 5, gp(1))],
        );
        assert_eq!(
            c.check_well_formed(),
            Err(Misplaced { category: Category::A, position: 1 })
        );

        let mut c = Catalog::new();
        c.insert_table(Category::D, vec![Lot::new(Category::E, 0, gp(1))]);
        assert_eq!(
            c.check_well_formed(),
            Err(Misplaced { category: Category::D, position: 0 })
        );
    }

    #[test]
    fn allocated_is_count_times_cost() {
        let mut l = Lot::new(Category::A, 0, Gold::from_cp(1_250));
        l.count = 3;
        assert_eq!(l.allocated(), Some(Gold::from_cp(3_750)));
    }

    #[test]
    fn iteration_is_category_major() {
        let mut c = Catalog::new();
        c.insert_costs(Category::D, [gp(1)]);
        c.insert_costs(Category::A, [gp(2), gp(3)]);
        let seen: Vec<(Category, usize)> = c.iter().map(|l| (l.category, l.index)).collect();
        assert_eq!(seen, vec![(Category::A, 0), (Category::A, 1), (Category::D, 0)]);
        assert_eq!(c.len(), 3);
    }
}
