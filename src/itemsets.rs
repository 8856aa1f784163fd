//! Frequent itemsets produced by one mining run

use std::cmp::Reverse;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::transactions::{ItemCatalog, ItemId};

/// A set of items together with the number of transactions containing all of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itemset {
    items: Vec<ItemId>,
    support_count: u64,
}

impl Itemset {
    /// `items` is sorted and deduplicated on construction
    pub fn new(mut items: Vec<ItemId>, support_count: u64) -> Self {
        items.sort_unstable();
        items.dedup();
        Self {
            items,
            support_count,
        }
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn support_count(&self) -> u64 {
        self.support_count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Every itemset meeting the support threshold of one run.
///
/// Ordered by descending support count, then ascending size, then item names.
/// Immutable once built; the collection is downward closed, so any subset of
/// a member can be looked up with [`FrequentItemsets::support_count_of`].
#[derive(Debug, Clone)]
pub struct FrequentItemsets {
    catalog: Arc<ItemCatalog>,
    transaction_count: usize,
    itemsets: Vec<Itemset>,
    index: FxHashMap<Vec<ItemId>, u64>,
}

impl FrequentItemsets {
    pub(crate) fn new(catalog: Arc<ItemCatalog>, transaction_count: usize, mut itemsets: Vec<Itemset>) -> Self {
        itemsets.sort_by_cached_key(|set| {
            (
                Reverse(set.support_count),
                set.len(),
                catalog.sorted_names(&set.items),
            )
        });
        let index = itemsets
            .iter()
            .map(|set| (set.items.clone(), set.support_count))
            .collect();

        Self {
            catalog,
            transaction_count,
            itemsets,
            index,
        }
    }

    pub fn catalog(&self) -> &Arc<ItemCatalog> {
        &self.catalog
    }

    /// Size of the transaction database the supports are relative to
    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Itemset> {
        self.itemsets.iter()
    }

    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    /// Fraction of transactions containing `itemset`
    pub fn support(&self, itemset: &Itemset) -> f64 {
        self.fraction(itemset.support_count)
    }

    /// Support count of a sorted item list, if it is frequent
    pub fn support_count_of(&self, items: &[ItemId]) -> Option<u64> {
        self.index.get(items).copied()
    }

    /// Support of the itemset named by `names`, if it is frequent
    pub fn support_of<S: AsRef<str>>(&self, names: &[S]) -> Option<f64> {
        let mut items = names
            .iter()
            .map(|name| self.catalog.id_of(name.as_ref()))
            .collect::<Option<Vec<_>>>()?;
        items.sort_unstable();
        items.dedup();
        self.support_count_of(&items).map(|count| self.fraction(count))
    }

    /// Item names of `itemset`, sorted
    pub fn names(&self, itemset: &Itemset) -> Vec<String> {
        self.catalog.sorted_names(&itemset.items)
    }

    pub(crate) fn fraction(&self, count: u64) -> f64 {
        count as f64 / self.transaction_count as f64
    }
}

impl<'a> IntoIterator for &'a FrequentItemsets {
    type Item = &'a Itemset;
    type IntoIter = std::slice::Iter<'a, Itemset>;

    fn into_iter(self) -> Self::IntoIter {
        self.itemsets.iter()
    }
}
