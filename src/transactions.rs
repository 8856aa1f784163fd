//! Sparse transaction storage with an interned item vocabulary

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::MiningError;

/// Index of an item in an [`ItemCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u32);

impl ItemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Two-way mapping between item names and dense ids
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    names: Vec<String>,
    ids: FxHashMap<String, ItemId>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, assigning the next free id on first sight
    pub fn intern(&mut self, name: &str) -> ItemId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = ItemId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn id_of(&self, name: &str) -> Option<ItemId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: ItemId) -> &str {
        &self.names[id.index()]
    }

    /// Names for `ids`, sorted lexicographically for stable display
    pub fn sorted_names(&self, ids: &[ItemId]) -> Vec<String> {
        let mut names: Vec<String> = ids.iter().map(|&id| self.name(id).to_string()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Ordered list of transactions, each a sorted, duplicate-free set of items.
///
/// `len()` is the denominator for every support fraction computed from this
/// database, empty transactions included.
#[derive(Debug, Clone, Default)]
pub struct TransactionDatabase {
    catalog: Arc<ItemCatalog>,
    transactions: Vec<Vec<ItemId>>,
}

impl TransactionDatabase {
    /// Build from any iterator of item-name collections. Repeated names in one
    /// transaction count once.
    pub fn from_transactions<I, T, S>(transactions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = ItemCatalog::new();
        let transactions = transactions
            .into_iter()
            .map(|items| {
                let mut ids: Vec<ItemId> = items
                    .into_iter()
                    .map(|name| catalog.intern(name.as_ref()))
                    .collect();
                ids.sort_unstable();
                ids.dedup();
                ids
            })
            .collect();

        Self {
            catalog: Arc::new(catalog),
            transactions,
        }
    }

    /// Build from a boolean occurrence table: one column per item, one row per
    /// transaction, `true` meaning the item is present.
    pub fn from_occurrence_table<S: AsRef<str>>(
        columns: &[S],
        rows: &[Vec<bool>],
    ) -> Result<Self, MiningError> {
        let mut catalog = ItemCatalog::new();
        let ids: Vec<ItemId> = columns.iter().map(|c| catalog.intern(c.as_ref())).collect();

        let mut transactions = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(MiningError::MalformedInput {
                    row: row_idx,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
            let mut present: Vec<ItemId> = row
                .iter()
                .zip(&ids)
                .filter(|&(&flag, _)| flag)
                .map(|(_, &id)| id)
                .collect();
            // Duplicate column names collapse onto one id
            present.sort_unstable();
            present.dedup();
            transactions.push(present);
        }

        Ok(Self {
            catalog: Arc::new(catalog),
            transactions,
        })
    }

    pub fn catalog(&self) -> &Arc<ItemCatalog> {
        &self.catalog
    }

    pub fn transactions(&self) -> &[Vec<ItemId>] {
        &self.transactions
    }

    /// Number of transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transactions_dedups_items() {
        let db = TransactionDatabase::from_transactions(vec![
            vec!["bread", "milk", "bread"],
            vec!["milk"],
            vec![],
        ]);

        assert_eq!(db.len(), 3);
        assert_eq!(db.catalog().len(), 2);
        assert_eq!(db.transactions()[0].len(), 2);
        assert!(db.transactions()[2].is_empty());
    }

    #[test]
    fn test_from_occurrence_table() {
        let columns = ["tea", "coffee", "cake"];
        let rows = vec![
            vec![true, false, true],
            vec![false, false, false],
            vec![true, true, true],
        ];
        let db = TransactionDatabase::from_occurrence_table(&columns, &rows).unwrap();

        assert_eq!(db.len(), 3);
        let cake = db.catalog().id_of("cake").unwrap();
        assert!(db.transactions()[0].contains(&cake));
        assert!(db.transactions()[1].is_empty());
        assert_eq!(db.transactions()[2].len(), 3);
    }

    #[test]
    fn test_occurrence_table_rejects_ragged_rows() {
        let columns = ["tea", "coffee"];
        let rows = vec![vec![true, false], vec![true]];

        let err = TransactionDatabase::from_occurrence_table(&columns, &rows).unwrap_err();
        assert_eq!(
            err,
            MiningError::MalformedInput {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_sorted_names() {
        let mut catalog = ItemCatalog::new();
        let z = catalog.intern("zucchini");
        let a = catalog.intern("apple");
        assert_eq!(catalog.intern("zucchini"), z);
        assert_eq!(catalog.sorted_names(&[z, a]), vec!["apple", "zucchini"]);
    }
}
