//! FP-growth frequent itemset mining

use rayon::prelude::*;
use tracing::{debug, info};

use crate::cancel::{Cancellable, NeverCancel};
use crate::error::{validate_fraction, validate_length, MiningError};
use crate::fptree::FpTree;
use crate::itemsets::{FrequentItemsets, Itemset};
use crate::transactions::{ItemId, TransactionDatabase};

/// Parameters of one mining run
#[derive(Debug, Clone, PartialEq)]
pub struct MiningOptions {
    /// Minimum fraction of transactions an itemset must appear in, in (0, 1]
    pub min_support: f64,
    /// Longest itemset to report; `None` means unbounded
    pub max_len: Option<usize>,
    /// Shard counting and top-level recursion over the rayon pool
    pub parallel: bool,
}

impl MiningOptions {
    pub fn new(min_support: f64) -> Self {
        Self {
            min_support,
            max_len: None,
            parallel: true,
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Mine every itemset whose support reaches `min_support`.
///
/// An empty database gives an empty collection.
pub fn mine(db: &TransactionDatabase, min_support: f64) -> Result<FrequentItemsets, MiningError> {
    mine_with(db, &MiningOptions::new(min_support), &NeverCancel)
}

/// Mine with explicit options and a cancellation token.
///
/// Returns [`MiningError::Cancelled`] as soon as the token is observed; a
/// cancelled run never yields a partial collection.
pub fn mine_with<C: Cancellable>(
    db: &TransactionDatabase,
    options: &MiningOptions,
    cancel: &C,
) -> Result<FrequentItemsets, MiningError> {
    let min_support = validate_fraction("min_support", options.min_support)?;
    let max_len = match options.max_len {
        Some(len) => validate_length("max_len", len)?,
        None => usize::MAX,
    };

    let catalog = db.catalog().clone();
    let n = db.len();
    if n == 0 {
        debug!("empty transaction database");
        return Ok(FrequentItemsets::new(catalog, 0, Vec::new()));
    }
    if cancel.is_cancelled() {
        return Err(MiningError::Cancelled);
    }

    let min_count = min_count_for(min_support, n);
    let counts = count_items(db, catalog.len(), options.parallel);

    // Canonical order: descending support, ties broken by name
    let mut ranked: Vec<ItemId> = (0..catalog.len() as u32)
        .map(ItemId)
        .filter(|id| counts[id.index()] >= min_count)
        .collect();
    ranked.sort_by(|a, b| {
        counts[b.index()]
            .cmp(&counts[a.index()])
            .then_with(|| catalog.name(*a).cmp(catalog.name(*b)))
    });

    let mut rank_of = vec![None; catalog.len()];
    for (rank, id) in ranked.iter().enumerate() {
        rank_of[id.index()] = Some(rank as u32);
    }

    let mut tree = FpTree::new(ranked.len());
    let mut path = Vec::new();
    for transaction in db.transactions() {
        path.clear();
        path.extend(transaction.iter().filter_map(|id| rank_of[id.index()]));
        if !path.is_empty() {
            path.sort_unstable();
            tree.insert(&path, 1);
        }
    }
    debug!(
        transactions = n,
        min_count,
        items = catalog.len(),
        frequent_items = ranked.len(),
        tree_nodes = tree.node_count(),
        "built FP-tree"
    );

    let growth = Growth {
        min_count,
        max_len,
        cancel,
    };
    let patterns = if options.parallel {
        growth.grow_parallel(&tree)?
    } else {
        let mut out = Vec::new();
        growth.grow(&tree, &[], &mut out)?;
        out
    };

    let itemsets = patterns
        .into_iter()
        .map(|(ranks, count)| {
            let items = ranks.iter().map(|&rank| ranked[rank as usize]).collect();
            Itemset::new(items, count)
        })
        .collect();
    let result = FrequentItemsets::new(catalog, n, itemsets);

    info!(
        itemsets = result.len(),
        transactions = n,
        min_support,
        "frequent itemset mining complete"
    );
    Ok(result)
}

/// Smallest count `c` with `c / n >= min_support`, evaluated in floating point
/// exactly as a support fraction is.
pub(crate) fn min_count_for(min_support: f64, n: usize) -> u64 {
    let total = n as f64;
    let mut count = (min_support * total).ceil().max(1.0) as u64;
    while count > 1 && (count - 1) as f64 / total >= min_support {
        count -= 1;
    }
    while (count as f64) / total < min_support {
        count += 1;
    }
    count
}

fn count_items(db: &TransactionDatabase, item_count: usize, parallel: bool) -> Vec<u64> {
    let tally = |mut acc: Vec<u64>, transaction: &Vec<ItemId>| {
        for id in transaction {
            acc[id.index()] += 1;
        }
        acc
    };

    if parallel {
        db.transactions()
            .par_iter()
            .fold(|| vec![0u64; item_count], tally)
            .reduce(
                || vec![0u64; item_count],
                |mut left, right| {
                    for (l, r) in left.iter_mut().zip(right) {
                        *l += r;
                    }
                    left
                },
            )
    } else {
        db.transactions().iter().fold(vec![0u64; item_count], tally)
    }
}

/// A pattern in rank space with its support count
type Pattern = (Vec<u32>, u64);

struct Growth<'a, C> {
    min_count: u64,
    max_len: usize,
    cancel: &'a C,
}

impl<C: Cancellable> Growth<'_, C> {
    /// Top-level recursion with one rayon task per item
    fn grow_parallel(&self, tree: &FpTree) -> Result<Vec<Pattern>, MiningError> {
        if tree.single_path().is_some() {
            let mut out = Vec::new();
            self.grow(tree, &[], &mut out)?;
            return Ok(out);
        }

        let parts = tree
            .ranks_bottom_up()
            .into_par_iter()
            .map(|rank| {
                let mut out = Vec::new();
                self.grow_item(tree, rank, &[], &mut out)?;
                Ok::<_, MiningError>(out)
            })
            .collect::<Result<Vec<_>, MiningError>>()?;

        Ok(parts.into_iter().flatten().collect())
    }

    fn grow(&self, tree: &FpTree, suffix: &[u32], out: &mut Vec<Pattern>) -> Result<(), MiningError> {
        if self.cancel.is_cancelled() {
            return Err(MiningError::Cancelled);
        }
        if suffix.len() >= self.max_len {
            return Ok(());
        }

        if let Some(path) = tree.single_path() {
            let mut chosen = Vec::new();
            self.combine_path(&path, 0, suffix, &mut chosen, out);
            return Ok(());
        }

        for rank in tree.ranks_bottom_up() {
            self.grow_item(tree, rank, suffix, out)?;
        }
        Ok(())
    }

    /// Emit `rank + suffix`, then mine its conditional tree
    fn grow_item(
        &self,
        tree: &FpTree,
        rank: u32,
        suffix: &[u32],
        out: &mut Vec<Pattern>,
    ) -> Result<(), MiningError> {
        if self.cancel.is_cancelled() {
            return Err(MiningError::Cancelled);
        }
        let support = tree.support(rank);
        if support < self.min_count {
            return Ok(());
        }

        let mut pattern = Vec::with_capacity(suffix.len() + 1);
        pattern.push(rank);
        pattern.extend_from_slice(suffix);
        out.push((pattern.clone(), support));

        if pattern.len() < self.max_len {
            let paths = tree.prefix_paths(rank);
            if !paths.is_empty() {
                let conditional = FpTree::from_prefix_paths(&paths, self.min_count);
                if !conditional.is_empty() {
                    self.grow(&conditional, &pattern, out)?;
                }
            }
        }
        Ok(())
    }

    /// Every combination of a single-path tree's nodes. Counts never grow
    /// going down a path, so a combination's support is its deepest node's count.
    fn combine_path(
        &self,
        path: &[(u32, u64)],
        start: usize,
        suffix: &[u32],
        chosen: &mut Vec<u32>,
        out: &mut Vec<Pattern>,
    ) {
        for (offset, &(rank, count)) in path[start..].iter().enumerate() {
            if count < self.min_count {
                break;
            }
            chosen.push(rank);

            let mut pattern = chosen.clone();
            pattern.extend_from_slice(suffix);
            out.push((pattern, count));

            if chosen.len() + suffix.len() < self.max_len {
                self.combine_path(path, start + offset + 1, suffix, chosen, out);
            }
            chosen.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;

    fn scenario_db() -> TransactionDatabase {
        TransactionDatabase::from_transactions(vec![
            vec!["A", "B"],
            vec!["A", "B"],
            vec!["A"],
            vec!["B", "C"],
        ])
    }

    fn named(result: &FrequentItemsets) -> Vec<(Vec<String>, u64)> {
        result
            .iter()
            .map(|set| (result.names(set), set.support_count()))
            .collect()
    }

    #[test]
    fn test_min_count_for() {
        assert_eq!(min_count_for(0.5, 4), 2);
        assert_eq!(min_count_for(1.0, 4), 4);
        assert_eq!(min_count_for(0.01, 4), 1);
        // 0.3 * 10 rounds up past 3 in floating point
        assert_eq!(min_count_for(0.3, 10), 3);
        assert_eq!(min_count_for(0.7, 10), 7);
    }

    #[test]
    fn test_mine_scenario() {
        let result = mine(&scenario_db(), 0.5).unwrap();

        assert_eq!(result.transaction_count(), 4);
        assert_eq!(
            named(&result),
            vec![
                (vec!["A".to_string()], 3),
                (vec!["B".to_string()], 3),
                (vec!["A".to_string(), "B".to_string()], 2),
            ]
        );
        assert_eq!(result.support_of(&["A"]), Some(0.75));
        assert_eq!(result.support_of(&["A", "B"]), Some(0.5));
        assert_eq!(result.support_of(&["C"]), None);
    }

    #[test]
    fn test_mine_empty_database() {
        let db = TransactionDatabase::from_transactions(Vec::<Vec<&str>>::new());
        let result = mine(&db, 0.5).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_invalid_threshold() {
        let err = mine(&scenario_db(), 1.5).unwrap_err();
        assert!(matches!(err, MiningError::InvalidThreshold { name: "min_support", .. }));

        assert!(mine(&scenario_db(), 0.0).is_err());
        // validated even when there is nothing to mine
        let empty = TransactionDatabase::from_transactions(Vec::<Vec<&str>>::new());
        assert!(mine(&empty, -1.0).is_err());
    }

    #[test]
    fn test_deeper_itemsets() {
        let db = TransactionDatabase::from_transactions(vec![
            vec!["bread", "milk", "eggs"],
            vec!["bread", "milk", "eggs", "jam"],
            vec!["bread", "milk"],
            vec!["milk", "eggs"],
            vec!["bread", "eggs", "jam"],
        ]);
        let result = mine(&db, 0.4).unwrap();

        let lookup = |names: &[&str]| result.support_of(names).map(|s| (s * 5.0).round() as u64);
        assert_eq!(lookup(&["bread"]), Some(4));
        assert_eq!(lookup(&["milk"]), Some(4));
        assert_eq!(lookup(&["eggs"]), Some(4));
        assert_eq!(lookup(&["jam"]), Some(2));
        assert_eq!(lookup(&["bread", "milk"]), Some(3));
        assert_eq!(lookup(&["bread", "eggs"]), Some(3));
        assert_eq!(lookup(&["milk", "eggs"]), Some(3));
        assert_eq!(lookup(&["bread", "jam"]), Some(2));
        assert_eq!(lookup(&["eggs", "jam"]), Some(2));
        assert_eq!(lookup(&["bread", "milk", "eggs"]), Some(2));
        assert_eq!(lookup(&["bread", "eggs", "jam"]), Some(2));
        assert_eq!(lookup(&["milk", "jam"]), None);
        assert_eq!(result.len(), 11);
    }

    #[test]
    fn test_max_len() {
        let db = TransactionDatabase::from_transactions(vec![vec!["a", "b", "c"], vec!["a", "b", "c"]]);

        let all = mine(&db, 0.5).unwrap();
        assert_eq!(all.len(), 7);

        let options = MiningOptions::new(0.5).with_max_len(2);
        let bounded = mine_with(&db, &options, &NeverCancel).unwrap();
        assert_eq!(bounded.len(), 6);
        assert!(bounded.iter().all(|set| set.len() <= 2));

        let zero = MiningOptions::new(0.5).with_max_len(0);
        assert!(matches!(
            mine_with(&db, &zero, &NeverCancel),
            Err(MiningError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let db = TransactionDatabase::from_transactions(vec![
            vec!["a", "b", "d"],
            vec!["b", "c"],
            vec!["a", "c", "d"],
            vec!["a", "b", "c", "d"],
            vec!["c", "d"],
            vec!["a", "d"],
        ]);
        let parallel = mine(&db, 0.3).unwrap();
        let sequential = mine_with(&db, &MiningOptions::new(0.3).sequential(), &NeverCancel).unwrap();

        assert_eq!(named(&parallel), named(&sequential));
    }

    #[test]
    fn test_cancelled_run() {
        let token = CancellationToken::new();
        token.cancel();

        let result = mine_with(&scenario_db(), &MiningOptions::new(0.25), &token);
        assert_eq!(result.unwrap_err(), MiningError::Cancelled);
    }
}
