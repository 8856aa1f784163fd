//! Association rule derivation from frequent itemsets

use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{validate_fraction, validate_length, MiningError};
use crate::itemsets::FrequentItemsets;
use crate::transactions::ItemId;

/// An association rule `antecedent -> consequent`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// Item names on the left-hand side, sorted
    pub antecedent: Vec<String>,
    /// Item names on the right-hand side, sorted
    pub consequent: Vec<String>,
    /// Transactions containing both sides
    pub support_count: u64,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    pub leverage: f64,
    /// Infinite when confidence is 1
    pub conviction: f64,
}

impl Rule {
    /// Combined number of items on both sides
    pub fn size(&self) -> usize {
        self.antecedent.len() + self.consequent.len()
    }
}

/// Parameters of one derivation run
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOptions {
    /// Minimum confidence, in (0, 1]
    pub min_confidence: f64,
    /// Upper bound on `|antecedent| + |consequent|`
    pub max_rule_size: Option<usize>,
}

impl RuleOptions {
    pub fn new(min_confidence: f64) -> Self {
        Self {
            min_confidence,
            max_rule_size: None,
        }
    }

    pub fn with_max_rule_size(mut self, max_rule_size: usize) -> Self {
        self.max_rule_size = Some(max_rule_size);
        self
    }
}

/// Derive every rule meeting `min_confidence` from `itemsets`
pub fn derive(
    itemsets: &FrequentItemsets,
    min_confidence: f64,
    max_rule_size: Option<usize>,
) -> Result<Vec<Rule>, MiningError> {
    derive_with(
        itemsets,
        &RuleOptions {
            min_confidence,
            max_rule_size,
        },
    )
}

/// Derive rules, ordered by descending support count of the originating
/// itemset, then descending confidence and lift, then item names.
///
/// Supports are read from `itemsets` only; transactions are never rescanned.
pub fn derive_with(itemsets: &FrequentItemsets, options: &RuleOptions) -> Result<Vec<Rule>, MiningError> {
    let min_confidence = validate_fraction("min_confidence", options.min_confidence)?;
    let max_size = match options.max_rule_size {
        Some(size) => validate_length("max_rule_size", size)?,
        None => usize::MAX,
    };

    let mut rules = Vec::new();
    let mut candidates = 0usize;
    for itemset in itemsets {
        let size = itemset.len();
        if size < 2 || size > max_size {
            continue;
        }
        let Some(full_mask) = split_mask(size) else {
            warn!(size, "itemset too large to split into rules, skipped");
            continue;
        };

        let items = itemset.items();
        let support = itemsets.support(itemset);
        for mask in 1..full_mask {
            candidates += 1;
            let (antecedent, consequent) = split(items, mask);
            let antecedent_count = lookup(itemsets, &antecedent)?;
            let consequent_count = lookup(itemsets, &consequent)?;

            let antecedent_support = itemsets.fraction(antecedent_count);
            let consequent_support = itemsets.fraction(consequent_count);
            let confidence = support / antecedent_support;
            if confidence < min_confidence {
                continue;
            }

            let lift = confidence / consequent_support;
            let leverage = support - antecedent_support * consequent_support;
            let conviction = if confidence >= 1.0 {
                f64::INFINITY
            } else {
                (1.0 - consequent_support) / (1.0 - confidence)
            };

            rules.push(Rule {
                antecedent: itemsets.catalog().sorted_names(&antecedent),
                consequent: itemsets.catalog().sorted_names(&consequent),
                support_count: itemset.support_count(),
                support,
                confidence,
                lift,
                antecedent_support,
                consequent_support,
                leverage,
                conviction,
            });
        }
    }

    rules.sort_by(rank_rules);
    debug!(candidates, kept = rules.len(), "evaluated rule candidates");
    info!(rules = rules.len(), min_confidence, "rule derivation complete");
    Ok(rules)
}

/// Mask selecting all `size` items, or `None` past the 63 items a `u64`
/// enumeration can split
fn split_mask(size: usize) -> Option<u64> {
    if size >= u64::BITS as usize {
        return None;
    }
    Some((1u64 << size) - 1)
}

/// Split sorted `items` by bit mask into (selected, rest), both still sorted
fn split(items: &[ItemId], mask: u64) -> (Vec<ItemId>, Vec<ItemId>) {
    let mut selected = Vec::new();
    let mut rest = Vec::new();
    for (bit, &item) in items.iter().enumerate() {
        if mask & (1 << bit) != 0 {
            selected.push(item);
        } else {
            rest.push(item);
        }
    }
    (selected, rest)
}

fn lookup(itemsets: &FrequentItemsets, items: &[ItemId]) -> Result<u64, MiningError> {
    itemsets
        .support_count_of(items)
        .ok_or_else(|| MiningError::MissingSubset(itemsets.catalog().sorted_names(items)))
}

fn rank_rules(a: &Rule, b: &Rule) -> Ordering {
    b.support_count
        .cmp(&a.support_count)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| b.lift.total_cmp(&a.lift))
        .then_with(|| a.antecedent.cmp(&b.antecedent))
        .then_with(|| a.consequent.cmp(&b.consequent))
}
