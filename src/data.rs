//! Loading order records from CSV into a transaction database using Polars

use anyhow::Context;
use polars::prelude::*;
use rustc_hash::FxHashMap;

use crate::transactions::TransactionDatabase;

/// Names of the CSV columns the loader reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Rows sharing this key form one transaction
    pub transaction: String,
    /// Item name
    pub item: String,
    /// Ordered quantity; an item is present when its mean over the key's rows
    /// truncates to a positive whole number
    pub quantity: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            transaction: "date".to_string(),
            item: "menu__name".to_string(),
            quantity: "menu__quantity".to_string(),
        }
    }
}

/// Load order records and pivot them into one transaction per key
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `columns` - Which columns hold the transaction key, item and quantity
///
/// # Returns
/// * `TransactionDatabase` with one transaction per distinct key, in order of
///   first appearance. A key whose quantities are all zero yields an empty
///   transaction, which still counts toward support denominators.
pub fn load_transactions(file_path: &str, columns: &ColumnMapping) -> crate::Result<TransactionDatabase> {
    let df = LazyCsvReader::new(file_path)
        .with_has_header(true)
        .finish()
        .with_context(|| format!("Failed to open {}", file_path))?
        .select([
            col(columns.transaction.as_str()),
            col(columns.item.as_str()),
            col(columns.quantity.as_str()),
        ])
        // Incomplete rows are dropped before pivoting
        .drop_nulls(None)
        .collect()
        .with_context(|| format!("Failed to read order records from {}", file_path))?;

    if df.height() == 0 {
        anyhow::bail!("No complete order records found in {}", file_path);
    }

    let keys = df.column(columns.transaction.as_str())?.cast(&DataType::String)?;
    let items = df.column(columns.item.as_str())?.cast(&DataType::String)?;
    let quantities = df.column(columns.quantity.as_str())?.cast(&DataType::Float64)?;

    let transactions = group_by_key(
        keys.str()?
            .into_iter()
            .zip(items.str()?.into_iter())
            .zip(quantities.f64()?.into_iter())
            .map(|((key, item), quantity)| (key, item, quantity)),
    );

    tracing::debug!(
        rows = df.height(),
        transactions = transactions.len(),
        "loaded order records"
    );
    Ok(TransactionDatabase::from_transactions(transactions))
}

/// Group `(key, item, quantity)` rows into per-key item lists. Repeated rows
/// for one `(key, item)` pair are averaged and the mean truncated to a whole
/// quantity, so an item is present only when that truncated mean is above
/// zero. Rows with a missing cell are skipped.
fn group_by_key<'a, I>(rows: I) -> Vec<Vec<&'a str>>
where
    I: Iterator<Item = (Option<&'a str>, Option<&'a str>, Option<f64>)>,
{
    let mut slots: FxHashMap<&'a str, usize> = FxHashMap::default();
    // per key: item -> (quantity sum, row count), plus first-seen item order
    let mut cells: Vec<(Vec<&'a str>, FxHashMap<&'a str, (f64, u32)>)> = Vec::new();

    for row in rows {
        let (Some(key), Some(item), Some(quantity)) = row else {
            continue;
        };
        let slot = *slots.entry(key).or_insert_with(|| {
            cells.push((Vec::new(), FxHashMap::default()));
            cells.len() - 1
        });
        let (order, totals) = &mut cells[slot];
        let total = totals.entry(item).or_insert_with(|| {
            order.push(item);
            (0.0, 0)
        });
        total.0 += quantity;
        total.1 += 1;
    }

    cells
        .into_iter()
        .map(|(order, totals)| {
            order
                .into_iter()
                .filter(|item| {
                    let (sum, rows) = totals[item];
                    (sum / rows as f64).trunc() > 0.0
                })
                .collect()
        })
        .collect()
}
