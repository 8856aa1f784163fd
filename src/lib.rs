//! RuleForge: association rule mining over order records
//!
//! The engine turns a transaction database into frequent itemsets with
//! FP-growth, then derives association rules annotated with support,
//! confidence and lift. CSV loading, reporting and the CLI sit around it.

pub mod cancel;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
mod fptree;
pub mod itemsets;
pub mod miner;
pub mod report;
pub mod rules;
pub mod transactions;

// Re-export public items for easier access
pub use cancel::{Cancellable, CancellationToken, NeverCancel};
pub use cli::Args;
pub use config::EngineConfig;
pub use data::{load_transactions, ColumnMapping};
pub use error::MiningError;
pub use itemsets::{FrequentItemsets, Itemset};
pub use miner::{mine, mine_with, MiningOptions};
pub use rules::{derive, derive_with, Rule, RuleOptions};
pub use transactions::{ItemCatalog, ItemId, TransactionDatabase};

/// Common result type used by the loading, reporting and CLI layers
pub type Result<T> = anyhow::Result<T>;
