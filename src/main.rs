//! RuleForge: association rule mining CLI
//!
//! Loads order records, mines frequent itemsets, derives rules and prints or
//! exports them.

use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ruleforge::cli::OutputFormat;
use ruleforge::{derive_with, load_transactions, mine_with, report, Args, NeverCancel};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.engine_config()?;
    let start_time = Instant::now();

    // Step 1: Load and pivot order records
    let db = load_transactions(&args.input, &config.column_mapping())?;
    println!(
        "✓ Data loaded: {} transactions, {} distinct items",
        db.len(),
        db.catalog().len()
    );

    // Step 2: Mine frequent itemsets
    let mining_options = config.mining_options();
    let itemsets = mine_with(&db, &mining_options, &NeverCancel)?;
    println!(
        "✓ Frequent itemsets: {} (min support {:.2}%)",
        itemsets.len(),
        mining_options.min_support * 100.0
    );

    // Step 3: Derive association rules
    let rule_options = config.rule_options();
    let rules = derive_with(&itemsets, &rule_options)?;
    if rules.is_empty() {
        println!(
            "\nNo rules reach {:.2}% confidence; try lowering the thresholds.",
            rule_options.min_confidence * 100.0
        );
        return Ok(());
    }

    println!("\n=== Association Rules ===");
    report::print_rules_table(&rules);

    // Step 4: Export
    if let Some(output) = &args.output {
        let file = File::create(output).with_context(|| format!("Failed to create {}", output))?;
        let writer = BufWriter::new(file);
        match args.format {
            OutputFormat::Csv => report::write_rules_csv(&rules, writer)?,
            OutputFormat::Json => report::write_rules_json(&rules, writer)?,
        }
        println!("\nRules saved to: {}", output);
    }

    tracing::info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "pipeline complete");
    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the --verbose default
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
