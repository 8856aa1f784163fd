//! Command-line interface definitions and argument parsing

use clap::{Parser, ValueEnum};

use crate::config::EngineConfig;

/// Output format for the exported rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Association rule mining over order records
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "orders.csv")]
    pub input: String,

    /// Optional TOML config file; flags given here take precedence
    #[arg(short, long)]
    pub config: Option<String>,

    /// Minimum support as a percentage (0-100]
    #[arg(short, long)]
    pub support: Option<f64>,

    /// Minimum confidence as a percentage (0-100]
    #[arg(short = 'C', long)]
    pub confidence: Option<f64>,

    /// Largest number of items in a rule, both sides combined
    #[arg(long)]
    pub max_rule_size: Option<usize>,

    /// Write the rule table to this path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Format of the file written to --output
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Mine on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Settings given on the command line, with percentages converted to fractions
    pub fn overrides(&self) -> crate::Result<EngineConfig> {
        Ok(EngineConfig {
            min_support: self.support.map(|p| percent_to_fraction("support", p)).transpose()?,
            min_confidence: self
                .confidence
                .map(|p| percent_to_fraction("confidence", p))
                .transpose()?,
            max_rule_size: self.max_rule_size,
            parallel: self.sequential.then_some(false),
            ..EngineConfig::default()
        })
    }

    /// Command-line settings over the config file over built-in defaults
    pub fn engine_config(&self) -> crate::Result<EngineConfig> {
        let overrides = self.overrides()?;
        match &self.config {
            Some(path) => Ok(overrides.or(EngineConfig::from_toml_file(path)?)),
            None => Ok(overrides),
        }
    }
}

fn percent_to_fraction(name: &str, percent: f64) -> crate::Result<f64> {
    if !(percent > 0.0 && percent <= 100.0) {
        anyhow::bail!("{} must be a percentage in (0, 100], got {}", name, percent);
    }
    Ok(percent / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args() -> Args {
        Args {
            input: "orders.csv".to_string(),
            config: None,
            support: Some(5.0),
            confidence: Some(60.0),
            max_rule_size: None,
            output: None,
            format: OutputFormat::Csv,
            sequential: false,
            verbose: false,
        }
    }

    #[test]
    fn test_overrides() {
        let mut args = args();

        let config = args.overrides().unwrap();
        assert_eq!(config.min_support, Some(0.05));
        assert_eq!(config.min_confidence, Some(0.6));
        assert_eq!(config.parallel, None);

        args.sequential = true;
        assert_eq!(args.overrides().unwrap().parallel, Some(false));

        args.support = Some(150.0);
        assert!(args.overrides().is_err());

        args.support = Some(0.0);
        assert!(args.overrides().is_err());
    }

    #[test]
    fn test_engine_config_merges_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "min_support = 0.2").unwrap();
        writeln!(file, "max_rule_size = 3").unwrap();

        let mut args = args();
        args.support = None;
        args.config = Some(file.path().to_str().unwrap().to_string());

        let config = args.engine_config().unwrap();
        assert_eq!(config.effective_min_support(), 0.2);
        assert_eq!(config.effective_min_confidence(), 0.6);
        assert_eq!(config.effective_max_rule_size(), 3);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "ruleforge",
            "--input",
            "data.csv",
            "--support",
            "10",
            "-C",
            "70",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.input, "data.csv");
        assert_eq!(args.support, Some(10.0));
        assert_eq!(args.confidence, Some(70.0));
        assert_eq!(args.format, OutputFormat::Json);
    }
}
