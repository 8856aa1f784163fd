//! Rendering derived rules as text, tables, CSV and JSON

use std::io::Write;

use polars::prelude::*;

use crate::rules::Rule;

/// Natural-language form of a rule
pub fn rule_sentence(rule: &Rule) -> String {
    format!(
        "If {} is ordered, {} tends to be ordered too",
        rule.antecedent.join(", "),
        rule.consequent.join(", ")
    )
}

/// Tabular view of `rules`, one row per rule
pub fn rules_frame(rules: &[Rule]) -> crate::Result<DataFrame> {
    let sentences: Vec<String> = rules.iter().map(rule_sentence).collect();
    let antecedents: Vec<String> = rules.iter().map(|r| r.antecedent.join(", ")).collect();
    let consequents: Vec<String> = rules.iter().map(|r| r.consequent.join(", ")).collect();
    let supports: Vec<f64> = rules.iter().map(|r| r.support).collect();
    let confidences: Vec<f64> = rules.iter().map(|r| r.confidence).collect();
    let lifts: Vec<f64> = rules.iter().map(|r| r.lift).collect();

    let df = DataFrame::new(vec![
        Series::new("rule", sentences),
        Series::new("antecedents", antecedents),
        Series::new("consequents", consequents),
        Series::new("support", supports),
        Series::new("confidence", confidences),
        Series::new("lift", lifts),
    ])?;
    Ok(df)
}

/// Write `rules` as CSV with a header row
pub fn write_rules_csv<W: Write>(rules: &[Rule], writer: W) -> crate::Result<()> {
    let mut df = rules_frame(rules)?;
    CsvWriter::new(writer).include_header(true).finish(&mut df)?;
    Ok(())
}

/// Write `rules` as a pretty-printed JSON array
pub fn write_rules_json<W: Write>(rules: &[Rule], writer: W) -> crate::Result<()> {
    serde_json::to_writer_pretty(writer, rules)?;
    Ok(())
}

/// Print rules to stdout with four-decimal metrics
pub fn print_rules_table(rules: &[Rule]) {
    println!("{:<4} {:<60} {:>8} {:>10} {:>8}", "#", "Rule", "Support", "Confidence", "Lift");
    for (i, rule) in rules.iter().enumerate() {
        println!(
            "{:<4} {:<60} {:>8.4} {:>10.4} {:>8.4}",
            i + 1,
            rule_sentence(rule),
            rule.support,
            rule.confidence,
            rule.lift
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule() -> Rule {
        Rule {
            antecedent: vec!["Es Teh".to_string(), "Nasi Goreng".to_string()],
            consequent: vec!["Kerupuk".to_string()],
            support_count: 2,
            support: 0.5,
            confidence: 0.8,
            lift: 1.6,
            antecedent_support: 0.625,
            consequent_support: 0.5,
            leverage: 0.1875,
            conviction: 2.5,
        }
    }

    #[test]
    fn test_rule_sentence() {
        assert_eq!(
            rule_sentence(&sample_rule()),
            "If Es Teh, Nasi Goreng is ordered, Kerupuk tends to be ordered too"
        );
    }

    #[test]
    fn test_rules_frame() {
        let df = rules_frame(&[sample_rule(), sample_rule()]).unwrap();
        assert_eq!(df.shape(), (2, 6));

        let empty = rules_frame(&[]).unwrap();
        assert_eq!(empty.height(), 0);
    }

    #[test]
    fn test_write_rules_csv() {
        let mut buffer = Vec::new();
        write_rules_csv(&[sample_rule()], &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("rule,antecedents,consequents,support,confidence,lift")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"If Es Teh, Nasi Goreng is ordered"));
        assert!(row.contains("\"Es Teh, Nasi Goreng\",Kerupuk,"));
    }

    #[test]
    fn test_write_rules_json() {
        let mut buffer = Vec::new();
        write_rules_json(&[sample_rule()], &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value[0]["consequent"][0], "Kerupuk");
        assert_eq!(value[0]["support_count"], 2);
    }
}
