//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the scoring code stays clean and testable
//! - output changes are localized

use crate::domain::{Recommendation, RegionAggregate, RiskSummary, ScoredBorrower};
use crate::io::ingest::RowError;

/// Headline numbers plus ingest stats.
pub fn format_summary(summary: &RiskSummary, rows_read: usize, row_errors: &[RowError]) -> String {
    let mut out = String::new();
    out.push_str("=== crisk - Credit Risk Overview ===\n");
    out.push_str(&format!(
        "Rows: read={rows_read} used={} skipped={}\n",
        summary.total_borrowers,
        row_errors.len()
    ));
    out.push_str(&format!("Total Borrowers: {}\n", summary.total_borrowers));
    out.push_str(&format!("High Risk Borrowers: {}\n", summary.high_risk_borrowers));
    out.push_str(&format!(
        "Average Risk Score: {}\n",
        summary
            .avg_risk_score
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "Levels: Low={} Medium={} High={} Unclassified={}\n",
        summary.levels.low, summary.levels.medium, summary.levels.high, summary.levels.unclassified
    ));
    out
}

/// List skipped rows, at most `max` of them.
pub fn format_row_errors(row_errors: &[RowError], max: usize) -> String {
    let mut out = String::new();
    if row_errors.is_empty() {
        return out;
    }
    out.push_str("Skipped rows:\n");
    for err in row_errors.iter().take(max) {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    if row_errors.len() > max {
        out.push_str(&format!("  ... and {} more\n", row_errors.len() - max));
    }
    out
}

/// Borrower table: index, inputs and derived fields.
pub fn format_borrower_table(rows: &[&ScoredBorrower], with_region: bool) -> String {
    let mut out = String::new();
    let region_head = if with_region { format!(" {:<12}", "region") } else { String::new() };
    out.push_str(
        format!(
            "{:>5} {:>5} {:>12} {:>12} {:>10} {:>7} {:<8}{region_head}",
            "index", "age", "income", "loan_amount", "ratio", "score", "level"
        )
        .trim_end(),
    );
    out.push('\n');

    let region_rule = if with_region { format!(" {:-<12}", "") } else { String::new() };
    out.push_str(&format!(
        "{:-<5} {:-<5} {:-<12} {:-<12} {:-<10} {:-<7} {:-<8}{region_rule}\n",
        "", "", "", "", "", "", ""
    ));

    for r in rows {
        let region = if with_region {
            format!(" {:<12}", truncate(r.record.region.as_deref().unwrap_or(""), 12))
        } else {
            String::new()
        };
        out.push_str(
            format!(
                "{:>5} {:>5} {:>12.2} {:>12.2} {:>10.4} {:>7.3} {:<8}{region}",
                r.index,
                r.record.age,
                r.record.income,
                r.record.loan_amount,
                r.income_to_loan_ratio,
                r.risk_score,
                r.risk_level.map(|l| l.label()).unwrap_or("-"),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if rows.is_empty() {
        out.push_str("(no borrowers)\n");
    }
    out
}

pub fn format_region_table(regions: &[RegionAggregate]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:>15} {:>14} {:>13}\n",
        "region", "total_borrowers", "avg_risk_score", "high_risk_pct"
    ));
    out.push_str(&format!("{:-<16} {:-<15} {:-<14} {:-<13}\n", "", "", "", ""));
    for g in regions {
        out.push_str(&format!(
            "{:<16} {:>15} {:>14.3} {:>12.1}%\n",
            truncate(&g.region, 16),
            g.total_borrowers,
            g.avg_risk_score,
            g.high_risk_pct * 100.0
        ));
    }
    out
}

pub fn format_recommendation(row: &ScoredBorrower, rec: Recommendation) -> String {
    let level = row.risk_level.map(|l| l.label()).unwrap_or("Unclassified");
    format!("Borrower #{} is {level} risk. Recommended action: {rec}.", row.index)
}

pub const REGION_UNAVAILABLE: &str =
    "Region column not found in uploaded data. Add a 'region' column to enable regional analysis.";

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
