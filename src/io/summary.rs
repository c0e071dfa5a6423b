//! Read/write the JSON run summary.
//!
//! The summary is the "portable" digest of a run:
//! - headline numbers (totals, high-risk count, average score)
//! - regional aggregates (or `null` when the upload had no region column)
//! - the top-N riskiest borrowers

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::app::pipeline::DashboardView;
use crate::domain::{RegionAggregate, RiskLevel, RiskSummary};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryFile {
    pub tool: String,
    pub version: String,
    pub generated_at: DateTime<Local>,
    pub source: String,
    pub rows_skipped: usize,
    pub summary: RiskSummary,
    pub regions: Option<Vec<RegionAggregate>>,
    pub top_risk: Vec<TopRiskEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopRiskEntry {
    pub index: usize,
    pub age: f64,
    pub income: f64,
    pub loan_amount: f64,
    pub region: Option<String>,
    #[serde(with = "crate::domain::float_serde")]
    pub income_to_loan_ratio: f64,
    #[serde(with = "crate::domain::float_serde")]
    pub risk_score: f64,
    pub risk_level: Option<RiskLevel>,
}

impl SummaryFile {
    pub fn from_view(view: &DashboardView, source: &Path, rows_skipped: usize) -> Self {
        let top_risk = view
            .top_risk
            .iter()
            .map(|r| TopRiskEntry {
                index: r.index,
                age: r.record.age,
                income: r.record.income,
                loan_amount: r.record.loan_amount,
                region: r.record.region.clone(),
                income_to_loan_ratio: r.income_to_loan_ratio,
                risk_score: r.risk_score,
                risk_level: r.risk_level,
            })
            .collect();

        Self {
            tool: "crisk".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Local::now(),
            source: source.display().to_string(),
            rows_skipped,
            summary: view.summary.clone(),
            regions: view.regions.aggregates().map(<[RegionAggregate]>::to_vec),
            top_risk,
        }
    }
}

/// Write a summary JSON file.
pub fn write_summary_json(path: &Path, summary: &SummaryFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(4, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

/// Read a summary JSON file.
pub fn read_summary_json(path: &Path) -> Result<SummaryFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid summary JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{ViewSelection, build_view};
    use crate::io::ingest::{IngestOptions, parse_dataset};
    use crate::risk::score;

    #[test]
    fn summary_serializes_views() {
        let ingest = parse_dataset(
            "age,income,loan_amount,region\n30,1000,2000,Accra\n60,9000,1000,Kumasi\n".as_bytes(),
            IngestOptions::default(),
        )
        .unwrap();
        let scored = score(&ingest.dataset);
        let view = build_view(&scored, &ViewSelection::default()).unwrap();
        let file = SummaryFile::from_view(&view, Path::new("borrowers.csv"), 0);

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["summary"]["total_borrowers"], 2);
        assert_eq!(json["summary"]["high_risk_borrowers"], 1);
        assert_eq!(json["regions"][0]["region"], "Accra");
        assert_eq!(json["top_risk"][0]["index"], 1);
        assert_eq!(json["top_risk"][0]["risk_level"], "High");

        let back: SummaryFile = serde_json::from_value(json).unwrap();
        assert_eq!(back.top_risk.len(), 2);
        assert_eq!(back.summary.levels, file.summary.levels);
    }

    #[test]
    fn zero_loan_rows_read_back() {
        let ingest = parse_dataset(
            "age,income,loan_amount,region\n30,500,0,Accra\n0,0,0,Kumasi\n".as_bytes(),
            IngestOptions { allow_zero_loan: true },
        )
        .unwrap();
        let scored = score(&ingest.dataset);
        let view = build_view(&scored, &ViewSelection::default()).unwrap();
        let file = SummaryFile::from_view(&view, Path::new("borrowers.csv"), 0);

        let path = std::env::temp_dir().join(format!("crisk-summary-{}.json", std::process::id()));
        write_summary_json(&path, &file).unwrap();
        let back = read_summary_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.top_risk.len(), 2);
        let accra = &back.top_risk[0];
        assert_eq!(accra.region.as_deref(), Some("Accra"));
        assert_eq!(accra.income_to_loan_ratio, f64::INFINITY);
        assert_eq!(accra.risk_score, 1.0);
        let kumasi = &back.top_risk[1];
        assert!(kumasi.income_to_loan_ratio.is_nan());
        assert!(kumasi.risk_score.is_nan());
        assert_eq!(kumasi.risk_level, None);

        let regions = back.regions.unwrap();
        assert_eq!(regions[1].region, "Kumasi");
        assert!(regions[1].avg_risk_score.is_nan());
    }

    #[test]
    fn regions_are_null_without_region_column() {
        let ingest =
            parse_dataset("age,income,loan_amount\n30,1000,2000\n".as_bytes(), IngestOptions::default()).unwrap();
        let scored = score(&ingest.dataset);
        let view = build_view(&scored, &ViewSelection::default()).unwrap();
        let json = serde_json::to_value(SummaryFile::from_view(&view, Path::new("x.csv"), 0)).unwrap();
        assert!(json["regions"].is_null());
    }
}
