//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while scoring and building views
//! - exported to CSV/JSON
//! - rendered by both the CLI and the dashboard

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Columns every borrower CSV must carry, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 3] = ["age", "income", "loan_amount"];

/// Optional categorical column that enables the regional view.
pub const REGION_COLUMN: &str = "region";

/// Columns appended to the report, in order.
pub const DERIVED_COLUMNS: [&str; 3] = ["income_to_loan_ratio", "risk_score", "risk_level"];

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_REPORT_FILE: &str = "credit_risk_report.csv";
pub const HISTOGRAM_BINS: usize = 30;

/// Weight applied to `income / loan_amount` in the placeholder score.
pub const RATIO_WEIGHT: f64 = 0.3;
/// Weight applied to `age` (years) in the placeholder score.
pub const AGE_WEIGHT: f64 = 0.01;

/// Risk tier derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One row of the tier boundary table: scores in `(lower, upper]` map to `level`.
#[derive(Debug, Clone, Copy)]
pub struct RiskTier {
    pub level: RiskLevel,
    pub lower: f64,
    pub upper: f64,
}

/// Bin edges `[0, 0.3, 0.7, 1]`, left-open and right-closed.
///
/// A score of exactly `0.0` falls below the first bin and has no tier.
pub const RISK_TIERS: [RiskTier; 3] = [
    RiskTier { level: RiskLevel::Low, lower: 0.0, upper: 0.3 },
    RiskTier { level: RiskLevel::Medium, lower: 0.3, upper: 0.7 },
    RiskTier { level: RiskLevel::High, lower: 0.7, upper: 1.0 },
];

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Exact, case-sensitive label match.
    pub fn from_label(label: &str) -> Option<Self> {
        RiskLevel::ALL.into_iter().find(|level| level.label() == label)
    }

    /// Look up the tier for a score. `None` for `0.0`, NaN, or anything outside `(0, 1]`.
    pub fn from_score(score: f64) -> Option<Self> {
        RISK_TIERS
            .iter()
            .find(|tier| score > tier.lower && score <= tier.upper)
            .map(|tier| tier.level)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The level selector offered by the dashboard (`All`, `Low`, `Medium`, `High`).
///
/// Labels that match nothing are kept as `Unmatched` so that filtering yields an
/// empty view instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Only(RiskLevel),
    Unmatched(String),
}

impl LevelFilter {
    pub fn from_label(label: &str) -> Self {
        if label == "All" {
            return LevelFilter::All;
        }
        match RiskLevel::from_label(label) {
            Some(level) => LevelFilter::Only(level),
            None => LevelFilter::Unmatched(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            LevelFilter::All => "All",
            LevelFilter::Only(level) => level.label(),
            LevelFilter::Unmatched(label) => label,
        }
    }

    /// Cycle All → Low → Medium → High → All.
    pub fn next(&self) -> Self {
        match self {
            LevelFilter::All => LevelFilter::Only(RiskLevel::Low),
            LevelFilter::Only(RiskLevel::Low) => LevelFilter::Only(RiskLevel::Medium),
            LevelFilter::Only(RiskLevel::Medium) => LevelFilter::Only(RiskLevel::High),
            LevelFilter::Only(RiskLevel::High) | LevelFilter::Unmatched(_) => LevelFilter::All,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LevelFilter::All | LevelFilter::Unmatched(_) => LevelFilter::Only(RiskLevel::High),
            LevelFilter::Only(RiskLevel::High) => LevelFilter::Only(RiskLevel::Medium),
            LevelFilter::Only(RiskLevel::Medium) => LevelFilter::Only(RiskLevel::Low),
            LevelFilter::Only(RiskLevel::Low) => LevelFilter::All,
        }
    }
}

/// Loan decision hint for a single borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Review manually")]
    ReviewManually,
    #[serde(rename = "Likely Approve")]
    LikelyApprove,
}

impl Recommendation {
    pub fn label(self) -> &'static str {
        match self {
            Recommendation::ReviewManually => "Review manually",
            Recommendation::LikelyApprove => "Likely Approve",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A CSV header cell: the spelling found in the file plus the normalized lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub key: String,
}

/// One input row.
///
/// Required fields are typed; every other column is kept verbatim in `extras`
/// (keyed by the original header spelling) so the report can reproduce the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorrowerRecord {
    pub age: f64,
    pub income: f64,
    pub loan_amount: f64,
    pub region: Option<String>,
    #[serde(skip)]
    pub extras: BTreeMap<String, String>,
}

impl BorrowerRecord {
    pub fn new(age: f64, income: f64, loan_amount: f64) -> Self {
        Self {
            age,
            income,
            loan_amount,
            region: None,
            extras: BTreeMap::new(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// Parsed borrower rows plus the header they came from.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub records: Vec<BorrowerRecord>,
}

impl Dataset {
    pub fn has_column(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.key == key)
    }

    pub fn has_region(&self) -> bool {
        self.has_column(REGION_COLUMN)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A borrower with its derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredBorrower {
    /// Position of the row in the uploaded dataset (0-based).
    pub index: usize,
    #[serde(flatten)]
    pub record: BorrowerRecord,
    pub income_to_loan_ratio: f64,
    pub risk_score: f64,
    /// `None` when the score falls outside every tier (exactly `0.0`, or NaN).
    pub risk_level: Option<RiskLevel>,
}

/// The scored copy of a dataset. Row order matches the input.
#[derive(Debug, Clone, Default)]
pub struct ScoredDataset {
    pub columns: Vec<Column>,
    pub rows: Vec<ScoredBorrower>,
}

impl ScoredDataset {
    pub fn has_region(&self) -> bool {
        self.columns.iter().any(|c| c.key == REGION_COLUMN)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Per-region statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    pub region: String,
    pub total_borrowers: usize,
    /// NaN when no borrower in the group has a finite score.
    #[serde(with = "crate::domain::float_serde")]
    pub avg_risk_score: f64,
    /// Fraction (0..=1) of the group whose level is `High`.
    pub high_risk_pct: f64,
}

/// Regional view: unavailable when the upload has no `region` column.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionView {
    Unavailable,
    Available(Vec<RegionAggregate>),
}

impl RegionView {
    pub fn aggregates(&self) -> Option<&[RegionAggregate]> {
        match self {
            RegionView::Unavailable => None,
            RegionView::Available(rows) => Some(rows),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub unclassified: usize,
}

impl LevelCounts {
    pub fn add(&mut self, level: Option<RiskLevel>) {
        match level {
            Some(RiskLevel::Low) => self.low += 1,
            Some(RiskLevel::Medium) => self.medium += 1,
            Some(RiskLevel::High) => self.high += 1,
            None => self.unclassified += 1,
        }
    }

    pub fn get(&self, level: Option<RiskLevel>) -> usize {
        match level {
            Some(RiskLevel::Low) => self.low,
            Some(RiskLevel::Medium) => self.medium,
            Some(RiskLevel::High) => self.high,
            None => self.unclassified,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.unclassified
    }
}

/// Headline numbers shown above the tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub total_borrowers: usize,
    pub high_risk_borrowers: usize,
    /// Mean of the non-NaN scores; `None` for an empty dataset.
    pub avg_risk_score: Option<f64>,
    pub levels: LevelCounts,
}

/// One equal-width histogram bin over the score range, split by level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub counts: LevelCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreHistogram {
    pub bins: Vec<HistogramBin>,
}

impl ScoreHistogram {
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.counts.total()).max().unwrap_or(0)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: PathBuf,
    pub top_n: usize,
    pub level: LevelFilter,
    pub borrower_index: usize,
    /// Keep rows with `loan_amount == 0` (their ratio is then ±inf or NaN).
    pub allow_zero_loan: bool,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_report: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(RiskLevel::from_score(0.0), None);
        assert_eq!(RiskLevel::from_score(1e-9), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_score(0.3), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_score(0.3 + 1e-9), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_score(0.7), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_score(0.7 + 1e-9), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_score(1.0), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_score(1.0 + 1e-9), None);
        assert_eq!(RiskLevel::from_score(-0.1), None);
        assert_eq!(RiskLevel::from_score(f64::NAN), None);
    }

    #[test]
    fn level_filter_labels() {
        assert_eq!(LevelFilter::from_label("All"), LevelFilter::All);
        assert_eq!(LevelFilter::from_label("High"), LevelFilter::Only(RiskLevel::High));
        assert_eq!(
            LevelFilter::from_label("high"),
            LevelFilter::Unmatched("high".to_string())
        );
    }

    #[test]
    fn level_filter_cycles_back_to_all() {
        let mut f = LevelFilter::All;
        for _ in 0..4 {
            f = f.next();
        }
        assert_eq!(f, LevelFilter::All);
        assert_eq!(LevelFilter::All.prev(), LevelFilter::Only(RiskLevel::High));
    }
}
