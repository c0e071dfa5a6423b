//! Shared pipeline logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> validate -> score -> views (filter, top-N, regions, summary)
//!
//! Each user interaction maps onto one call here with explicit inputs; nothing
//! is cached between calls. The CLI and the TUI then focus on presentation.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{
    DEFAULT_TOP_N, HISTOGRAM_BINS, LevelFilter, Recommendation, RegionView, RiskSummary, ScoreHistogram,
    ScoredBorrower, ScoredDataset,
};
use crate::error::{AppError, PipelineError};
use crate::io::ingest::{IngestOptions, IngestedData, load_dataset};
use crate::risk;

/// An uploaded and scored dataset.
#[derive(Debug, Clone)]
pub struct Upload {
    pub source: PathBuf,
    pub ingest: IngestedData,
    pub scored: ScoredDataset,
}

/// What the user currently has selected.
#[derive(Debug, Clone)]
pub struct ViewSelection {
    pub level: LevelFilter,
    pub top_n: usize,
    /// Row index of the borrower to show a recommendation for.
    pub borrower_index: Option<usize>,
}

impl Default for ViewSelection {
    fn default() -> Self {
        Self {
            level: LevelFilter::All,
            top_n: DEFAULT_TOP_N,
            borrower_index: None,
        }
    }
}

/// Everything the presentation layer renders for one interaction.
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub summary: RiskSummary,
    pub histogram: ScoreHistogram,
    pub level: LevelFilter,
    pub filtered: Vec<&'a ScoredBorrower>,
    pub top_risk: Vec<&'a ScoredBorrower>,
    pub regions: RegionView,
    pub selected: Option<(&'a ScoredBorrower, Recommendation)>,
}

/// Ingest, validate and score a CSV file.
pub fn upload(path: &Path, options: IngestOptions) -> Result<Upload, PipelineError> {
    let ingest = load_dataset(path, options)?;
    let scored = risk::score(&ingest.dataset);
    Ok(Upload {
        source: path.to_path_buf(),
        ingest,
        scored,
    })
}

/// Recompute every view from the scored dataset.
pub fn build_view<'a>(
    scored: &'a ScoredDataset,
    selection: &ViewSelection,
) -> Result<DashboardView<'a>, PipelineError> {
    let selected = match selection.borrower_index {
        Some(index) => Some(risk::select_borrower(scored, index)?),
        None => None,
    };

    let view = DashboardView {
        summary: risk::summarize(scored),
        histogram: risk::histogram(scored, HISTOGRAM_BINS),
        level: selection.level.clone(),
        filtered: risk::filter_by_level(scored, &selection.level),
        top_risk: risk::select_top_risk(&scored.rows, selection.top_n),
        regions: risk::aggregate_by_region(scored),
        selected,
    };

    debug!(
        level = view.level.label(),
        filtered = view.filtered.len(),
        top_n = selection.top_n,
        "rebuilt dashboard view"
    );
    Ok(view)
}

/// Write the full scored dataset as the downloadable report.
pub fn download(scored: &ScoredDataset, path: &Path) -> Result<(), AppError> {
    crate::io::export::write_report_csv(path, scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLevel;
    use crate::io::ingest::parse_dataset;

    fn scored(csv: &str) -> ScoredDataset {
        let ingest = parse_dataset(csv.as_bytes(), IngestOptions::default()).unwrap();
        risk::score(&ingest.dataset)
    }

    const BORROWERS: &str = "age,income,loan_amount,region\n\
        30,1000,2000,Accra\n\
        60,9000,1000,Kumasi\n\
        22,100,5000,Accra\n\
        45,4000,2000,Tamale\n";

    #[test]
    fn view_combines_every_output() {
        let ds = scored(BORROWERS);
        let selection = ViewSelection {
            level: LevelFilter::Only(RiskLevel::High),
            top_n: 2,
            borrower_index: Some(1),
        };
        let view = build_view(&ds, &selection).unwrap();

        assert_eq!(view.summary.total_borrowers, 4);
        assert_eq!(view.filtered.len(), view.summary.high_risk_borrowers);
        assert!(view.filtered.iter().all(|r| r.risk_level == Some(RiskLevel::High)));
        assert_eq!(view.top_risk.len(), 2);
        assert_eq!(view.top_risk[0].index, 1);
        assert_eq!(view.regions.aggregates().map(<[_]>::len), Some(3));

        let (row, rec) = view.selected.unwrap();
        assert_eq!(row.index, 1);
        assert_eq!(rec, Recommendation::ReviewManually);
    }

    #[test]
    fn out_of_range_borrower_is_rejected() {
        let ds = scored(BORROWERS);
        let selection = ViewSelection {
            borrower_index: Some(10),
            ..ViewSelection::default()
        };
        assert!(matches!(
            build_view(&ds, &selection),
            Err(PipelineError::BorrowerIndexOutOfRange { index: 10, len: 4 })
        ));
    }

    #[test]
    fn views_are_recomputed_not_cached() {
        let ds = scored(BORROWERS);
        let all = build_view(&ds, &ViewSelection::default()).unwrap();
        let low = build_view(
            &ds,
            &ViewSelection {
                level: LevelFilter::Only(RiskLevel::Low),
                ..ViewSelection::default()
            },
        )
        .unwrap();
        assert_eq!(all.filtered.len(), 4);
        assert!(low.filtered.len() < all.filtered.len());
        assert_eq!(all.top_risk, low.top_risk);
    }
}
