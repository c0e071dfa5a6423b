//! Derived views over a scored dataset.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{
    HistogramBin, LevelCounts, LevelFilter, Recommendation, RegionAggregate, RegionView,
    RiskLevel, RiskSummary, ScoreHistogram, ScoredBorrower, ScoredDataset,
};
use crate::error::PipelineError;

/// Rows matching the level selector, in input order.
///
/// `All` returns every row; an unmatched label returns nothing.
pub fn filter_by_level<'a>(dataset: &'a ScoredDataset, filter: &LevelFilter) -> Vec<&'a ScoredBorrower> {
    match filter {
        LevelFilter::All => dataset.rows.iter().collect(),
        LevelFilter::Only(level) => dataset
            .rows
            .iter()
            .filter(|r| r.risk_level == Some(*level))
            .collect(),
        LevelFilter::Unmatched(_) => Vec::new(),
    }
}

/// The `n` highest scores, descending.
///
/// The sort is stable, so equal scores keep their input order. NaN scores sort last.
pub fn select_top_risk<'a, I>(rows: I, n: usize) -> Vec<&'a ScoredBorrower>
where
    I: IntoIterator<Item = &'a ScoredBorrower>,
{
    let mut sorted: Vec<&ScoredBorrower> = rows.into_iter().collect();
    sorted.sort_by(|a, b| cmp_score_desc(a.risk_score, b.risk_score));
    sorted.truncate(n);
    sorted
}

fn cmp_score_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Group by exact region value, sorted by region.
///
/// Rows without a region value are left out of every group.
pub fn aggregate_by_region(dataset: &ScoredDataset) -> RegionView {
    if !dataset.has_region() {
        return RegionView::Unavailable;
    }

    #[derive(Default)]
    struct Acc {
        /// Every row in the group, scored or not.
        total: usize,
        score_sum: f64,
        scored: usize,
        high: usize,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for row in &dataset.rows {
        let Some(region) = row.record.region.as_deref() else {
            continue;
        };
        let acc = groups.entry(region).or_default();
        acc.total += 1;
        if !row.risk_score.is_nan() {
            acc.score_sum += row.risk_score;
            acc.scored += 1;
        }
        if row.risk_level == Some(RiskLevel::High) {
            acc.high += 1;
        }
    }

    let aggregates = groups
        .into_iter()
        .map(|(region, acc)| RegionAggregate {
            region: region.to_string(),
            total_borrowers: acc.scored,
            avg_risk_score: if acc.scored == 0 {
                f64::NAN
            } else {
                acc.score_sum / acc.scored as f64
            },
            high_risk_pct: acc.high as f64 / acc.total as f64,
        })
        .collect();

    RegionView::Available(aggregates)
}

/// `Review manually` for High-tier borrowers, `Likely Approve` otherwise.
pub fn recommend(row: &ScoredBorrower) -> Recommendation {
    if row.risk_level == Some(RiskLevel::High) {
        Recommendation::ReviewManually
    } else {
        Recommendation::LikelyApprove
    }
}

/// Look up a borrower by row index and attach the recommendation.
pub fn select_borrower(
    dataset: &ScoredDataset,
    index: usize,
) -> Result<(&ScoredBorrower, Recommendation), PipelineError> {
    let row = dataset
        .rows
        .get(index)
        .ok_or(PipelineError::BorrowerIndexOutOfRange {
            index,
            len: dataset.len(),
        })?;
    Ok((row, recommend(row)))
}

pub fn summarize(dataset: &ScoredDataset) -> RiskSummary {
    let mut levels = LevelCounts::default();
    let mut sum = 0.0;
    let mut n = 0usize;
    for row in &dataset.rows {
        levels.add(row.risk_level);
        if !row.risk_score.is_nan() {
            sum += row.risk_score;
            n += 1;
        }
    }

    RiskSummary {
        total_borrowers: dataset.len(),
        high_risk_borrowers: levels.high,
        avg_risk_score: (n > 0).then(|| sum / n as f64),
        levels,
    }
}

/// Equal-width bins over `[0, 1]`; the last bin includes `1.0`. NaN scores are skipped.
pub fn histogram(dataset: &ScoredDataset, bins: usize) -> ScoreHistogram {
    let bins = bins.max(1);
    let width = 1.0 / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: i as f64 * width,
            upper: if i + 1 == bins { 1.0 } else { (i + 1) as f64 * width },
            counts: LevelCounts::default(),
        })
        .collect();

    for row in &dataset.rows {
        let s = row.risk_score;
        if s.is_nan() {
            continue;
        }
        let idx = ((s / width).floor() as usize).min(bins - 1);
        out[idx].counts.add(row.risk_level);
    }

    ScoreHistogram { bins: out }
}
