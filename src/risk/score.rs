//! Placeholder risk scoring.
//!
//! `score = clamp(income / loan_amount * 0.3 + age * 0.01, 0, 1)`, then bucketed
//! through `RISK_TIERS`. This is a fixed linear formula, not a fitted model.

use crate::domain::{
    AGE_WEIGHT, BorrowerRecord, Dataset, RATIO_WEIGHT, RiskLevel, ScoredBorrower, ScoredDataset,
};

/// Derived fields for one borrower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskFields {
    pub income_to_loan_ratio: f64,
    pub risk_score: f64,
    pub risk_level: Option<RiskLevel>,
}

/// Compute ratio, score and tier for a single record.
///
/// No guard on `loan_amount == 0`: IEEE division applies (`x/0 = ±inf`,
/// `0/0 = NaN`). `+inf` clamps to `1.0`, `-inf` to `0.0`, NaN stays NaN and has
/// no tier.
pub fn score_record(record: &BorrowerRecord) -> RiskFields {
    let income_to_loan_ratio = record.income / record.loan_amount;
    let risk_score = clamp_unit(income_to_loan_ratio * RATIO_WEIGHT + record.age * AGE_WEIGHT);
    RiskFields {
        income_to_loan_ratio,
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
    }
}

/// Score every record. Row count and order are preserved.
pub fn score(dataset: &Dataset) -> ScoredDataset {
    let rows = dataset
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let fields = score_record(record);
            ScoredBorrower {
                index,
                record: record.clone(),
                income_to_loan_ratio: fields.income_to_loan_ratio,
                risk_score: fields.risk_score,
                risk_level: fields.risk_level,
            }
        })
        .collect();

    ScoredDataset {
        columns: dataset.columns.clone(),
        rows,
    }
}

/// Min/max clamp into `[0, 1]`. NaN passes through.
fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        return v;
    }
    v.max(0.0).min(1.0)
}
