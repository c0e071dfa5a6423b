//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - borrower rows and datasets (`BorrowerRecord`, `Dataset`)
//! - derived outputs (`ScoredBorrower`, `RiskLevel`, `RegionAggregate`, etc.)
//! - the run configuration (`RunConfig`)

pub mod float_serde;
pub mod types;

pub use types::*;
