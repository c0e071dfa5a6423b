//! The risk pipeline.
//!
//! Responsibilities:
//!
//! - check the column set of an upload (`validate`)
//! - derive ratio, score and tier per borrower (`score`)
//! - build the views shown to the user: level filter, top-N, regional
//!   aggregates, summary numbers, score histogram, recommendation (`views`)
//!
//! Every function here is pure: same inputs, same outputs, no I/O.

pub mod score;
pub mod validate;
pub mod views;

pub use score::*;
pub use validate::*;
pub use views::*;
