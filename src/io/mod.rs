//! Input/output helpers.
//!
//! - borrower CSV ingest + row validation (`ingest`)
//! - report CSV export (`export`)
//! - JSON run summary read/write (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
