//! Terminal charts for the CLI.

pub mod ascii;

pub use ascii::*;
