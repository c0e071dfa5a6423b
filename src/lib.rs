//! `credit-risk` library crate.
//!
//! The binary (`crisk`) is a thin wrapper around this library so that:
//!
//! - the scoring pipeline is testable without spawning processes
//! - the CLI and the terminal dashboard share one implementation

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod risk;
pub mod tui;
