//! Command-line parsing for the credit risk tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the scoring code.
//!
//! Defaults can also come from the environment (or a `.env` file), e.g.
//! `CRISK_TOP_N=10` or `CRISK_EXPORT=out/report.csv`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_REPORT_FILE, DEFAULT_TOP_N};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "crisk", version, about = "Borrower credit risk scoring and dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a borrower CSV, print summary/tables/charts, and write the report.
    Score(ScoreArgs),
    /// Launch the interactive terminal dashboard.
    ///
    /// This uses the same underlying pipeline as `crisk score`, but renders
    /// results in a terminal UI using Ratatui.
    Dashboard(DashboardArgs),
    /// Write a synthetic borrower CSV (useful for demos).
    Sample(SampleArgs),
    /// Print a previously written summary JSON.
    Show(ShowArgs),
}

/// Options shared by `score` and `dashboard`.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Borrower CSV (columns: age, income, loan_amount, optional region).
    ///
    /// When omitted, you are prompted to pick a CSV under the current directory.
    #[arg(short = 'f', long, value_name = "CSV", env = "CRISK_FILE")]
    pub file: Option<PathBuf>,

    /// Keep rows with `loan_amount == 0` (ratio becomes inf/NaN) instead of skipping them.
    #[arg(long)]
    pub allow_zero_loan: bool,

    /// Number of rows in the top-risk view.
    #[arg(long, default_value_t = DEFAULT_TOP_N, env = "CRISK_TOP_N")]
    pub top: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only list borrowers with this risk level (All, Low, Medium, High).
    #[arg(short = 'l', long, default_value = "All")]
    pub level: String,

    /// Row index of the borrower to show a recommendation for.
    #[arg(short = 'b', long, default_value_t = 0)]
    pub borrower: usize,

    /// Report CSV path.
    #[arg(long, default_value = DEFAULT_REPORT_FILE, env = "CRISK_EXPORT")]
    pub export: PathBuf,

    /// Do not write the report CSV.
    #[arg(long)]
    pub no_export: bool,

    /// Also write a JSON summary (totals, regions, top-N).
    #[arg(long = "summary-json", value_name = "JSON")]
    pub summary_json: Option<PathBuf>,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Histogram height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Where `e` writes the report CSV.
    #[arg(long, default_value = DEFAULT_REPORT_FILE, env = "CRISK_EXPORT")]
    pub export: PathBuf,

    /// Write logs to this file (the terminal is busy drawing the dashboard).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,

    /// Number of borrowers to generate.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Random seed (same seed, same file).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Omit the `region` column.
    #[arg(long)]
    pub no_region: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Summary JSON produced by `crisk score --summary-json`.
    #[arg(value_name = "JSON")]
    pub summary: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn score_defaults() {
        let cli = Cli::parse_from(["crisk", "score", "-f", "b.csv"]);
        let Command::Score(args) = cli.command else {
            panic!("expected score");
        };
        assert_eq!(args.level, "All");
        assert_eq!(args.borrower, 0);
        assert_eq!(args.export, PathBuf::from(DEFAULT_REPORT_FILE));
        assert_eq!(args.input.file, Some(PathBuf::from("b.csv")));
    }
}
