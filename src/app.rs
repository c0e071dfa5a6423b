//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - runs the risk pipeline
//! - prints reports/plots
//! - writes exports

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use crate::cli::{Command, InputArgs, ScoreArgs, SampleArgs, ShowArgs};
use crate::domain::{LevelFilter, RegionView, RunConfig};
use crate::error::AppError;
use crate::io::ingest::IngestOptions;
use crate::logging::LogTarget;

pub mod pipeline;

/// Entry point for the `crisk` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Score(args) => {
            crate::logging::init(LogTarget::Stderr)?;
            handle_score(&args)
        }
        Command::Dashboard(args) => {
            let target = match &args.log_file {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Off,
            };
            crate::logging::init(target)?;
            let csv_path = resolve_csv_path(&args.input)?;
            crate::tui::run(crate::tui::DashboardOptions {
                csv_path,
                export_path: args.export.clone(),
                top_n: args.input.top,
                ingest: IngestOptions {
                    allow_zero_loan: args.input.allow_zero_loan,
                },
            })
        }
        Command::Sample(args) => {
            crate::logging::init(LogTarget::Stderr)?;
            handle_sample(&args)
        }
        Command::Show(args) => {
            crate::logging::init(LogTarget::Stderr)?;
            handle_show(&args)
        }
    }
}

fn handle_score(args: &ScoreArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args)?;
    let upload = pipeline::upload(
        &config.csv_path,
        IngestOptions {
            allow_zero_loan: config.allow_zero_loan,
        },
    )?;
    let scored = &upload.scored;

    let selection = pipeline::ViewSelection {
        level: config.level.clone(),
        top_n: config.top_n,
        borrower_index: (!scored.is_empty()).then_some(config.borrower_index),
    };
    let view = pipeline::build_view(scored, &selection)?;

    println!(
        "{}",
        crate::report::format_summary(&view.summary, upload.ingest.rows_read, &upload.ingest.row_errors)
    );
    let skipped = crate::report::format_row_errors(&upload.ingest.row_errors, 10);
    if !skipped.is_empty() {
        println!("{skipped}");
    }

    if config.plot {
        println!(
            "{}",
            crate::plot::render_histogram(&view.histogram, config.plot_width, config.plot_height)
        );
    }

    if view.level != LevelFilter::All {
        println!("Showing {} risk borrowers:", view.level.label());
        println!("{}", crate::report::format_borrower_table(&view.filtered, scored.has_region()));
    }

    println!("Top {} High-Risk Borrowers:", config.top_n);
    println!("{}", crate::report::format_borrower_table(&view.top_risk, scored.has_region()));

    if let Some((row, rec)) = view.selected {
        println!("{}\n", crate::report::format_recommendation(row, rec));
    }

    match &view.regions {
        RegionView::Available(regions) => {
            println!("Risk by Region:");
            println!("{}", crate::report::format_region_table(regions));
            if config.plot {
                println!("{}", crate::plot::render_region_bars(regions, config.plot_width));
            }
        }
        RegionView::Unavailable => println!("{}\n", crate::report::REGION_UNAVAILABLE),
    }

    if let Some(path) = &config.export_report {
        pipeline::download(scored, path)?;
        println!("Report written to {}", path.display());
    }
    if let Some(path) = &config.export_summary {
        let summary = crate::io::summary::SummaryFile::from_view(
            &view,
            &upload.source,
            upload.ingest.row_errors.len(),
        );
        crate::io::summary::write_summary_json(path, &summary)?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}

fn handle_sample(args: &SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        count: args.count,
        seed: args.seed,
        with_region: !args.no_region,
    };
    let n = crate::data::write_sample_csv(&args.output, &config)?;
    println!("Wrote {n} synthetic borrowers to {}", args.output.display());
    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<(), AppError> {
    let file = crate::io::summary::read_summary_json(&args.summary)?;
    info!(source = %file.source, generated_at = %file.generated_at, "loaded summary");

    println!("Source: {} (generated {})", file.source, file.generated_at.to_rfc3339());
    println!("{}", crate::report::format_summary(&file.summary, file.summary.total_borrowers + file.rows_skipped, &[]));

    println!("Top {} High-Risk Borrowers:", file.top_risk.len());
    for entry in &file.top_risk {
        println!(
            "  #{:<5} score={:.3} level={:<7} region={}",
            entry.index,
            entry.risk_score,
            entry.risk_level.map(|l| l.label()).unwrap_or("-"),
            entry.region.as_deref().unwrap_or("-"),
        );
    }
    println!();

    match &file.regions {
        Some(regions) => println!("{}", crate::report::format_region_table(regions)),
        None => println!("{}", crate::report::REGION_UNAVAILABLE),
    }
    Ok(())
}

pub fn run_config_from_args(args: &ScoreArgs) -> Result<RunConfig, AppError> {
    Ok(RunConfig {
        csv_path: resolve_csv_path(&args.input)?,
        top_n: args.input.top,
        level: LevelFilter::from_label(&args.level),
        borrower_index: args.borrower,
        allow_zero_loan: args.input.allow_zero_loan,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_report: (!args.no_export).then(|| args.export.clone()),
        export_summary: args.summary_json.clone(),
    })
}

/// `-f` when given, otherwise ask the user to pick a CSV.
fn resolve_csv_path(input: &InputArgs) -> Result<PathBuf, AppError> {
    match &input.file {
        Some(path) => crate::cli::picker::validate_csv_path(Path::new(path)),
        None => crate::cli::picker::prompt_for_csv_path(),
    }
}
