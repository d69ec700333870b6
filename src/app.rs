//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - runs the update pipeline against BEA/FRED
//! - merges, resamples and builds figure tables from the store
//! - prints reports/plots
//! - writes optional exports

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::update::{HttpFetcher, UpdateOptions};
use crate::catalog::Catalog;
use crate::cli::{CatalogArgs, Command, MergeArgs, OutputArgs, ResampleArgs, ShowArgs, UpdateArgs};
use crate::domain::{AppConfig, Table};
use crate::error::AppError;

pub mod figures;
pub mod pipeline;
pub mod update;

/// Entry point for the `macro` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing();
    let config = cli.config();

    match cli.command {
        Command::Update(args) => handle_update(&config, args),
        Command::Merge(args) => handle_merge(&config, args),
        Command::Resample(args) => handle_resample(&config, args),
        Command::Show(args) => handle_show(&config, args),
        Command::Catalog(args) => handle_catalog(&config, args),
    }
}

/// Log to stderr so tables on stdout stay clean. `RUST_LOG` overrides the
/// default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_update(config: &AppConfig, args: UpdateArgs) -> Result<(), AppError> {
    let catalog = Catalog::load(&config.config_dir)?;
    let store = pipeline::store(config);
    let options = UpdateOptions {
        all: args.all,
        new_only: args.new_only,
        only: args.only,
        replace: args.replace,
        pause: Duration::from_millis(args.pause_ms),
        today: chrono::Local::now().date_naive(),
    };

    let keys = update::plan(&catalog, &store, &options)?;
    info!(series = keys.len(), today = %options.today, "update planned");
    if keys.is_empty() {
        return Ok(());
    }

    let fetcher = HttpFetcher::for_keys(&keys)?;
    let summary = update::update_database(&fetcher, &catalog, &store, &keys, &options);
    if !summary.updated.is_empty() {
        println!("{}", summary.rows_report());
    }
    summary.check()
}

fn handle_merge(config: &AppConfig, args: MergeArgs) -> Result<(), AppError> {
    let (table, cadence) = pipeline::run_merge(config, &args.names, args.min_cadence, args.yoy)?;
    println!("Output cadence: {}", cadence.display_name());
    emit(&table, &args.output)
}

fn handle_resample(config: &AppConfig, args: ResampleArgs) -> Result<(), AppError> {
    let table = pipeline::run_resample(config, &args.name, args.to, args.agg)?;
    emit(&table, &args.output)
}

fn handle_show(config: &AppConfig, args: ShowArgs) -> Result<(), AppError> {
    let table = pipeline::run_figure(config, args.figure)?;
    let summary = crate::report::summarize(&table);
    println!("{}", crate::report::format_summary(args.figure.title(), &summary));
    emit(&table, &args.output)
}

fn handle_catalog(config: &AppConfig, args: CatalogArgs) -> Result<(), AppError> {
    let (variables, saved) = pipeline::run_catalog(config, args.save)?;
    println!("{}", crate::report::format_variable_list(&variables));
    if let Some(path) = saved {
        info!(path = %path.display(), variables = variables.len(), "variable list saved");
    }
    Ok(())
}

/// Print the table, then the optional plot and export.
fn emit(table: &Table, output: &OutputArgs) -> Result<(), AppError> {
    println!("{}", crate::report::format_table(table, output.rows));

    if output.plot {
        println!("{}", crate::plot::render_ascii_plot(table, output.width, output.height));
    }
    if let Some(path) = &output.export {
        crate::io::export::write_table_file(path, table)?;
        info!(path = %path.display(), "table exported");
    }
    Ok(())
}
