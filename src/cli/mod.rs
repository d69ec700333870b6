//! Command-line parsing for the macro-data tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the engine and pipelines.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::figures::Figure;
use crate::domain::{Aggregation, AppConfig, Cadence, SeriesKey};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "macro", version, about = "Macro-data store, frequency normalization and merge engine")]
pub struct Cli {
    /// Directory of parsed series CSV files.
    #[arg(long, global = true, default_value = "data/parse_data")]
    pub data_dir: PathBuf,

    /// Directory holding BEA.json, FRED.json and hierarchy.json.
    #[arg(long, global = true, default_value = "config_data_request")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn config(&self) -> AppConfig {
        AppConfig {
            data_dir: self.data_dir.clone(),
            config_dir: self.config_dir.clone(),
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch due series from BEA/FRED and append new observations to the store.
    Update(UpdateArgs),
    /// Merge stored series onto one cadence and print the aligned table.
    Merge(MergeArgs),
    /// Resample one stored series to a coarser cadence.
    Resample(ResampleArgs),
    /// Build a named figure preset.
    Show(ShowArgs),
    /// List every stored variable.
    Catalog(CatalogArgs),
}

#[derive(Debug, Args, Clone)]
pub struct UpdateArgs {
    /// Update every selected series regardless of the schedule.
    #[arg(long)]
    pub all: bool,

    /// Only fetch series that have no stored file yet.
    #[arg(long)]
    pub new_only: bool,

    /// Restrict the run to one configured series (e.g. NGDP-BEA-Q).
    #[arg(long, value_name = "NAME")]
    pub only: Option<SeriesKey>,

    /// Rewrite stored files instead of appending new periods.
    #[arg(long = "override")]
    pub replace: bool,

    /// Pause between upstream requests, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub pause_ms: u64,
}

/// Output options shared by table-producing commands.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Rows printed (most recent last); 0 prints all.
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the table to CSV or JSON (by extension).
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct MergeArgs {
    /// Series names, in output column order (e.g. RGDP-FRED-Q UNRATE-FRED-M).
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,

    /// Minimum output cadence.
    #[arg(long, value_enum, default_value_t = Cadence::Daily)]
    pub min_cadence: Cadence,

    /// Year-over-year change instead of levels.
    #[arg(long)]
    pub yoy: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ResampleArgs {
    /// Stored series name.
    #[arg(value_name = "NAME")]
    pub name: SeriesKey,

    /// Target cadence.
    #[arg(long, value_enum)]
    pub to: Cadence,

    /// Aggregation within each target period.
    #[arg(long, value_enum, default_value_t = Aggregation::Mean)]
    pub agg: Aggregation,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[arg(value_enum)]
    pub figure: Figure,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct CatalogArgs {
    /// Also write List_of_ALL_variables.csv next to the data directory.
    #[arg(long)]
    pub save: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_merge_with_globals() {
        let cli = Cli::parse_from([
            "macro",
            "merge",
            "RGDP-FRED-Q",
            "UNRATE-FRED-M",
            "--min-cadence",
            "a",
            "--data-dir",
            "/tmp/data",
        ]);
        assert_eq!(cli.config().data_dir, PathBuf::from("/tmp/data"));
        assert_eq!(cli.config().config_dir, PathBuf::from("config_data_request"));
        match cli.command {
            Command::Merge(args) => {
                assert_eq!(args.names, vec!["RGDP-FRED-Q", "UNRATE-FRED-M"]);
                assert_eq!(args.min_cadence, Cadence::Annual);
                assert_eq!(args.output.rows, 20);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_update_and_show() {
        let cli = Cli::parse_from(["macro", "update", "--all", "--only", "NGDP-BEA-Q", "--pause-ms", "0"]);
        match cli.command {
            Command::Update(args) => {
                assert!(args.all);
                assert_eq!(args.only.unwrap().to_string(), "NGDP-BEA-Q");
                assert_eq!(args.pause_ms, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["macro", "show", "business-cycle", "--plot"]);
        assert!(matches!(
            cli.command,
            Command::Show(ShowArgs { figure: Figure::BusinessCycle, .. })
        ));

        assert!(Cli::try_parse_from(["macro", "resample", "UNRATE-FRED-W", "--to", "q"]).is_err());
    }
}
