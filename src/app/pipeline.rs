//! Shared table-producing pipelines used by the CLI commands.
//!
//! Each function resolves the store and catalog from an `AppConfig` and
//! returns plain tables; printing, plotting and exporting stay in `app`.

use std::path::PathBuf;

use crate::app::figures::{Figure, build_figure};
use crate::catalog::{Catalog, LIST_FILE, VariableInfo, collect_variables, write_variable_list};
use crate::domain::{Aggregation, AppConfig, Cadence, SeriesKey, Table};
use crate::engine::derived::yoy_change;
use crate::engine::{SeriesSource, merge, resample};
use crate::error::AppError;
use crate::io::CsvStore;

pub fn store(config: &AppConfig) -> CsvStore {
    CsvStore::new(&config.data_dir)
}

/// Merge stored series; optionally as year-over-year change.
pub fn run_merge(
    config: &AppConfig,
    names: &[String],
    minimum: Cadence,
    yoy: bool,
) -> Result<(Table, Cadence), AppError> {
    let (table, cadence) = merge(&store(config), names, minimum)?;
    let table = if yoy { yoy_change(&table) } else { table };
    Ok((table, cadence))
}

pub fn run_resample(
    config: &AppConfig,
    key: &SeriesKey,
    target: Cadence,
    aggregation: Aggregation,
) -> Result<Table, AppError> {
    let raw = store(config).load_raw_series(key)?;
    Ok(resample(&raw, target, aggregation)?)
}

pub fn run_figure(config: &AppConfig, figure: Figure) -> Result<Table, AppError> {
    let catalog = Catalog::load(&config.config_dir)?;
    Ok(build_figure(&store(config), &catalog, figure)?)
}

/// Collect the variable listing; with `save`, also write it next to the data
/// directory and return the written path.
pub fn run_catalog(config: &AppConfig, save: bool) -> Result<(Vec<VariableInfo>, Option<PathBuf>), AppError> {
    let catalog = Catalog::load(&config.config_dir)?;
    let variables = collect_variables(&store(config), &catalog.hierarchy)?;

    if !save {
        return Ok((variables, None));
    }
    let path = config
        .data_dir
        .parent()
        .map(|p| p.join(LIST_FILE))
        .unwrap_or_else(|| PathBuf::from(LIST_FILE));
    write_variable_list(&path, &variables)?;
    Ok((variables, Some(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config(root: &std::path::Path) -> AppConfig {
        let data_dir = root.join("data").join("parse_data");
        fs::create_dir_all(&data_dir).unwrap();
        AppConfig {
            data_dir,
            config_dir: root.join("config"),
        }
    }

    #[test]
    fn merge_reads_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::write(
            config.data_dir.join("RGDP-FRED-Q.csv"),
            "Time,Real GDP\n2020-01-01,100\n2020-04-01,101\n2020-07-01,102\n",
        )
        .unwrap();
        fs::write(
            config.data_dir.join("UNRATE-FRED-M.csv"),
            "Time,Unemployment Rate\n2020-02-01,3.5\n2020-03-01,4.4\n2020-04-01,14.8\n2020-05-01,13.2\n2020-06-01,11.0\n",
        )
        .unwrap();

        let names = vec!["RGDP-FRED-Q".to_string(), "UNRATE-FRED-M".to_string()];
        let (table, cadence) = run_merge(&config, &names, Cadence::Daily, false).unwrap();
        assert_eq!(cadence, Cadence::Quarterly);
        assert_eq!(table.len(), 3);
        assert!(table.columns[1].values[0].is_nan());
        assert_eq!(table.columns[1].values[1], 13.0);
        assert!(table.columns[1].values[2].is_nan());

        let err = run_merge(&config, &["CPI-FRED-M".to_string()], Cadence::Daily, false).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn catalog_saves_listing_next_to_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::write(config.data_dir.join("FFER-FRED-D.csv"), "Time,Federal Funds\n2024-01-02,5.33\n").unwrap();

        let (vars, path) = run_catalog(&config, true).unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].label, "[D] Federal Funds");
        assert_eq!(path.unwrap(), dir.path().join("data").join(LIST_FILE));
    }

    #[test]
    fn resample_rejects_upsampling() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::write(config.data_dir.join("NGDP-BEA-A.csv"), "Time,GDP\n2020,1\n").unwrap();

        let key = SeriesKey::parse("NGDP-BEA-A").unwrap();
        let err = run_resample(&config, &key, Cadence::Monthly, Aggregation::Mean).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
