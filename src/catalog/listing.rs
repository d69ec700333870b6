//! Listing of every stored variable (`List_of_ALL_variables.csv`).

use std::path::Path;

use serde::Serialize;

use crate::catalog::Hierarchy;
use crate::domain::Cadence;
use crate::engine::SeriesSource;
use crate::error::AppError;
use crate::io::CsvStore;

pub const LIST_FILE: &str = "List_of_ALL_variables.csv";

/// One value column of one stored series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableInfo {
    #[serde(rename = "Data Series")]
    pub label: String,
    #[serde(rename = "Start Period")]
    pub start: String,
    #[serde(rename = "End Period")]
    pub end: String,
    #[serde(rename = "col_name")]
    pub column: String,
    #[serde(rename = "csv_name")]
    pub file: String,
}

/// `[Q] <official name>`.
pub fn variable_label(cadence: Cadence, official_name: &str) -> String {
    format!("[{}] {official_name}", cadence.code())
}

/// Describe every value column of every stored series, in key order.
pub fn collect_variables(store: &CsvStore, hierarchy: &Hierarchy) -> Result<Vec<VariableInfo>, AppError> {
    let mut out = Vec::new();
    for key in store.list()? {
        let table = store.load_raw_series(&key)?;
        let (start, end) = table
            .span()
            .map(|(first, last)| (first.label(), last.label()))
            .unwrap_or_default();
        let dataset = key.dataset();
        let file = format!("{key}.csv");

        for (idx, col) in table.columns.iter().enumerate() {
            let occurrence = table.columns[..idx].iter().filter(|c| c.name == col.name).count();
            let official = hierarchy.official_name(&dataset, &col.name, occurrence);
            out.push(VariableInfo {
                label: variable_label(key.cadence(), &official),
                start: start.clone(),
                end: end.clone(),
                column: col.name.clone(),
                file: file.clone(),
            });
        }
    }
    Ok(out)
}

pub fn write_variable_list(path: &Path, variables: &[VariableInfo]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", path.display())))?;
    for info in variables {
        writer
            .serialize(info)
            .map_err(|e| AppError::new(4, format!("Failed to write variable list: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write variable list: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_columns_with_official_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("NGDP-BEA-Q.csv"),
            "Time,Gross domestic product,Goods,Exports,Goods\n2020Q1,1,2,3,4\n2020Q2,1,2,3,4\n",
        )
        .unwrap();
        fs::write(dir.path().join("UNRATE-FRED-M.csv"), "Time,Unemployment Rate\n2020-01,3.5\n").unwrap();

        let hierarchy = Hierarchy::from_json(
            r#"{"NGDP-BEA": [
                {"name": "Gross domestic product", "depth": 0},
                {"name": "Goods", "depth": 1},
                {"name": "Exports", "depth": 1},
                {"name": "Goods", "depth": 2}
            ]}"#,
        )
        .unwrap();

        let store = CsvStore::new(dir.path());
        let vars = collect_variables(&store, &hierarchy).unwrap();
        let labels: Vec<&str> = vars.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "[Q] Gross domestic product IN DATASET [Gross domestic product]",
                "[Q] [Goods] UNDER [Gross domestic product] IN DATASET [Gross domestic product]",
                "[Q] [Exports] UNDER [Gross domestic product] IN DATASET [Gross domestic product]",
                "[Q] [Goods] UNDER [Exports] IN DATASET [Gross domestic product]",
                "[M] Unemployment Rate",
            ]
        );
        assert_eq!(vars[0].start, "2020Q1");
        assert_eq!(vars[0].end, "2020Q2");
        assert_eq!(vars[4].file, "UNRATE-FRED-M.csv");

        let out = dir.path().join(LIST_FILE);
        write_variable_list(&out, &vars).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Data Series,Start Period,End Period,col_name,csv_name\n"));
        assert!(text.ends_with("[M] Unemployment Rate,2020-01,2020-01,Unemployment Rate,UNRATE-FRED-M.csv\n"));
    }
}
