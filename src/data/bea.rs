//! BEA API integration (national accounts).
//!
//! BEA returns NIPA tables in long form, one JSON object per (line, period):
//!
//! ```json
//! {"TableName": "T10105", "LineNumber": "1", "LineDescription": "Gross domestic product",
//!  "TimePeriod": "1947Q1", "DataValue": "243,164", ...}
//! ```
//!
//! `parse_table` pivots this into a wide table with one column per line.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Period, SeriesKey, Table};
use crate::error::AppError;

const BASE_URL: &str = "https://apps.bea.gov/api/data/";

/// Post-processing applied to a fetched table.
#[derive(Debug, Clone, Default)]
pub struct BeaOptions {
    /// Column names removed after pivoting.
    pub drop_cols: Vec<String>,
    /// Divide values by 1000 (millions to billions of dollars).
    pub mn_to_bn: bool,
}

pub struct BeaClient {
    client: Client,
    api_key: String,
}

impl BeaClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("BEA_API_KEY")
            .map_err(|_| AppError::new(2, "Missing BEA_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Fetch one table. `params` carry `method`, `datasetname`, `tablename`,
    /// `frequency`, `year` and `resultformat` from the request config.
    pub fn fetch(
        &self,
        key: &SeriesKey,
        params: &BTreeMap<String, String>,
        options: &BeaOptions,
    ) -> Result<Table, AppError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[("UserID", self.api_key.as_str())])
            .query(params)
            .send()
            .map_err(|e| AppError::new(4, format!("BEA request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("BEA request failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read BEA response: {e}")))?;
        parse_table(key, &body, options)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "BEAAPI")]
    api: Api,
}

#[derive(Debug, Deserialize)]
struct Api {
    #[serde(rename = "Results")]
    results: Option<Results>,
    #[serde(rename = "Error")]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Results {
    #[serde(rename = "Data")]
    data: Option<Vec<Row>>,
    #[serde(rename = "Error")]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Row {
    line_number: String,
    line_description: String,
    time_period: String,
    data_value: String,
}

struct Line {
    name: String,
    values: BTreeMap<Period, f64>,
}

/// Pivot a BEA data response into a wide table at the key's cadence.
pub fn parse_table(key: &SeriesKey, body: &str, options: &BeaOptions) -> Result<Table, AppError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| AppError::new(4, format!("Failed to parse BEA response: {e}")))?;

    if let Some(err) = envelope.api.error {
        return Err(AppError::new(4, format!("BEA returned an error for {key}: {err}")));
    }
    let results = envelope
        .api
        .results
        .ok_or_else(|| AppError::new(4, format!("BEA response for {key} has no results.")))?;
    if let Some(err) = results.error {
        return Err(AppError::new(4, format!("BEA returned an error for {key}: {err}")));
    }
    let rows = results
        .data
        .filter(|rows| !rows.is_empty())
        .ok_or_else(|| AppError::new(4, format!("No observations returned for {key}.")))?;

    let mut lines: Vec<Line> = Vec::new();
    let mut by_number: HashMap<String, usize> = HashMap::new();
    let mut periods = BTreeSet::new();

    for row in rows {
        let period = Period::parse(key.cadence(), &row.time_period)
            .map_err(|e| AppError::new(4, format!("Invalid BEA period '{}': {e}", row.time_period)))?;
        periods.insert(period);

        let mut value = parse_value(&row.data_value);
        if options.mn_to_bn {
            value /= 1000.0;
        }

        let idx = *by_number.entry(row.line_number).or_insert_with(|| {
            lines.push(Line {
                name: row.line_description,
                values: BTreeMap::new(),
            });
            lines.len() - 1
        });
        lines[idx].values.insert(period, value);
    }

    let periods: Vec<Period> = periods.into_iter().collect();
    let mut table = Table::new(key.cadence(), periods);
    for line in lines {
        if options.drop_cols.contains(&line.name) {
            continue;
        }
        let values = table
            .periods
            .iter()
            .map(|p| line.values.get(p).copied().unwrap_or(f64::NAN))
            .collect();
        table.push_column(line.name, values);
    }
    Ok(table)
}

fn parse_value(raw: &str) -> f64 {
    raw.trim().replace(',', "").parse::<f64>().unwrap_or(f64::NAN)
}
