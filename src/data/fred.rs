//! FRED API integration (general economic-data provider).

use std::collections::BTreeMap;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Period, SeriesKey, Table};
use crate::error::AppError;

const SERIES_URL: &str = "https://api.stlouisfed.org/fred/series";
const OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Fetch one series as a single-column table named after the series title.
    ///
    /// `params` are the request-config parameters and must include `series_id`.
    pub fn fetch(&self, key: &SeriesKey, params: &BTreeMap<String, String>) -> Result<Table, AppError> {
        if !params.contains_key("series_id") {
            return Err(AppError::new(2, format!("FRED request for {key} is missing `series_id`.")));
        }

        let info = self.get(SERIES_URL, params)?;
        let title = parse_title(&info)?;
        debug!(%key, %title, "fetched FRED series title");

        let body = self.get(OBSERVATIONS_URL, params)?;
        parse_observations(key, &title, &body)
    }

    fn get(&self, url: &str, params: &BTreeMap<String, String>) -> Result<String, AppError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str()), ("file_type", "json")])
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("FRED request failed with status {}.", resp.status()),
            ));
        }

        resp.text()
            .map_err(|e| AppError::new(4, format!("Failed to read FRED response: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    seriess: Vec<SeriesInfo>,
}

#[derive(Debug, Deserialize)]
struct SeriesInfo {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Extract the series title from a `/fred/series` response body.
pub fn parse_title(body: &str) -> Result<String, AppError> {
    let resp: SeriesResponse = serde_json::from_str(body)
        .map_err(|e| AppError::new(4, format!("Failed to parse FRED series response: {e}")))?;
    resp.seriess
        .into_iter()
        .next()
        .map(|s| s.title)
        .ok_or_else(|| AppError::new(4, "FRED series response has no series."))
}

/// Convert an observations response body into a table at the key's cadence.
///
/// FRED marks missing values with `.`; they are kept as NaN rows.
pub fn parse_observations(key: &SeriesKey, title: &str, body: &str) -> Result<Table, AppError> {
    let resp: ObservationsResponse = serde_json::from_str(body)
        .map_err(|e| AppError::new(4, format!("Failed to parse FRED response: {e}")))?;

    if resp.observations.is_empty() {
        return Err(AppError::new(4, format!("No observations returned for series {key}.")));
    }

    let mut periods = Vec::with_capacity(resp.observations.len());
    let mut values = Vec::with_capacity(resp.observations.len());
    for obs in resp.observations {
        let period = Period::parse(key.cadence(), &obs.date)
            .map_err(|e| AppError::new(4, format!("Invalid FRED date '{}': {e}", obs.date)))?;
        periods.push(period);
        values.push(parse_value(&obs.value));
    }

    let mut table = Table::new(key.cadence(), periods);
    table.push_column(title, values);
    Ok(table.sorted())
}

fn parse_value(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return f64::NAN;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observations_become_monthly_periods() {
        let key = SeriesKey::parse("UNRATE-FRED-M").unwrap();
        let body = r#"{
            "realtime_start": "2025-01-01",
            "observations": [
                {"realtime_start": "2025-01-01", "date": "2020-01-01", "value": "3.6"},
                {"realtime_start": "2025-01-01", "date": "2020-02-01", "value": "."},
                {"realtime_start": "2025-01-01", "date": "2020-03-01", "value": "4.4"}
            ]
        }"#;

        let table = parse_observations(&key, "Unemployment Rate", body).unwrap();
        let labels: Vec<String> = table.periods.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["2020-01", "2020-02", "2020-03"]);
        assert_eq!(table.column_names(), vec!["Unemployment Rate"]);
        assert_eq!(table.columns[0].values[0], 3.6);
        assert!(table.columns[0].values[1].is_nan());
    }

    #[test]
    fn empty_or_malformed_responses_fail() {
        let key = SeriesKey::parse("FFER-FRED-D").unwrap();
        let err = parse_observations(&key, "t", r#"{"observations": []}"#).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(parse_observations(&key, "t", "not json").is_err());
    }

    #[test]
    fn title_from_series_response() {
        let body = r#"{"seriess": [{"id": "DFF", "title": "Federal Funds Effective Rate"}]}"#;
        assert_eq!(parse_title(body).unwrap(), "Federal Funds Effective Rate");
        assert!(parse_title(r#"{"seriess": []}"#).is_err());
    }
}
