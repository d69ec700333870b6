//! Per-provider request configuration (`BEA.json`, `FRED.json`).
//!
//! ```json
//! {
//!   "NGDP-BEA-Q": {
//!     "params": {"method": "GetData", "datasetname": "NIPA", "TableName": "T10105",
//!                "Frequency": "Q", "Year": "ALL", "ResultFormat": "json"},
//!     "drop_cols": [],
//!     "MnToBn": true
//!   },
//!   "UNRATE-FRED-M": {"params": {"series_id": "UNRATE"}, "name": "Unemployment rate"}
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::data::{BeaOptions, Provider};
use crate::domain::SeriesKey;
use crate::error::AppError;

/// One configured series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeriesRequest {
    /// Query parameters passed to the provider as-is.
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub drop_cols: Vec<String>,
    #[serde(default, rename = "MnToBn")]
    pub mn_to_bn: bool,
    /// Human-readable name, used as the column label in some figures.
    #[serde(default)]
    pub name: Option<String>,
}

impl SeriesRequest {
    pub fn bea_options(&self) -> BeaOptions {
        BeaOptions {
            drop_cols: self.drop_cols.clone(),
            mn_to_bn: self.mn_to_bn,
        }
    }
}

/// Parse a request-config document for `provider`.
///
/// Every key must be a valid series key whose source matches the provider.
pub fn parse_requests(provider: Provider, json: &str) -> Result<BTreeMap<SeriesKey, SeriesRequest>, AppError> {
    let raw: BTreeMap<String, SeriesRequest> = serde_json::from_str(json).map_err(|e| {
        AppError::new(2, format!("Invalid {} request config: {e}", provider.config_file()))
    })?;

    let mut out = BTreeMap::new();
    for (name, request) in raw {
        let key = SeriesKey::parse(&name).map_err(|e| {
            AppError::new(2, format!("Invalid series name '{name}' in {}: {e}", provider.config_file()))
        })?;
        if Provider::from_source(key.source()) != Some(provider) {
            return Err(AppError::new(
                2,
                format!(
                    "Series '{name}' in {} does not belong to {}.",
                    provider.config_file(),
                    provider.display_name()
                ),
            ));
        }
        out.insert(key, request);
    }
    Ok(out)
}

/// Load `<config_dir>/<provider file>`; a missing file yields no requests.
pub fn load_requests(config_dir: &Path, provider: Provider) -> Result<BTreeMap<SeriesKey, SeriesRequest>, AppError> {
    let path = config_dir.join(provider.config_file());
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "request config not found");
        return Ok(BTreeMap::new());
    }
    let json = std::fs::read_to_string(&path)
        .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))?;
    parse_requests(provider, &json)
}
