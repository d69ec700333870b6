//! Series catalog: what can be requested, how variables nest, what is stored.

pub mod hierarchy;
pub mod listing;
pub mod request;

use std::collections::BTreeMap;
use std::path::Path;

use crate::data::Provider;
use crate::domain::SeriesKey;
use crate::error::AppError;

pub use hierarchy::{DatasetTree, Hierarchy, Node};
pub use listing::{LIST_FILE, VariableInfo, collect_variables, variable_label, write_variable_list};
pub use request::{SeriesRequest, load_requests, parse_requests};

/// Everything loaded from the configuration directory.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub requests: BTreeMap<SeriesKey, SeriesRequest>,
    pub hierarchy: Hierarchy,
}

impl Catalog {
    pub fn load(config_dir: &Path) -> Result<Self, AppError> {
        let mut requests = BTreeMap::new();
        for provider in Provider::ALL {
            requests.extend(load_requests(config_dir, provider)?);
        }
        let hierarchy = Hierarchy::load(config_dir)?;
        tracing::debug!(series = requests.len(), "catalog loaded");
        Ok(Self { requests, hierarchy })
    }

    pub fn request(&self, key: &SeriesKey) -> Option<&SeriesRequest> {
        self.requests.get(key)
    }

    /// Configured human name of a series, if any.
    pub fn display_name(&self, key: &SeriesKey) -> Option<&str> {
        self.request(key)?.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_merges_provider_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("FRED.json"),
            r#"{"UNRATE-FRED-M": {"params": {"series_id": "UNRATE"}, "name": "Unemployment rate"}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("BEA.json"),
            r#"{"NGDP-BEA-A": {"params": {"TableName": "T10105"}, "MnToBn": true}}"#,
        )
        .unwrap();

        let catalog = Catalog::load(dir.path()).unwrap();
        assert_eq!(catalog.requests.len(), 2);

        let unrate = SeriesKey::parse("UNRATE-FRED-M").unwrap();
        assert_eq!(catalog.display_name(&unrate), Some("Unemployment rate"));
        assert_eq!(catalog.display_name(&SeriesKey::parse("NGDP-BEA-A").unwrap()), None);
        assert!(catalog.hierarchy.dataset("NGDP-BEA").is_none());
    }
}
