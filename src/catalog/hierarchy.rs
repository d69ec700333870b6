//! Variable hierarchy of multi-line datasets.
//!
//! `hierarchy.json` lists each dataset's lines in table order with an indent
//! depth:
//!
//! ```json
//! {"NGDP-BEA": [
//!     {"name": "Gross domestic product", "depth": 0},
//!     {"name": "Personal consumption expenditures", "depth": 1},
//!     {"name": "Goods", "depth": 2}
//! ]}
//! ```
//!
//! Depths are resolved once into explicit parent links.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
struct Entry {
    name: String,
    depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub depth: usize,
    pub parent: Option<usize>,
}

/// Resolved tree of one dataset; node 0 is the root variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetTree {
    nodes: Vec<Node>,
}

impl DatasetTree {
    /// Build from `(name, depth)` pairs in table order.
    ///
    /// The first entry must have depth 0 and depth may grow by at most one
    /// per line.
    pub fn from_depths<S: AsRef<str>>(dataset: &str, entries: &[(S, usize)]) -> Result<Self, AppError> {
        let mut nodes: Vec<Node> = Vec::with_capacity(entries.len());
        // Most recent node seen at each depth.
        let mut open: Vec<usize> = Vec::new();

        for (id, (name, depth)) in entries.iter().enumerate() {
            let name = name.as_ref();
            let depth = *depth;
            if id == 0 && depth != 0 {
                return Err(AppError::new(
                    2,
                    format!("Hierarchy of '{dataset}' must start at depth 0, found {depth} for '{name}'."),
                ));
            }
            if depth > open.len() {
                return Err(AppError::new(
                    2,
                    format!("Hierarchy of '{dataset}' jumps to depth {depth} at '{name}'."),
                ));
            }

            open.truncate(depth);
            let parent = depth.checked_sub(1).map(|d| open[d]);
            open.push(id);
            nodes.push(Node {
                name: name.to_string(),
                depth,
                parent,
            });
        }
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn parent(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)?.parent.map(|p| &self.nodes[p])
    }

    /// Id of the `occurrence`-th (0-based) node named `name`.
    pub fn find(&self, name: &str, occurrence: usize) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.name == name)
            .nth(occurrence)
            .map(|(id, _)| id)
    }

    /// `[<name>] UNDER [<parent>] IN DATASET [<root>]`, or
    /// `<name> IN DATASET [<root>]` for top-level lines.
    pub fn official_name(&self, id: usize) -> Option<String> {
        let node = self.nodes.get(id)?;
        let root = self.root()?;
        let name = match self.parent(id) {
            Some(parent) => format!("[{}] UNDER [{}]", node.name, parent.name),
            None => node.name.clone(),
        };
        Some(format!("{name} IN DATASET [{}]", root.name))
    }
}

/// Trees keyed by dataset (`<Identifier>-<Source>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    datasets: BTreeMap<String, DatasetTree>,
}

impl Hierarchy {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let raw: BTreeMap<String, Vec<Entry>> = serde_json::from_str(json)
            .map_err(|e| AppError::new(2, format!("Invalid hierarchy config: {e}")))?;

        let mut datasets = BTreeMap::new();
        for (dataset, entries) in raw {
            let pairs: Vec<(String, usize)> = entries.into_iter().map(|e| (e.name, e.depth)).collect();
            let tree = DatasetTree::from_depths(&dataset, &pairs)?;
            datasets.insert(dataset, tree);
        }
        Ok(Self { datasets })
    }

    /// Load `<config_dir>/hierarchy.json`; a missing file yields an empty hierarchy.
    pub fn load(config_dir: &Path) -> Result<Self, AppError> {
        let path = config_dir.join("hierarchy.json");
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no hierarchy config");
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(&path)
            .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn dataset(&self, dataset: &str) -> Option<&DatasetTree> {
        self.datasets.get(dataset)
    }

    /// Official name of the `occurrence`-th column named `column` in `dataset`.
    /// Columns of datasets without a hierarchy (or unknown lines) keep their name.
    pub fn official_name(&self, dataset: &str, column: &str, occurrence: usize) -> String {
        self.dataset(dataset)
            .and_then(|tree| tree.official_name(tree.find(column, occurrence)?))
            .unwrap_or_else(|| column.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gdp_tree() -> DatasetTree {
        DatasetTree::from_depths(
            "NGDP-BEA",
            &[
                ("Gross domestic product", 0),
                ("Personal consumption expenditures", 1),
                ("Goods", 2),
                ("Durable goods", 3),
                ("Services", 2),
                ("Net exports of goods and services", 1),
                ("Exports", 2),
                ("Goods", 3),
            ],
        )
        .unwrap()
    }

    #[test]
    fn parents_resolve_to_nearest_shallower_line() {
        let tree = gdp_tree();
        let parents: Vec<Option<usize>> = tree.nodes().iter().map(|n| n.parent).collect();
        assert_eq!(
            parents,
            vec![None, Some(0), Some(1), Some(2), Some(1), Some(0), Some(5), Some(6)]
        );
    }

    #[test]
    fn official_names() {
        let tree = gdp_tree();
        assert_eq!(
            tree.official_name(0).unwrap(),
            "Gross domestic product IN DATASET [Gross domestic product]"
        );
        assert_eq!(
            tree.official_name(3).unwrap(),
            "[Durable goods] UNDER [Goods] IN DATASET [Gross domestic product]"
        );

        let hierarchy = Hierarchy {
            datasets: BTreeMap::from([("NGDP-BEA".to_string(), tree)]),
        };
        assert_eq!(
            hierarchy.official_name("NGDP-BEA", "Goods", 1),
            "[Goods] UNDER [Exports] IN DATASET [Gross domestic product]"
        );
        assert_eq!(hierarchy.official_name("UNRATE-FRED", "Unemployment Rate", 0), "Unemployment Rate");
    }

    #[test]
    fn invalid_depths_are_rejected() {
        assert!(DatasetTree::from_depths("X", &[("a", 1)]).is_err());
        assert!(DatasetTree::from_depths("X", &[("a", 0), ("b", 2)]).is_err());
        assert!(DatasetTree::from_depths("X", &[("a", 0), ("b", 1), ("c", 2), ("d", 0)]).is_ok());
    }

    #[test]
    fn from_json_builds_each_dataset() {
        let json = r#"{"GDI-BEA": [{"name": "Gross domestic income", "depth": 0},
                                   {"name": "Compensation of employees", "depth": 1}]}"#;
        let hierarchy = Hierarchy::from_json(json).unwrap();
        let tree = hierarchy.dataset("GDI-BEA").unwrap();
        assert_eq!(tree.parent(1).unwrap().name, "Gross domestic income");

        let err = Hierarchy::from_json(r#"{"X": [{"name": "a", "depth": 2}]}"#).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
