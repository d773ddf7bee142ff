//! Human-readable names for dataset ids.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lookup table from dataset id to display name.
///
/// Ids may carry a scale marker (`t-2m`, `f16a-1m`); the marker is stripped
/// before lookup. Unknown ids are shown as the quoted raw id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetLabels {
    names: BTreeMap<String, String>,
}

impl DatasetLabels {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            names: BTreeMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    /// Merge another table over this one.
    pub fn extend(&mut self, other: &DatasetLabels) {
        for (id, name) in &other.names {
            self.names.insert(id.clone(), name.clone());
        }
    }

    /// Display name for a dataset id, falling back to `'<id>'`.
    pub fn display_name(&self, dataset_id: &str) -> String {
        self.names
            .get(strip_scale_suffix(dataset_id))
            .cloned()
            .unwrap_or_else(|| format!("'{}'", dataset_id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for DatasetLabels {
    fn default() -> Self {
        let mut labels = Self::empty();
        for (id, name) in [
            ("t", "Scanned 7.5'"),
            ("c", "Contour Lines"),
            ("canopy", "Canopy Data"),
            ("dem8", "Elevation Data"),
            ("f", "FSTopo 2013"),
            ("f16a", "FSTopo 2016"),
            ("mapbuilder_overlay", "MapBuilder Overlay"),
            ("mapbuilder_topo", "MapBuilder Topo"),
            ("naip_2014", "NAIP Imagery 2014"),
            ("nlcd", "Land Cover Data"),
        ] {
            labels.insert(id, name);
        }
        labels
    }
}

/// Remove a trailing `-<digits>m` scale marker from a dataset id.
pub fn strip_scale_suffix(dataset_id: &str) -> &str {
    match dataset_id.rsplit_once('-') {
        Some((base, marker)) if is_scale_marker(marker) => base,
        _ => dataset_id,
    }
}

fn is_scale_marker(token: &str) -> bool {
    token
        .strip_suffix('m')
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}
