use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::config::{
    DEFAULT_IMAGES_PER_ROW, DEFAULT_LEGACY_DISTRIBUTIONS, DEFAULT_SPLITS, DEFAULT_VERSION_PREFIX,
    MAX_IMAGES_PER_ROW,
};
use crate::error::{DashboardError, Result};

/// Naming knobs for the plot trees. Every field is optional in the TOML file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Version directories start with this prefix (`v16`).
    pub version_prefix: String,
    /// Directory names accepted as dataset splits.
    pub splits: Vec<String>,
    /// Distribution directories that may sit directly under a version in
    /// `distribution_plots` (the layout before per-split directories).
    pub legacy_distributions: Vec<String>,
    pub default_images_per_row: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            version_prefix: DEFAULT_VERSION_PREFIX.to_owned(),
            splits: DEFAULT_SPLITS.iter().map(|s| s.to_string()).collect(),
            legacy_distributions: DEFAULT_LEGACY_DISTRIBUTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_images_per_row: DEFAULT_IMAGES_PER_ROW,
        }
    }
}

impl LayoutConfig {
    fn validate(self) -> Result<Self> {
        if !(1..=MAX_IMAGES_PER_ROW).contains(&self.default_images_per_row) {
            return Err(DashboardError::LayoutValidation {
                message: format!(
                    "default_images_per_row must be between 1 and {MAX_IMAGES_PER_ROW}, got {}",
                    self.default_images_per_row
                ),
            });
        }
        if self.splits.is_empty() {
            return Err(DashboardError::LayoutValidation {
                message: "splits must name at least one split".to_owned(),
            });
        }
        Ok(self)
    }
}

/// Loads the layout config. Returns `LayoutConfig::default()` if the file
/// doesn't exist; propagates other I/O, parse and validation errors.
pub fn load(path: &Path) -> Result<LayoutConfig> {
    match fs::read_to_string(path) {
        Ok(content) => toml::from_str::<LayoutConfig>(&content)
            .map_err(|source| DashboardError::LayoutParse {
                path: path.to_path_buf(),
                source,
            })?
            .validate(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LayoutConfig::default()),
        Err(e) => Err(e.into()),
    }
}
