//! Configuration file (`stockbook.yaml`)
//!
//! ```yaml
//! store_path: stockbook.json
//! export_dir: exports
//! buildings:
//!   - id: bldg-1
//!     name: Yablokoff-Wallace Dining Center
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use crate::error::{StockError, StockResult};
use crate::types::Building;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "stockbook.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON document holding all snapshots and the master catalog
    pub store_path: PathBuf,
    /// Where exported workbooks are saved
    pub export_dir: PathBuf,
    pub buildings: Vec<Building>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("stockbook.json"),
            export_dir: PathBuf::from("."),
            buildings: vec![
                Building {
                    id: "bldg-1".to_string(),
                    name: "Yablokoff-Wallace Dining Center".to_string(),
                },
                Building {
                    id: "bldg-2".to_string(),
                    name: "Pavilion".to_string(),
                },
                Building {
                    id: "bldg-3".to_string(),
                    name: "Catering".to_string(),
                },
            ],
        }
    }
}

impl Config {
    /// Load the config file, or defaults when it does not exist. Relative
    /// paths inside the file resolve against the file's directory.
    pub fn load(path: &Path) -> StockResult<Self> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| StockError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        if config.store_path.is_relative() {
            config.store_path = base.join(&config.store_path);
        }
        if config.export_dir.is_relative() {
            config.export_dir = base.join(&config.export_dir);
        }
        debug!(
            buildings = config.buildings.len(),
            "loaded config from {}",
            path.display()
        );
        Ok(config)
    }

    fn validate(&self) -> StockResult<()> {
        if self.buildings.is_empty() {
            return Err(StockError::Validation(
                "config must list at least one building".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for b in &self.buildings {
            if b.id.trim().is_empty() || b.name.trim().is_empty() {
                return Err(StockError::Validation(
                    "building id and name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(b.id.as_str()) {
                return Err(StockError::Validation(format!(
                    "duplicate building id '{}'",
                    b.id
                )));
            }
        }
        Ok(())
    }

    /// Find a building by id, or by name ignoring case
    pub fn building(&self, key: &str) -> StockResult<&Building> {
        let key = key.trim();
        self.buildings
            .iter()
            .find(|b| b.id == key)
            .or_else(|| {
                self.buildings
                    .iter()
                    .find(|b| b.name.eq_ignore_ascii_case(key))
            })
            .ok_or_else(|| StockError::NotFound(format!("building '{}'", key)))
    }
}
