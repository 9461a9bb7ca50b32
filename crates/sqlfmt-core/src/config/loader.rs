//! Configuration file discovery and loading
//!
//! Only hosts use this module; the formatting pipeline itself never touches
//! the file system.

use super::FormatOptions;
use crate::Result;
use crate::error::SqlFmtError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names searched for, in priority order
const CONFIG_FILE_NAMES: &[&str] = &[
    ".sqlfmtrc.json",
    ".sqlfmtrc.toml",
    "sqlfmt.toml",
    "sqlfmt.yaml",
    "sqlfmt.yml",
];

/// Contents of a configuration file: a dialect plus flat format options
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,

    #[serde(flatten)]
    pub options: FormatOptions,
}

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by walking upward from `start_path`
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| SqlFmtError::io_error(start_path, e))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file, picking the format by extension
    pub fn load_from_file(path: &Path) -> Result<ConfigFile> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SqlFmtError::io_error(path, e))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let parsed = match extension {
            "toml" => toml::from_str(&content).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            _ => serde_json::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| SqlFmtError::ConfigFile {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load from an explicit path, or auto-discover from `start_dir`
    ///
    /// Returns the default (empty) configuration when nothing is found.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<ConfigFile> {
        if let Some(path) = custom_path {
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(ConfigFile::default())
            }
        }
    }
}
