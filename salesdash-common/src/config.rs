//! Configuration loading and data-folder resolution

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "SALESDASH_DATA_FOLDER";
/// Environment variable pointing at an explicit config file
pub const CONFIG_FILE_ENV: &str = "SALESDASH_CONFIG";

/// Top-level application configuration, deserialized from TOML.
///
/// Every field has a default so a missing config file means "run with
/// defaults", not an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Folder containing the CSV exports and the SQLite database
    pub data_folder: PathBuf,
    /// SQLite database file name inside the data folder
    pub database_file: String,
    /// HTTP listen port
    pub port: u16,
    pub sources: SourceFiles,
    pub allowlists: AllowlistFiles,
    /// Remote order-management system; absent means CSV-only operation
    pub remote: Option<RemoteConfig>,
    pub segmentation: SegmentationConfig,
    /// Optional date window for the marketplace event recap
    pub marketplace_event: Option<EventWindow>,
}

/// File names of the required tabular sources
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceFiles {
    pub order_lines: String,
    pub master_sku: String,
}

/// File names of the order-reference allowlist side files
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllowlistFiles {
    pub trade_show: String,
    pub marketplace: String,
}

/// Remote order-management source
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    pub endpoint: String,
    /// Fail-fast request timeout; there is no retry
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,
}

/// Customer segmentation tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentationConfig {
    /// Largest candidate cluster count tried during model selection
    pub max_clusters: usize,
    /// Fixed RNG seed; required for reproducible cluster assignments
    pub seed: u64,
}

/// Inclusive start / exclusive end calendar window
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventWindow {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

fn default_remote_timeout_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from("./data"),
            database_file: "salesdash.db".to_string(),
            port: 5780,
            sources: SourceFiles::default(),
            allowlists: AllowlistFiles::default(),
            remote: None,
            segmentation: SegmentationConfig::default(),
            marketplace_event: None,
        }
    }
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            order_lines: "sale-order-line.csv".to_string(),
            master_sku: "master-sku.csv".to_string(),
        }
    }
}

impl Default for AllowlistFiles {
    fn default() -> Self {
        Self {
            trade_show: "trade-show-orders.csv".to_string(),
            marketplace: "marketplace-orders.csv".to_string(),
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_clusters: 10,
            seed: 42,
        }
    }
}

impl AppConfig {
    /// Load configuration with the resolution priority:
    /// 1. Explicit path (command-line argument)
    /// 2. `SALESDASH_CONFIG` environment variable
    /// 3. OS config directory (`<config_dir>/salesdash/config.toml`)
    /// 4. Compiled defaults
    ///
    /// A path that resolves but fails to read or parse is an error; a path
    /// that simply does not exist falls through to the next priority.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            return Self::from_file(Path::new(&path));
        }

        if let Some(dir) = dirs::config_dir() {
            let path = dir.join("salesdash").join("config.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Parse a specific TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))
    }

    /// Apply the data-folder override priority: CLI argument, then
    /// environment variable, then whatever the config file said.
    pub fn resolve_data_folder(&mut self, cli_arg: Option<&str>) {
        if let Some(path) = cli_arg {
            self.data_folder = PathBuf::from(path);
        } else if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
            self.data_folder = PathBuf::from(path);
        }
    }

    /// Full path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_folder.join(&self.database_file)
    }

    /// Full path of a named file inside the data folder
    pub fn data_file(&self, file_name: &str) -> PathBuf {
        self.data_folder.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_every_field() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.sources.order_lines, "sale-order-line.csv");
        assert_eq!(cfg.allowlists.trade_show, "trade-show-orders.csv");
        assert_eq!(cfg.segmentation.max_clusters, 10);
        assert_eq!(cfg.segmentation.seed, 42);
        assert!(cfg.remote.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "port = 9001\n[segmentation]\nmax_clusters = 6\nseed = 7\n"
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.port, 9001);
        assert_eq!(cfg.segmentation.max_clusters, 6);
        assert_eq!(cfg.database_file, "salesdash.db");
    }

    #[test]
    fn cli_argument_wins_over_config_file() {
        let mut cfg = AppConfig::default();
        cfg.data_folder = PathBuf::from("/from/config");
        cfg.resolve_data_folder(Some("/from/cli"));
        assert_eq!(cfg.data_folder, PathBuf::from("/from/cli"));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn marketplace_event_window_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[marketplace_event]\nstart = \"2025-01-21\"\nend = \"2025-01-25\"\n"
        )
        .unwrap();
        let cfg = AppConfig::from_file(file.path()).unwrap();
        let window = cfg.marketplace_event.unwrap();
        assert_eq!(window.start.to_string(), "2025-01-21");
    }
}
