//! Constructor configuration, read from TOML.
//!
//! ```toml
//! storage_dir = "/home/me/.local/share/memoria"
//! user_id = "42"
//! cell_size = 80
//! max_resolve_iterations = 10
//! log_filter = "memoria=debug"
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::MAX_RESOLVE_ITERATIONS;
use crate::model::CELL_SIZE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where [`FileStore`](crate::store::FileStore) keeps pages.
    pub storage_dir: PathBuf,
    /// Whose page to open. `None` opens the anonymous page.
    pub user_id: Option<String>,
    /// Pixel size of a grid cell, for converting drag offsets.
    pub cell_size: u32,
    /// Pass budget for collision resolution.
    pub max_resolve_iterations: usize,
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` wins if set.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_dir: default_storage_dir(),
            user_id: None,
            cell_size: CELL_SIZE,
            max_resolve_iterations: MAX_RESOLVE_ITERATIONS,
            log_filter: None,
        }
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("memoria")
}

/// `<config_dir>/memoria/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("memoria").join("config.toml"))
}

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.cell_size == 0 {
            config.cell_size = CELL_SIZE;
        }
        Ok(config)
    }

    /// Load from `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Config::from_toml(&text, path),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load from the given path, or from the default location.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Config::load(path),
            None => match default_config_path() {
                Some(path) => Config::load(&path),
                None => Ok(Config::default()),
            },
        }
    }
}
