//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then the optional TOML file, then
//! command-line overrides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const APP_DIR: &str = "learnsense";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "learnsense.log";
const DEFAULT_USER: &str = "local";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine home directory; set HOME or pass --data-dir")]
    NoHome,

    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub user: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the file at `path`. A missing file yields the empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Command-line values that win over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub user: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Key under which history is stored.
    pub user: String,
    /// Root of the history store.
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
}

/// XDG base directories, read from the environment once.
#[derive(Debug, Clone)]
struct BaseDirs {
    config: PathBuf,
    data: PathBuf,
    state: PathBuf,
}

impl BaseDirs {
    fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let xdg = |var: &str, fallback: &str| -> Result<PathBuf, ConfigError> {
            match std::env::var_os(var) {
                Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
                _ => home
                    .as_ref()
                    .map(|home| home.join(fallback))
                    .ok_or(ConfigError::NoHome),
            }
        };

        Ok(Self {
            config: xdg("XDG_CONFIG_HOME", ".config")?.join(APP_DIR),
            data: xdg("XDG_DATA_HOME", ".local/share")?.join(APP_DIR),
            state: xdg("XDG_STATE_HOME", ".local/state")?.join(APP_DIR),
        })
    }
}

impl Config {
    /// Resolve from the environment, the config file and `overrides`.
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        let dirs = BaseDirs::from_env()?;
        let path = overrides
            .config
            .clone()
            .unwrap_or_else(|| dirs.config.join(CONFIG_FILE));
        let file = FileConfig::load(&path)?;
        debug!(path = %path.display(), "configuration file read");

        let env_user = std::env::var("USER").ok();
        Ok(Self::merge(&dirs, file, overrides, env_user))
    }

    fn merge(dirs: &BaseDirs, file: FileConfig, overrides: Overrides, env_user: Option<String>) -> Self {
        let user = overrides
            .user
            .or(file.user)
            .or(env_user)
            .filter(|user| !user.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        Self {
            user,
            data_dir: overrides
                .data_dir
                .or(file.data_dir)
                .unwrap_or_else(|| dirs.data.clone()),
            log_file: file.log_file.unwrap_or_else(|| dirs.state.join(LOG_FILE)),
        }
    }
}
