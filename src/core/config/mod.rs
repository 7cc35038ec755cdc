use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

mod loader;
mod paths;

use super::commands::DEFAULT_REPLAY_DEPTH;
use crate::process::runner::DEFAULT_POLL_INTERVAL;
use loader::ConfigLoader;
pub use paths::ConfigPaths;

pub const DEFAULT_HISTORY_FILE: &str = "history.txt";

/// Settings read from the rc file. Anything not set keeps its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub history_file: Option<PathBuf>,
    pub poll_interval: Duration,
    pub replay_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            replay_depth: DEFAULT_REPLAY_DEPTH,
        }
    }
}

impl Config {
    /// Loads `explicit` if given (it must exist), otherwise `~/.kestrelrc`
    /// when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let rc_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::ConfigFileNotFound(path.display().to_string()));
                }
                path.to_path_buf()
            }
            None => match ConfigPaths::new() {
                Ok(paths) => paths.rc_path,
                Err(ConfigError::HomeDirNotFound) => return Ok(config),
                Err(e) => return Err(e),
            },
        };

        ConfigLoader::new(&rc_path).load_into(&mut config)?;
        Ok(config)
    }

    /// `--history` wins over the rc file, which wins over `history.txt` in
    /// the starting directory.
    pub fn history_path(&self, flag: Option<&str>, start_dir: &Path) -> PathBuf {
        if let Some(path) = flag {
            return crate::path::PathExpander::new().expand(path);
        }
        match &self.history_file {
            Some(path) => path.clone(),
            None => start_dir.join(DEFAULT_HISTORY_FILE),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    HomeDirNotFound,
    ConfigFileNotFound(String),
    InvalidLine { line: usize, content: String },
    InvalidValue { key: String, value: String },
    IoError(std::io::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirNotFound => write!(f, "Home directory not found"),
            ConfigError::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::InvalidLine { line, content } => {
                write!(f, "line {}: expected key = value, found '{}'", line, content)
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value '{}' for {}", value, key)
            }
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
