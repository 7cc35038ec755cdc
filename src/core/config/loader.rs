use std::{fs, path::Path, str::FromStr, time::Duration};

use log::{debug, warn};

use super::{Config, ConfigError};
use crate::path::PathExpander;

pub struct ConfigLoader<'a> {
    path: &'a Path,
    expander: PathExpander,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self {
            path,
            expander: PathExpander::new(),
        }
    }

    pub fn load_into(&self, config: &mut Config) -> Result<(), ConfigError> {
        if !self.path.exists() {
            return Ok(());
        }

        debug!("reading config from {}", self.path.display());
        let content = fs::read_to_string(self.path)?;
        for (number, line) in content.lines().enumerate() {
            self.process_line(number + 1, line, config)?;
        }
        Ok(())
    }

    fn process_line(&self, number: usize, line: &str, config: &mut Config) -> Result<(), ConfigError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::InvalidLine {
            line: number,
            content: line.to_string(),
        })?;
        let key = key.trim();
        let mut value = value.trim();

        // Remove quotes if present
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }

        match key {
            "history_file" => config.history_file = Some(self.expander.expand(value)),
            "poll_interval_ms" => {
                config.poll_interval = Duration::from_millis(parse_value(key, value)?)
            }
            "replay_depth" => {
                let depth: usize = parse_value(key, value)?;
                if depth == 0 {
                    return Err(invalid(key, value));
                }
                config.replay_depth = depth;
            }
            _ => warn!("{}:{}: unknown setting '{}'", self.path.display(), number, key),
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
