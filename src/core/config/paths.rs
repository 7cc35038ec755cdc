use super::ConfigError;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home_path = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;

        Ok(ConfigPaths {
            rc_path: home_path.join(".kestrelrc"),
        })
    }
}
