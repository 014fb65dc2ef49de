use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CompanionError, Result};

static APP_DIR: &str = "spring-mood-companion";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub data_dir: PathBuf,
    /// Relative paths are resolved against `data_dir`.
    pub log_file: PathBuf,
    pub model: String,
    pub api_base: String,
    pub max_tokens: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_file: PathBuf::from("mood_log.json"),
            model: "gpt-3.5-turbo".to_string(),
            api_base: "https://api.openai.com/v1/".to_string(),
            max_tokens: 10,
        }
    }
}

fn default_data_dir() -> PathBuf {
    match homedir::my_home() {
        Ok(Some(home)) => home.join(APP_DIR),
        other => {
            tracing::warn!(result = ?other, "home directory not found, using working directory");
            PathBuf::from(".").join(APP_DIR)
        }
    }
}

impl Config {
    /// `explicit` must exist. Otherwise `<data_dir>/config.json` is used when present.
    pub(crate) fn load(explicit: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let dir = data_dir.clone().unwrap_or_else(default_data_dir);
                let path = dir.join("config.json");
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self {
                        data_dir: dir,
                        ..Self::default()
                    }
                }
            }
        };
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        Ok(config)
    }

    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CompanionError::Config(format!("cannot read {:?}: {}", path, e)))?;
        serde_json::from_str(&content)
            .map_err(|e| CompanionError::Config(format!("cannot parse {:?}: {}", path, e)))
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_file)
    }
}
