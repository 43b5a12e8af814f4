//! Configuration loading and parsing.
//!
//! Parses `gridvi.toml` (or an override path supplied by the binary). Three
//! sections are understood: `[input]` (cancel key notations), `[grid]`
//! (dimensions plus the glyph sets the sample host treats as protected or
//! rewarding) and `[log]` (filter directive and log file name). Unknown
//! fields are ignored so older binaries tolerate newer files. A missing or
//! malformed file never aborts startup; defaults are used instead.
//!
//! Key notations are kept as raw strings here; the interpreter parses them
//! and skips entries it cannot understand.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const FILE_NAME: &str = "gridvi.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_cancel")]
    pub cancel: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            cancel: Self::default_cancel(),
        }
    }
}

impl InputConfig {
    fn default_cancel() -> Vec<String> {
        vec!["<Esc>".to_string()]
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct GridConfig {
    /// Minimum grid width; the grid file may widen it.
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub height: Option<usize>,
    #[serde(default = "GridConfig::default_protected")]
    pub protected: String,
    #[serde(default = "GridConfig::default_reward")]
    pub reward: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            protected: Self::default_protected(),
            reward: Self::default_reward(),
        }
    }
}

impl GridConfig {
    fn default_protected() -> String {
        "#".to_string()
    }
    fn default_reward() -> String {
        "*".to_string()
    }

    pub fn is_protected(&self, glyph: char) -> bool {
        self.protected.contains(glyph)
    }

    pub fn is_reward(&self, glyph: char) -> bool {
        self.reward.contains(glyph)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_filter")]
    pub filter: String,
    #[serde(default = "LogConfig::default_file")]
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
            file: Self::default_file(),
        }
    }
}

impl LogConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
    fn default_file() -> String {
        "gridvi.log".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file contents, when one was read
    pub source: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Best-effort config path: working directory first, then the platform
/// config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("gridvi").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                cancel_keys = file.input.cancel.len(),
                "config_loaded"
            );
            Ok(Config {
                raw: Some(content),
                source: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn cancel_notations(&self) -> &[String] {
        &self.file.input.cancel
    }
}
