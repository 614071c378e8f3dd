//! Configuration for gridsig.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. `~/.gridsig/config.toml` (or an explicit path)
//! 2. `GRIDSIG_*` environment variables
//! 3. command-line flags (applied by the binary)
//!
//! ```toml
//! [session]
//! seed = 12648430
//! min_pattern_size = 9
//! max_pattern_size = 14
//! max_attempts = 100000
//!
//! [journal]
//! enabled = false
//! dir = "."
//!
//! [flag]
//! path = "flag.txt"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 0x00C0_FFEE;
pub const DEFAULT_MIN_PATTERN_SIZE: usize = 9;
pub const DEFAULT_MAX_PATTERN_SIZE: usize = 14;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100_000;
pub const DEFAULT_FLAG_FILE: &str = "flag.txt";

pub const ENV_SEED: &str = "GRIDSIG_SEED";
pub const ENV_JOURNAL: &str = "GRIDSIG_JOURNAL";
pub const ENV_JOURNAL_DIR: &str = "GRIDSIG_JOURNAL_DIR";
pub const ENV_FLAG_PATH: &str = "GRIDSIG_FLAG_PATH";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridsigConfig {
    pub session: Option<SessionConfig>,
    pub journal: Option<JournalConfig>,
    pub flag: Option<FlagConfig>,
}

/// Pattern generation parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub seed: Option<u64>,
    pub min_pattern_size: Option<usize>,
    pub max_pattern_size: Option<usize>,
    /// Resample bound when looking for an unused signature.
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalConfig {
    #[serde(default)]
    pub enabled: bool,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

impl ConfigError {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::InvalidEnv { .. } => None,
        }
    }
}

/// Fully resolved settings, before command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub seed: u64,
    pub min_pattern_size: usize,
    pub max_pattern_size: usize,
    pub max_attempts: u32,
    pub journal_enabled: bool,
    pub journal_dir: PathBuf,
    pub flag_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            min_pattern_size: DEFAULT_MIN_PATTERN_SIZE,
            max_pattern_size: DEFAULT_MAX_PATTERN_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            journal_enabled: false,
            journal_dir: PathBuf::from("."),
            flag_path: PathBuf::from(DEFAULT_FLAG_FILE),
        }
    }
}

impl GridsigConfig {
    /// Load the config from the default location.
    ///
    /// Returns `Ok(None)` if there is no home directory or no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Load the config from an explicit path. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Merge file values over defaults, then environment values over those.
    ///
    /// `env` looks up a variable by name; the binary passes
    /// `|k| std::env::var(k).ok()`.
    pub fn resolve<F>(&self, env: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(session) = &self.session {
            if let Some(seed) = session.seed {
                settings.seed = seed;
            }
            if let Some(min) = session.min_pattern_size {
                settings.min_pattern_size = min;
            }
            if let Some(max) = session.max_pattern_size {
                settings.max_pattern_size = max;
            }
            if let Some(attempts) = session.max_attempts {
                settings.max_attempts = attempts;
            }
        }
        if let Some(journal) = &self.journal {
            settings.journal_enabled = journal.enabled;
            if let Some(dir) = &journal.dir {
                settings.journal_dir = dir.clone();
            }
        }
        if let Some(path) = self.flag.as_ref().and_then(|f| f.path.as_ref()) {
            settings.flag_path = path.clone();
        }

        if let Some(raw) = env(ENV_SEED) {
            settings.seed = parse_seed(&raw).ok_or(ConfigError::InvalidEnv {
                var: ENV_SEED,
                value: raw,
            })?;
        }
        if let Some(raw) = env(ENV_JOURNAL) {
            settings.journal_enabled = parse_flag(&raw).ok_or(ConfigError::InvalidEnv {
                var: ENV_JOURNAL,
                value: raw,
            })?;
        }
        if let Some(dir) = env(ENV_JOURNAL_DIR).filter(|v| !v.trim().is_empty()) {
            settings.journal_dir = PathBuf::from(dir);
        }
        if let Some(path) = env(ENV_FLAG_PATH).filter(|v| !v.trim().is_empty()) {
            settings.flag_path = PathBuf::from(path);
        }

        Ok(settings)
    }
}

/// Parse a seed given in decimal or `0x` hex.
#[must_use]
pub fn parse_seed(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gridsig").join("config.toml"))
}
