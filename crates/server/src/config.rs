use finpulse_core::{ConfigError, ReviewThresholds};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "finpulse.toml";

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Thresholds(#[from] ConfigError),
    #[error("Unknown log format '{0}', expected 'pretty' or 'json'")]
    LogFormat(String),
    #[error("history_limit must be between 1 and 52")]
    HistoryLimit,
    #[error("No data directory available; set database_path")]
    NoDataDir,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// Bunyan-style JSON lines.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ServerConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ServerConfigError::LogFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Falls back to the platform data directory.
    pub database_path: Option<PathBuf>,
    pub log_format: LogFormat,
    /// Default page size of the review history.
    pub history_limit: u32,
    /// Empty allows any origin.
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub thresholds: ReviewThresholds,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            database_path: None,
            log_format: LogFormat::Pretty,
            history_limit: 12,
            allowed_origins: Vec::new(),
            max_upload_bytes: 2 * 1024 * 1024,
            thresholds: ReviewThresholds::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `FINPULSE_CONFIG` (or `finpulse.toml` when present), then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ServerConfigError> {
        let mut config = match std::env::var_os("FINPULSE_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ServerConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ServerConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ServerConfigError> {
        let config: ServerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ServerConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("FINPULSE_BIND") {
            self.bind_addr = bind;
        }
        if let Some(path) = lookup("FINPULSE_DATABASE") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(format) = lookup("FINPULSE_LOG_FORMAT") {
            self.log_format = format.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ServerConfigError> {
        self.thresholds.validate()?;
        if !(1..=52).contains(&self.history_limit) {
            return Err(ServerConfigError::HistoryLimit);
        }
        Ok(())
    }

    pub fn database_path(&self) -> Result<PathBuf, ServerConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        let dirs = directories::ProjectDirs::from("com", "finpulse", "FinPulse")
            .ok_or(ServerConfigError::NoDataDir)?;
        Ok(dirs.data_dir().join("finpulse.db"))
    }
}
