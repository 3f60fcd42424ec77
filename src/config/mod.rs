use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

/// Discord allows five action rows per message and one is taken by the
/// Generate/Edit buttons.
pub const COURT_ROW_LIMIT: usize = 4;

const TOKEN_VAR: &str = "BOT_TOKEN";
const LOG_LEVEL_VAR: &str = "BOT_LOG_LEVEL";
const SETTINGS_VAR: &str = "BOT_SETTINGS";

const DEFAULT_LOG_LEVEL: &str = "INFO";
const DEFAULT_SETTINGS_PATH: &str = "config/pickle_bot.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0:?}")]
    MissingVariable(&'static str),
    #[error("Invalid log level {0:?}")]
    InvalidLogLevel(String),
    #[error("Could not read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not parse settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// Values read from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub log_level: Level,
    pub settings_path: PathBuf,
    /// Optional variables that were missing and fell back to a default
    pub defaulted: Vec<(&'static str, &'static str)>,
}

impl Config {
    /// Reads the process environment, falling back to `.env.dev` and then `.env`.
    ///
    /// `dotenv` never overrides variables that are already set, so loading
    /// `.env.dev` first gives it precedence over `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::from_filename(".env.dev").ok();
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR).ok_or(ConfigError::MissingVariable(TOKEN_VAR))?;

        let mut defaulted = Vec::new();
        let mut optional = |name: &'static str, default: &'static str| {
            lookup(name).unwrap_or_else(|| {
                defaulted.push((name, default));
                default.to_string()
            })
        };

        let raw_level = optional(LOG_LEVEL_VAR, DEFAULT_LOG_LEVEL);
        let settings_path = PathBuf::from(optional(SETTINGS_VAR, DEFAULT_SETTINGS_PATH));

        let log_level = raw_level
            .trim()
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(raw_level.clone()))?;

        Ok(Config {
            token,
            log_level,
            settings_path,
            defaulted,
        })
    }
}

/// Bot behaviour loaded from the TOML settings file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub max_courts: usize,
    pub session_timeout_secs: u64,
    pub modal_timeout_secs: u64,
    pub repository_url: String,
    pub about_image: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_courts: COURT_ROW_LIMIT,
            session_timeout_secs: 60 * 60 * 24,
            modal_timeout_secs: 60 * 5,
            repository_url: "https://github.com/CalebLehman/pickle-bot".to_string(),
            about_image: PathBuf::from("picklebot.jpg"),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or the defaults if the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|err| match err {
                ConfigError::Parse { source, .. } => ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_courts == 0 || self.max_courts > COURT_ROW_LIMIT {
            return Err(ConfigError::InvalidSetting {
                name: "max_courts",
                reason: format!("must be between 1 and {COURT_ROW_LIMIT}"),
            });
        }
        if self.session_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "session_timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        if self.modal_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "modal_timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    /// How long an opened Edit dialog waits for a submission
    pub fn modal_timeout(&self) -> Duration {
        Duration::from_secs(self.modal_timeout_secs)
    }
}
