//! Client configuration.
//!
//! # Responsibility
//! - Resolve DocService location, timeouts, storage and logging settings.
//!
//! # Invariants
//! - `api_url` is non-empty and has no trailing `/`.
//! - `request_timeout` is strictly positive.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

const ENV_API_URL: &str = "DRAFTDECK_API_URL";
const ENV_TIMEOUT_SECS: &str = "DRAFTDECK_TIMEOUT_SECS";
const ENV_DATA_DIR: &str = "DRAFTDECK_DATA_DIR";
const ENV_LOG_LEVEL: &str = "DRAFTDECK_LOG_LEVEL";
const ENV_REFINE_POLICY: &str = "DRAFTDECK_REFINE_POLICY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const APP_DIR_NAME: &str = "draftdeck";
const TOKEN_DB_FILE_NAME: &str = "session.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for ConfigError {}

/// What happens when a section is refined while an earlier refine of the
/// same section is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSectionPolicy {
    /// Both requests run; the response that completes last is kept.
    #[default]
    Race,
    /// The second request is rejected locally with `SectionBusy`.
    Exclusive,
}

impl std::str::FromStr for SameSectionPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "race" => Ok(Self::Race),
            "exclusive" => Ok(Self::Exclusive),
            other => Err(ConfigError(format!(
                "{ENV_REFINE_POLICY} must be `race` or `exclusive`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
    pub log_level: String,
    pub same_section_policy: SameSectionPolicy,
}

impl ClientConfig {
    /// Config for `api_url` with defaults for everything else.
    pub fn new(api_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(&api_url.into())?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: data_dir.into(),
            log_level: crate::logging::default_log_level().to_string(),
            same_section_policy: SameSectionPolicy::default(),
        })
    }

    /// Reads `DRAFTDECK_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves config through `lookup`, which returns a variable's raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_url = read(ENV_API_URL)
            .ok_or_else(|| ConfigError(format!("{ENV_API_URL} is not set")))?;

        let data_dir = match read(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let mut config = Self::new(api_url, data_dir)?;

        if let Some(raw) = read(ENV_TIMEOUT_SECS) {
            let secs = raw.parse::<u64>().ok().filter(|secs| *secs > 0).ok_or_else(|| {
                ConfigError(format!(
                    "{ENV_TIMEOUT_SECS} must be a positive integer, got `{raw}`"
                ))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(policy) = read(ENV_REFINE_POLICY) {
            config.same_section_policy = policy.parse()?;
        }
        Ok(config)
    }

    /// SQLite file that holds the persisted token.
    pub fn token_db_path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Absolute URL for a DocService path such as `/projects`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError(format!("{ENV_API_URL} must not be empty")));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError(format!(
            "{ENV_API_URL} must start with http:// or https://, got `{trimmed}`"
        )));
    }
    Ok(trimmed.to_string())
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| {
            ConfigError(format!(
                "no platform data directory found; set {ENV_DATA_DIR}"
            ))
        })
}
