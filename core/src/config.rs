//! Request engine configuration.
//!
//! The base URL is resolved once at the edge (binary, FFI host, test) and
//! handed to the engine as a value; nothing in the core reads the
//! environment on its own.
//!
//! | Env var                  | Default                                   |
//! |--------------------------|-------------------------------------------|
//! | `GLUCOVISION_API_URL`    | per environment, see below                |
//! | `GLUCOVISION_ENV`        | `development` in debug builds, else `production` |
//! | `GLUCOVISION_TIMEOUT_MS` | `10000`                                   |

use std::time::Duration;

use thiserror::Error;

pub const API_URL_ENV: &str = "GLUCOVISION_API_URL";
pub const ENVIRONMENT_ENV: &str = "GLUCOVISION_ENV";
pub const TIMEOUT_ENV: &str = "GLUCOVISION_TIMEOUT_MS";

pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:8000";
pub const PRODUCTION_BASE_URL: &str = "https://api.glucovision.app";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid GLUCOVISION_TIMEOUT_MS value '{0}': expected a positive number of milliseconds")]
    InvalidTimeout(String),

    #[error("invalid GLUCOVISION_ENV value '{0}': expected 'development' or 'production'")]
    InvalidEnvironment(String),
}

/// Which hardcoded default applies when no override is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Default for the current build profile.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(value.to_string())),
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Layered resolution: a non-blank override, else the environment's
    /// hardcoded default.
    pub fn resolve(override_url: Option<&str>, environment: Environment) -> Self {
        match override_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => Self::new(url),
            None => Self::new(environment.default_base_url()),
        }
    }

    /// Resolve from process environment variables. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match std::env::var(ENVIRONMENT_ENV) {
            Ok(value) => Environment::parse(&value)?,
            Err(_) => Environment::current(),
        };
        let override_url = std::env::var(API_URL_ENV).ok();
        let mut config = Self::resolve(override_url.as_deref(), environment);
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            config.timeout = parse_timeout(&raw)?;
        }
        tracing::debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            "resolved API configuration"
        );
        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
