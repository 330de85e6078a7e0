//! # configs
//!
//! Layered runtime configuration for Rusty-Posts.
//!
//! Sources, lowest to highest precedence:
//! 1. built-in defaults
//! 2. `<config_dir>/default.toml` (optional)
//! 3. `<config_dir>/local.toml` (optional, not checked in)
//! 4. environment variables, e.g. `RUSTY_POSTS__SERVER__PORT=9000`
//!
//! Call [`load_dotenv`] before [`Settings::load`] so a `.env` file in the
//! working directory can feed the environment layer.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

/// Prefix for environment overrides. Nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "RUSTY_POSTS";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single request, store round trips included
    pub request_timeout_secs: u64,
    /// How long in-flight requests get after a shutdown signal
    pub shutdown_grace_secs: u64,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// May carry credentials, hence secret
    pub url: SecretString,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    /// 0 disables
    pub idle_timeout_secs: u64,
    /// 0 disables
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    pub format: LogFormat,
}

/// Loads `.env` from the working directory (or a parent) into the process
/// environment. A missing file is fine; an unreadable one is returned so the
/// caller can report it once logging is up.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    missing_is_ok(dotenvy::dotenv().map(drop))
}

/// Same as [`load_dotenv`] for an explicit file.
pub fn load_dotenv_from(path: impl AsRef<Path>) -> Result<(), dotenvy::Error> {
    missing_is_ok(dotenvy::from_path(path))
}

fn missing_is_ok(loaded: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match loaded {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}

impl Settings {
    /// Every layer from `./config` plus the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        Self::from_sources("config", None)
    }

    /// Builds settings from `config_dir` and either the real environment
    /// (`env = None`) or the given variable map.
    pub fn from_sources(
        config_dir: &str,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("server.request_timeout_secs", 2_i64)?
            .set_default("server.shutdown_grace_secs", 10_i64)?
            .set_default("database.url", "sqlite://rusty_posts.db?mode=rwc")?
            .set_default("database.max_connections", 10_i64)?
            .set_default("database.min_connections", 5_i64)?
            .set_default("database.acquire_timeout_secs", 5_i64)?
            .set_default("database.idle_timeout_secs", 600_i64)?
            .set_default("database.max_lifetime_secs", 3600_i64)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(File::with_name(&format!("{config_dir}/local")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port must be non-zero".into()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(SettingsError::Invalid("server.request_timeout_secs must be at least 1".into()));
        }
        if self.server.shutdown_grace_secs == 0 {
            return Err(SettingsError::Invalid("server.shutdown_grace_secs must be at least 1".into()));
        }
        if self.database.acquire_timeout_secs == 0 {
            return Err(SettingsError::Invalid("database.acquire_timeout_secs must be at least 1".into()));
        }
        if self.database.max_connections == 0 {
            return Err(SettingsError::Invalid("database.max_connections must be at least 1".into()));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(SettingsError::Invalid(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        Ok(())
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        non_zero_secs(self.max_lifetime_secs)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
