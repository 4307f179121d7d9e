//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing or a
//! numeric knob does not parse.

use std::path::PathBuf;

use crate::engine::QueueSettings;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub queue_capacity: usize,
    pub minutes_per_ticket: u32,
    /// Extra program names merged over the built-in catalog.
    pub program_catalog: Option<PathBuf>,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    /// In production, systemd EnvironmentFile provides the vars.
    pub fn from_env() -> Result<Self> {
        let defaults = QueueSettings::default();
        let queue_capacity = parsed_var("QUEUE_CAPACITY", defaults.capacity)?;
        if queue_capacity == 0 {
            return Err(Error::Config("QUEUE_CAPACITY must be at least 1".into()));
        }

        Ok(Self {
            database_path: PathBuf::from(required_var("DATABASE_PATH")?),
            queue_capacity,
            minutes_per_ticket: parsed_var("MINUTES_PER_TICKET", defaults.minutes_per_ticket)?,
            program_catalog: std::env::var("PROGRAM_CATALOG").ok().map(PathBuf::from),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn queue_settings(&self) -> QueueSettings {
        QueueSettings {
            capacity: self.queue_capacity,
            minutes_per_ticket: self.minutes_per_ticket,
        }
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}

fn parsed_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{name}={raw:?} is not valid: {e}"))),
        Err(_) => Ok(default),
    }
}
