//! Launch ingester configuration.
//!
//! Read once from the environment at startup (after `.env` is applied)
//! and passed by reference to whatever needs it.

use std::env;
use std::path::PathBuf;

/// Startup configuration errors. Any of these stops the process before ingestion.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Launch ingester configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The SQLite file holding `raw_launches` and `launch_aggregates`.
    pub database_path: PathBuf,

    /// The launches query endpoint, e.g. `https://api.spacexdata.com/v4/launches/query`.
    pub api_url: String,
}

impl Config {
    /// Load config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load config through an arbitrary variable lookup.
    ///
    /// Empty values count as missing. Every missing name is reported, not just the first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut get = |name: &'static str| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let database_path = get("DATABASE_PATH");
        let api_url = get("API_URL");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        Ok(Self {
            database_path: PathBuf::from(database_path),
            api_url,
        })
    }
}
