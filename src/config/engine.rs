//! Engine tuning configuration loaded from config.toml
//!
//! This module provides the `[engine]` knobs for the relationship engine: the
//! settle delay applied between a confirmed mutation and the reconciliation
//! re-fetch, and the cap on candidate rows fetched per anchor. A missing file
//! or missing keys fall back to defaults so embedders can run with no
//! configuration at all.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default settle delay before reconciliation, in milliseconds.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 400;
/// Default cap on candidate rows fetched per anchor.
pub const DEFAULT_CANDIDATE_LIMIT: u64 = 50;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Engine tuning knobs
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Tuning knobs for the relationship engine
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// How long to wait after a confirmed add before re-fetching, giving the
    /// store time to settle derived fields
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Maximum number of candidate products fetched per anchor
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }
}

impl EngineConfig {
    /// The settle delay as a [`Duration`].
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

const fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

const fn default_candidate_limit() -> u64 {
    DEFAULT_CANDIDATE_LIMIT
}

/// Loads engine configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads engine configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}
