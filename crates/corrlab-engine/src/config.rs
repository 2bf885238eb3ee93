/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed engine configuration with tuned defaults
[POS]:    Configuration layer - engine setup
[UPDATE]: When adding new configuration options
*/

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result-readiness protocol spoken by the analysis service.
///
/// Both observed server variants are supported; pick per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultProtocol {
    /// Poll the status endpoint; fetch the result once a terminal
    /// "completed" status is observed.
    #[default]
    StatusThenResult,
    /// Poll the result endpoint directly; 202 means keep polling.
    ResultPolling,
}

/// Engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Base URL of the analysis service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Delay between status polls in milliseconds.
    /// Tuning constant, not a correctness invariant.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay between liveness probes in milliseconds
    #[serde(default = "default_health_interval_ms")]
    pub health_interval_ms: u64,
    /// Debounce window for search-as-you-type in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum hits per search lookup
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Result-readiness protocol variant
    #[serde(default)]
    pub protocol: ResultProtocol,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            health_interval_ms: default_health_interval_ms(),
            debounce_ms: default_debounce_ms(),
            search_limit: default_search_limit(),
            protocol: ResultProtocol::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1500
}

fn default_health_interval_ms() -> u64 {
    5000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_search_limit() -> u32 {
    30
}

impl EngineConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
