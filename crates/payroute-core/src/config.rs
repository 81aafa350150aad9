//! Resolver configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::chain::{default_chains, ChainProfile, ChainRegistry};
use crate::error::CoreError;

/// Full configuration for a route resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Drip scheduling settings.
    #[serde(default)]
    pub drip: DripConfig,

    /// Route ranking settings.
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Known chains.
    #[serde(default = "default_chains")]
    pub chains: Vec<ChainProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DripConfig {
    /// Time after resolution start from which assets are dripped regardless of
    /// priority order, in milliseconds.
    #[serde(default = "default_threshold_ms")]
    pub threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RankingConfig {
    /// Break ties on the direct-transfer ratio by approval count, then by
    /// native-currency input.
    #[serde(default)]
    pub extended_tie_breakers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_threshold_ms() -> u64 {
    3000
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for DripConfig {
    fn default() -> Self {
        Self {
            threshold_ms: default_threshold_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            drip: DripConfig::default(),
            ranking: RankingConfig::default(),
            logging: LoggingConfig::default(),
            chains: default_chains(),
        }
    }
}

impl ResolverConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: ResolverConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn drip_threshold(&self) -> Duration {
        Duration::from_millis(self.drip.threshold_ms)
    }

    /// Build the chain registry, validating every profile.
    pub fn registry(&self) -> Result<ChainRegistry, CoreError> {
        ChainRegistry::new(self.chains.iter().cloned())
    }
}
