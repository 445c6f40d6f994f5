//! Provider configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, SearchError};

/// Known provider kinds that can be built from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Apple Podcasts search API.
    Itunes,
}

/// Configuration for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Which provider to construct.
    pub kind: ProviderKind,
    /// Ranking weight (0 disables).
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Whether the provider participates at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_weight() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

fn default_timeout() -> u64 {
    10
}

impl ProviderConfig {
    /// Creates a provider config with default weight and timeout.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            weight: default_weight(),
            enabled: default_enabled(),
            timeout: default_timeout(),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Weight the registry should use; disabled providers get zero.
    pub fn effective_weight(&self) -> f64 {
        if self.enabled {
            self.weight.max(0.0)
        } else {
            0.0
        }
    }
}

/// Configuration for the provider registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Providers in registration order.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![ProviderConfig::new(ProviderKind::Itunes)]
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
        }
    }
}

impl RegistryConfig {
    /// Parses a registry configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SearchError::Config(e.to_string()))
    }

    /// Timeout of the first provider of `kind`, or the default timeout
    /// when none is configured.
    pub fn timeout_for(&self, kind: ProviderKind) -> Duration {
        self.providers
            .iter()
            .find(|provider| provider.kind == kind)
            .map(ProviderConfig::timeout_duration)
            .unwrap_or_else(|| Duration::from_secs(default_timeout()))
    }

    /// Reads a registry configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }
}
