use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Shell configuration, persisted as shell.toml.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    #[serde(default)]
    pub results: ResultsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ttl: TtlConfig,
}

impl ShellConfig {
    /// Returns the config file path within the given data directory.
    pub fn path(data_dir: &Path) -> std::path::PathBuf {
        data_dir.join("shell.toml")
    }

    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        let config = toml::from_str(&content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Saves config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::from)?;
        std::fs::write(path, content).map_err(ConfigError::from)?;
        Ok(())
    }

    /// Validates config values and returns list of validation errors.
    /// Returns empty vec if config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.results.max_categories == 0 {
            errors.push("max_categories must be at least 1".to_string());
        }

        if self.ttl.small_ms == 0 || self.ttl.medium_ms == 0 || self.ttl.large_ms == 0 {
            errors.push("ttl values must be at least 1".to_string());
        }

        if self.ttl.small_ms > self.ttl.medium_ms || self.ttl.medium_ms > self.ttl.large_ms {
            errors.push("ttl values must satisfy small <= medium <= large".to_string());
        }

        errors
    }

    /// Returns a validated config, replacing invalid values with defaults.
    pub fn with_defaults_for_invalid(&self) -> Self {
        let defaults = Self::default();
        let ttl_valid = self.ttl.small_ms > 0
            && self.ttl.small_ms <= self.ttl.medium_ms
            && self.ttl.medium_ms <= self.ttl.large_ms;
        Self {
            results: ResultsConfig {
                aggregation_window_ms: self.results.aggregation_window_ms,
                incremental_diff: self.results.incremental_diff,
                max_categories: if self.results.max_categories == 0 {
                    defaults.results.max_categories
                } else {
                    self.results.max_categories
                },
            },
            search: self.search.clone(),
            ttl: if ttl_valid {
                self.ttl.clone()
            } else {
                defaults.ttl
            },
        }
    }
}

/// Result aggregation and diffing settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultsConfig {
    #[serde(default = "default_aggregation_window_ms")]
    pub aggregation_window_ms: u64,
    #[serde(default = "default_true")]
    pub incremental_diff: bool,
    #[serde(default = "default_max_categories")]
    pub max_categories: usize,
}

impl ResultsConfig {
    pub fn aggregation_window(&self) -> Duration {
        Duration::from_millis(self.aggregation_window_ms)
    }
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            aggregation_window_ms: default_aggregation_window_ms(),
            incremental_diff: true,
            max_categories: default_max_categories(),
        }
    }
}

/// Settings forwarded to the backend with each search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub remote_content_search: bool,
    #[serde(default)]
    pub form_factor: FormFactor,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            remote_content_search: true,
            form_factor: FormFactor::default(),
        }
    }
}

/// Device form factor hint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFactor {
    #[default]
    Phone,
    Tablet,
    Desktop,
}

impl fmt::Display for FormFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormFactor::Phone => write!(f, "phone"),
            FormFactor::Tablet => write!(f, "tablet"),
            FormFactor::Desktop => write!(f, "desktop"),
        }
    }
}

/// Results time-to-live buckets; results older than the scope's bucket are marked dirty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlConfig {
    #[serde(default = "default_small_ttl_ms")]
    pub small_ms: u64,
    #[serde(default = "default_medium_ttl_ms")]
    pub medium_ms: u64,
    #[serde(default = "default_large_ttl_ms")]
    pub large_ms: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            small_ms: default_small_ttl_ms(),
            medium_ms: default_medium_ttl_ms(),
            large_ms: default_large_ttl_ms(),
        }
    }
}

fn default_aggregation_window_ms() -> u64 {
    100
}

fn default_max_categories() -> usize {
    32
}

fn default_small_ttl_ms() -> u64 {
    30_000
}

fn default_medium_ttl_ms() -> u64 {
    300_000
}

fn default_large_ttl_ms() -> u64 {
    3_600_000
}

fn default_true() -> bool {
    true
}
