// src/config/mod.rs
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub health: HealthConfig,
    pub metrics: MetricsConfig,
    pub checks: Vec<ProbeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub status_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            status_path: "/status".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub default_timeout_secs: u64,
    pub max_wait_secs: Option<u64>,
    pub min_refresh_interval_ms: Option<u64>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 10,
            max_wait_secs: None,
            min_refresh_interval_ms: None,
        }
    }
}

impl HealthConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }

    pub fn min_refresh_interval(&self) -> Option<Duration> {
        self.min_refresh_interval_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
            path: "/metrics".to_string(),
        }
    }
}

/// Declarative probes materialized into registered checks at startup.
/// Custom closures are registered through the library API instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeConfig {
    Http {
        name: String,
        url: Url,
        #[serde(default)]
        timeout_secs: Option<u64>,
        #[serde(default)]
        skip_on_err: bool,
    },
    Tcp {
        name: String,
        addr: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
        #[serde(default)]
        skip_on_err: bool,
    },
}

impl ProbeConfig {
    pub fn name(&self) -> &str {
        match self {
            ProbeConfig::Http { name, .. } | ProbeConfig::Tcp { name, .. } => name,
        }
    }
}

impl Config {
    /// Load from a YAML or JSON file, picked by extension.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config: Config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&contents).context("failed to parse YAML config")?
            }
            _ => serde_json::from_str(&contents).context("failed to parse JSON config")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.health.default_timeout_secs == 0 {
            bail!("health.default_timeout_secs must be greater than zero");
        }
        if !self.server.status_path.starts_with('/') {
            bail!("server.status_path must start with '/'");
        }
        if self.metrics.enabled && !self.metrics.path.starts_with('/') {
            bail!("metrics.path must start with '/'");
        }
        for probe in &self.checks {
            if probe.name().is_empty() {
                bail!("every configured check needs a non-empty name");
            }
        }
        Ok(())
    }
}
