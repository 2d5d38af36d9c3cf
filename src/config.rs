use serde::Deserialize;
use std::time::Duration;

use crate::discovery::{
    DEFAULT_CLUSTER_DOMAIN, DEFAULT_KUBERNETES_SELECTOR, DEFAULT_LABEL_SELECTOR, TraefikMode,
};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// Client-side timeout applied to every info/health call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AggregatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Where the fleet comes from. Selected by
/// `backend = "file" | "docker" | "kubernetes" | "traefik"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum DiscoveryConfig {
    File {
        path: String,
    },
    Docker {
        #[serde(default = "default_label_selector")]
        label_selector: String,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
    Kubernetes {
        #[serde(default = "default_kubernetes_selector")]
        label_selector: String,
        /// Defaults to the client's namespace (the pod's service account namespace).
        #[serde(default)]
        namespace: Option<String>,
        #[serde(default = "default_cluster_domain")]
        cluster_domain: String,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
    Traefik {
        url: String,
        #[serde(default)]
        mode: TraefikMode,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_label_selector() -> String {
    DEFAULT_LABEL_SELECTOR.to_string()
}

fn default_kubernetes_selector() -> String {
    DEFAULT_KUBERNETES_SELECTOR.to_string()
}

fn default_cluster_domain() -> String {
    DEFAULT_CLUSTER_DOMAIN.to_string()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            self.aggregator.timeout_ms > 0,
            "aggregator.timeout_ms must be > 0, got {}",
            self.aggregator.timeout_ms
        );
        match &self.discovery {
            DiscoveryConfig::File { path } => {
                anyhow::ensure!(!path.is_empty(), "discovery.path must be non-empty");
            }
            DiscoveryConfig::Docker {
                label_selector,
                timeout_ms,
            } => {
                anyhow::ensure!(
                    !label_selector.is_empty(),
                    "discovery.label_selector must be non-empty"
                );
                anyhow::ensure!(
                    *timeout_ms > 0,
                    "discovery.timeout_ms must be > 0, got {}",
                    timeout_ms
                );
            }
            DiscoveryConfig::Kubernetes {
                label_selector,
                namespace,
                cluster_domain,
                timeout_ms,
            } => {
                anyhow::ensure!(
                    !label_selector.is_empty(),
                    "discovery.label_selector must be non-empty"
                );
                anyhow::ensure!(
                    namespace.as_deref().is_none_or(|ns| !ns.trim().is_empty()),
                    "discovery.namespace must be non-empty when set"
                );
                anyhow::ensure!(
                    !cluster_domain.trim().is_empty(),
                    "discovery.cluster_domain must be non-empty"
                );
                anyhow::ensure!(
                    *timeout_ms > 0,
                    "discovery.timeout_ms must be > 0, got {}",
                    timeout_ms
                );
            }
            DiscoveryConfig::Traefik {
                url, timeout_ms, ..
            } => {
                anyhow::ensure!(!url.is_empty(), "discovery.url must be non-empty");
                anyhow::ensure!(
                    url.starts_with("http://") || url.starts_with("https://"),
                    "discovery.url must be an http(s) URL, got {}",
                    url
                );
                anyhow::ensure!(
                    *timeout_ms > 0,
                    "discovery.timeout_ms must be > 0, got {}",
                    timeout_ms
                );
            }
        }
        Ok(())
    }
}
