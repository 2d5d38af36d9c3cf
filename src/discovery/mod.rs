// Discovery backends. Each one turns its catalog into a fresh snapshot of
// logical service name -> NodeDescriptor on every call.

mod docker;
mod file;
mod kubernetes;
mod traefik;

pub use docker::{DEFAULT_LABEL_SELECTOR, DockerDiscovery};
pub use file::FileDiscovery;
pub use kubernetes::{DEFAULT_CLUSTER_DOMAIN, DEFAULT_KUBERNETES_SELECTOR, KubernetesDiscovery};
pub use traefik::{TraefikDiscovery, TraefikMode};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DiscoveryConfig;
use crate::models::NodeDescriptor;

/// Point-in-time view of the fleet, keyed by logical service name.
pub type Snapshot = HashMap<String, NodeDescriptor>;

/// The catalog itself could not be read. Broken individual entries never end up here;
/// backends drop them from the snapshot instead.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("docker API error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("kubernetes API error: {0}")]
    Kubernetes(#[from] kube::Error),

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("catalog did not answer within {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Discovery: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Reads the catalog and returns one representative node per logical service.
    async fn resolve(&self) -> Result<Snapshot, DiscoveryError>;
}

/// Builds the backend selected in config. Fails when the backend cannot be set up at all
/// (unreadable services file, no Docker socket, no cluster config, bad HTTP client settings).
pub async fn connect(config: &DiscoveryConfig) -> anyhow::Result<Arc<dyn Discovery>> {
    let discovery: Arc<dyn Discovery> = match config {
        DiscoveryConfig::File { path } => Arc::new(FileDiscovery::load(path)?),
        DiscoveryConfig::Docker {
            label_selector,
            timeout_ms,
        } => Arc::new(DockerDiscovery::connect(
            label_selector.clone(),
            Duration::from_millis(*timeout_ms),
        )?),
        DiscoveryConfig::Kubernetes {
            label_selector,
            namespace,
            cluster_domain,
            timeout_ms,
        } => Arc::new(
            KubernetesDiscovery::connect(
                label_selector.clone(),
                namespace.clone(),
                cluster_domain.clone(),
                Duration::from_millis(*timeout_ms),
            )
            .await?,
        ),
        DiscoveryConfig::Traefik {
            url,
            mode,
            timeout_ms,
        } => Arc::new(TraefikDiscovery::new(
            url.clone(),
            *mode,
            Duration::from_millis(*timeout_ms),
        )?),
    };
    tracing::info!(backend = discovery.backend(), "discovery backend ready");
    Ok(discovery)
}
