// Kubernetes discovery via kube: Services in one namespace matching the label selector.
// Annotations on the Service describe the logical service and its endpoints; the address is
// the Service's cluster DNS name and first port.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::{Discovery, DiscoveryError, Snapshot};
use crate::models::NodeDescriptor;

pub const DEFAULT_KUBERNETES_SELECTOR: &str = "app=reportportal";
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";

const SERVICE_ANNOTATION: &str = "service";
const INFO_ANNOTATION: &str = "infoEndpoint";
const HEALTH_ANNOTATION: &str = "healthEndpoint";

pub struct KubernetesDiscovery {
    services: Api<Service>,
    label_selector: String,
    /// `<namespace>.svc.<cluster-domain>`
    local_domain: String,
    timeout: Duration,
}

impl KubernetesDiscovery {
    /// Uses the in-cluster config (or the local kubeconfig). Without an explicit namespace
    /// the client's default one is used, which in a pod is the service account's namespace.
    pub async fn connect(
        label_selector: String,
        namespace: Option<String>,
        cluster_domain: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::try_default().await?;
        let namespace = namespace.unwrap_or_else(|| client.default_namespace().to_string());
        info!(%namespace, %cluster_domain, "kubernetes client ready");
        Ok(Self {
            services: Api::namespaced(client, &namespace),
            label_selector,
            local_domain: local_domain(&namespace, &cluster_domain),
            timeout,
        })
    }
}

#[async_trait]
impl Discovery for KubernetesDiscovery {
    fn backend(&self) -> &'static str {
        "kubernetes"
    }

    #[instrument(skip(self), fields(backend = "kubernetes", label = %self.label_selector))]
    async fn resolve(&self) -> Result<Snapshot, DiscoveryError> {
        let params = ListParams::default().labels(&self.label_selector);
        let list = tokio::time::timeout(self.timeout, self.services.list(&params))
            .await
            .map_err(|_| DiscoveryError::Timeout(self.timeout))??;
        debug!(services = list.items.len(), "listed labelled services");
        Ok(snapshot_from_services(&list.items, &self.local_domain))
    }
}

fn local_domain(namespace: &str, cluster_domain: &str) -> String {
    format!(
        "{}.svc.{}",
        namespace.trim(),
        cluster_domain.trim().trim_matches('.')
    )
}

/// Services without a `service` annotation are not part of the index.
fn node_from_service(svc: &Service, local_domain: &str) -> Option<NodeDescriptor> {
    let annotations = svc.annotations();
    let name = annotations
        .get(SERVICE_ANNOTATION)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())?
        .to_string();

    let host = format!("{}.{}", svc.name_any(), local_domain);
    let port = svc
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .and_then(|ports| ports.first())
        .map(|p| p.port);
    let base_address = match port {
        Some(port) => format!("http://{host}:{port}"),
        None => {
            warn!(service = %name, kube_service = %svc.name_any(), "service exposes no port");
            String::new()
        }
    };

    Some(NodeDescriptor {
        name,
        base_address,
        info_path: annotations.get(INFO_ANNOTATION).cloned(),
        health_path: annotations.get(HEALTH_ANNOTATION).cloned(),
    })
}

/// One node per logical name. Services are taken in name order and one with a port
/// replaces an earlier one without.
fn snapshot_from_services(services: &[Service], local_domain: &str) -> Snapshot {
    let mut sorted: Vec<&Service> = services.iter().collect();
    sorted.sort_by_key(|svc| svc.name_any());

    let mut snapshot = Snapshot::with_capacity(sorted.len());
    for node in sorted
        .into_iter()
        .filter_map(|svc| node_from_service(svc, local_domain))
    {
        let keep_existing = snapshot
            .get(&node.name)
            .is_some_and(|existing| !existing.base_address.is_empty());
        if keep_existing {
            debug!(service = %node.name, "duplicate service annotation; keeping first");
            continue;
        }
        snapshot.insert(node.name.clone(), node);
    }
    snapshot
}
