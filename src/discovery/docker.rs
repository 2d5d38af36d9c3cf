// Container discovery via bollard: running containers carrying the selector label.
// Labels on the container describe the logical service and its endpoints.

use async_trait::async_trait;
use bollard::Docker;
use bollard::models::ContainerSummary;
use bollard::query_parameters::ListContainersOptions;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{Discovery, DiscoveryError, Snapshot};
use crate::models::NodeDescriptor;

pub const DEFAULT_LABEL_SELECTOR: &str = "service-index=true";

const SERVICE_LABEL: &str = "service";
const INFO_LABEL: &str = "infoEndpoint";
const HEALTH_LABEL: &str = "healthEndpoint";
const PORT_LABEL: &str = "port";

pub struct DockerDiscovery {
    docker: Docker,
    label_selector: String,
    timeout: Duration,
}

impl DockerDiscovery {
    pub fn connect(label_selector: String, timeout: Duration) -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self {
            docker,
            label_selector,
            timeout,
        })
    }
}

#[async_trait]
impl Discovery for DockerDiscovery {
    fn backend(&self) -> &'static str {
        "docker"
    }

    #[instrument(skip(self), fields(backend = "docker", label = %self.label_selector))]
    async fn resolve(&self) -> Result<Snapshot, DiscoveryError> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);
        filters.insert("label".to_string(), vec![self.label_selector.clone()]);

        let options = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };

        let containers =
            tokio::time::timeout(self.timeout, self.docker.list_containers(Some(options)))
                .await
                .map_err(|_| DiscoveryError::Timeout(self.timeout))??;
        debug!(containers = containers.len(), "listed labelled containers");

        let candidates = containers
            .iter()
            .filter_map(Candidate::from_summary)
            .collect();
        Ok(pick_representatives(candidates))
    }
}

/// One running container that claims to implement a logical service.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    service: String,
    container: String,
    address: Option<String>,
    info_path: Option<String>,
    health_path: Option<String>,
}

impl Candidate {
    fn from_summary(c: &ContainerSummary) -> Option<Self> {
        let labels = c.labels.as_ref()?;
        let service = labels
            .get(SERVICE_LABEL)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())?
            .to_string();

        let container = c
            .names
            .as_ref()
            .and_then(|n| n.first())
            .map(|n| n.trim_start_matches('/').to_string())
            .or_else(|| c.id.clone())
            .unwrap_or_default();

        // Networks come back as a HashMap; sort by network name so the pick is stable.
        let ip = c
            .network_settings
            .as_ref()
            .and_then(|ns| ns.networks.as_ref())
            .and_then(|networks| {
                let sorted: BTreeMap<&String, _> = networks.iter().collect();
                sorted
                    .into_values()
                    .filter_map(|ep| ep.ip_address.as_deref())
                    .find(|ip| !ip.is_empty())
                    .map(str::to_string)
            });

        let port = match labels.get(PORT_LABEL) {
            Some(p) => match p.trim().parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    warn!(container = %container, port = %p, "invalid port label; container has no address");
                    None
                }
            },
            None => c
                .ports
                .as_ref()
                .and_then(|ports| ports.iter().map(|p| p.private_port).min()),
        };

        let address = match (ip, port) {
            (Some(ip), Some(port)) => Some(format!("http://{ip}:{port}")),
            _ => None,
        };

        Some(Self {
            service,
            container,
            address,
            info_path: labels.get(INFO_LABEL).cloned(),
            health_path: labels.get(HEALTH_LABEL).cloned(),
        })
    }
}

/// Keeps one container per logical service: the first, by container name, that has an
/// address.
fn pick_representatives(mut candidates: Vec<Candidate>) -> Snapshot {
    candidates.sort_by(|a, b| {
        a.service
            .cmp(&b.service)
            .then_with(|| a.container.cmp(&b.container))
    });

    let mut snapshot = Snapshot::new();
    for c in candidates {
        if snapshot.contains_key(&c.service) {
            continue;
        }
        let Some(address) = c.address else {
            debug!(service = %c.service, container = %c.container, "container has no reachable address");
            continue;
        };
        let node = NodeDescriptor {
            name: c.service.clone(),
            base_address: address,
            info_path: c.info_path,
            health_path: c.health_path,
        };
        snapshot.insert(c.service, node);
    }
    snapshot
}
