// Reverse-proxy discovery: reads Traefik's runtime API and takes the first server of every
// backend/service as its representative.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{Discovery, DiscoveryError, Snapshot};
use crate::models::NodeDescriptor;

const V1_LOCAL_PROVIDERS_PATH: &str = "/api/providers";
const V1_DOCKER_PROVIDER_PATH: &str = "/api/providers/docker";
const V2_SERVICES_PATH: &str = "/api/http/services";
const V2_RAW_DATA_PATH: &str = "/api/rawdata";

/// Which Traefik API flavour to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TraefikMode {
    /// Traefik 1.x with the Docker provider; backends are named `backend-<service>`.
    #[serde(rename = "v1-docker")]
    V1Docker,
    /// Traefik 1.x with the file provider.
    #[serde(rename = "v1-file")]
    V1File,
    /// Traefik 2.x services; names carry an `@provider` suffix.
    #[default]
    #[serde(rename = "v2")]
    V2,
    /// Traefik 2.x services routed by path; the router's path is appended to the address.
    #[serde(rename = "v2-path-prefix")]
    V2PathPrefix,
}

impl TraefikMode {
    fn api_path(self) -> &'static str {
        match self {
            TraefikMode::V1Docker => V1_DOCKER_PROVIDER_PATH,
            TraefikMode::V1File => V1_LOCAL_PROVIDERS_PATH,
            TraefikMode::V2 => V2_SERVICES_PATH,
            TraefikMode::V2PathPrefix => V2_RAW_DATA_PATH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Provider {
    #[serde(default)]
    backends: HashMap<String, Backend>,
}

#[derive(Debug, Default, Deserialize)]
struct LocalProviders {
    #[serde(default)]
    file: Provider,
}

#[derive(Debug, Default, Deserialize)]
struct Backend {
    // Sorted so the "first" server is the same on every call.
    #[serde(default)]
    servers: BTreeMap<String, Server>,
}

#[derive(Debug, Deserialize)]
struct Server {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceRepresentation {
    name: String,
    #[serde(default)]
    load_balancer: Option<LoadBalancer>,
}

#[derive(Debug, Default, Deserialize)]
struct LoadBalancer {
    #[serde(default)]
    servers: Vec<Server>,
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    #[serde(default)]
    routers: HashMap<String, Router>,
    #[serde(default)]
    services: HashMap<String, ServiceInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct Router {
    #[serde(default)]
    rule: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceInfo {
    #[serde(default)]
    load_balancer: Option<LoadBalancer>,
}

pub struct TraefikDiscovery {
    client: reqwest::Client,
    url: String,
    mode: TraefikMode,
}

impl TraefikDiscovery {
    pub fn new(url: String, mode: TraefikMode, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            mode,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DiscoveryError> {
        let url = format!("{}{}", self.url, path);
        let rs = self.client.get(&url).send().await?;
        let status = rs.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status { url, status });
        }
        Ok(rs.json::<T>().await?)
    }
}

#[async_trait]
impl Discovery for TraefikDiscovery {
    fn backend(&self) -> &'static str {
        "traefik"
    }

    #[instrument(skip(self), fields(backend = "traefik", mode = ?self.mode))]
    async fn resolve(&self) -> Result<Snapshot, DiscoveryError> {
        let path = self.mode.api_path();
        let snapshot = match self.mode {
            TraefikMode::V1Docker => {
                let provider: Provider = self.get_json(path).await?;
                v1_nodes(provider, true)
            }
            TraefikMode::V1File => {
                let providers: LocalProviders = self.get_json(path).await?;
                v1_nodes(providers.file, false)
            }
            TraefikMode::V2 => {
                let services: Vec<ServiceRepresentation> = self.get_json(path).await?;
                v2_nodes(services)
            }
            TraefikMode::V2PathPrefix => {
                let raw: RawData = self.get_json(path).await?;
                path_prefix_nodes(raw)
            }
        };
        debug!(services = snapshot.len(), "resolved traefik services");
        Ok(snapshot)
    }
}

fn v1_nodes(provider: Provider, strip_backend_prefix: bool) -> Snapshot {
    let mut snapshot = Snapshot::with_capacity(provider.backends.len());
    for (backend_name, backend) in provider.backends {
        let name = if strip_backend_prefix {
            backend_name
                .rsplit_once("backend-")
                .map(|(_, n)| n.to_string())
                .unwrap_or(backend_name)
        } else {
            backend_name
        };
        let Some(url) = backend
            .servers
            .into_values()
            .map(|s| s.url)
            .find(|u| !u.is_empty())
        else {
            debug!(service = %name, "backend has no servers");
            continue;
        };
        snapshot.insert(name.clone(), NodeDescriptor::new(name, url));
    }
    snapshot
}

fn v2_nodes(services: Vec<ServiceRepresentation>) -> Snapshot {
    let mut snapshot = Snapshot::with_capacity(services.len());
    for service in services {
        let Some(url) = first_server(service.load_balancer) else {
            continue;
        };
        let name = strip_provider(&service.name).to_string();
        snapshot.insert(name.clone(), NodeDescriptor::new(name, url));
    }
    snapshot
}

fn path_prefix_nodes(raw: RawData) -> Snapshot {
    let RawData { routers, services } = raw;
    let mut snapshot = Snapshot::with_capacity(services.len());
    for (service_name, info) in services {
        let Some(url) = first_server(info.load_balancer) else {
            continue;
        };
        let Some(prefix) = routers
            .get(&service_name)
            .and_then(|r| parse_rule_path(&r.rule))
        else {
            warn!(service = %service_name, "no path found in router rule; skipping service");
            continue;
        };
        let name = strip_provider(&service_name).to_string();
        let base = format!("{url}{prefix}");
        snapshot.insert(name.clone(), NodeDescriptor::new(name, base));
    }
    snapshot
}

fn first_server(load_balancer: Option<LoadBalancer>) -> Option<String> {
    load_balancer?
        .servers
        .into_iter()
        .next()
        .map(|s| s.url)
        .filter(|u| !u.is_empty())
}

/// `api@docker` -> `api`
fn strip_provider(name: &str) -> &str {
    name.rsplit_once('@').map(|(n, _)| n).unwrap_or(name)
}

static RULE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:PathPrefix|Path)\(\s*[`"]([^`"]*)[`"]\s*\)"#).expect("valid rule regex")
});

/// Extracts the path from a `PathPrefix(`/x`)` or `Path(`/x`)` router rule.
fn parse_rule_path(rule: &str) -> Option<String> {
    RULE_PATH
        .captures(rule)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
