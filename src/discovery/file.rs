// Static services file: a JSON object of name -> { url, infoPath?, healthPath? }.
// Read once at start-up; every resolve hands out a copy.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::{Discovery, DiscoveryError, Snapshot};
use crate::models::NodeDescriptor;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileEntry {
    #[serde(default)]
    url: String,
    #[serde(default)]
    info_path: Option<String>,
    #[serde(default)]
    health_path: Option<String>,
}

pub struct FileDiscovery {
    services: Snapshot,
}

impl FileDiscovery {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("services file {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse the services JSON. Entries without a URL are skipped.
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let entries: HashMap<String, FileEntry> = serde_json::from_str(s)?;
        let nodes = entries.into_iter().filter_map(|(name, entry)| {
            if entry.url.trim().is_empty() {
                tracing::warn!(service = %name, "services file entry has no url; skipping");
                return None;
            }
            Some(NodeDescriptor {
                name,
                base_address: entry.url,
                info_path: entry.info_path,
                health_path: entry.health_path,
            })
        });
        let discovery = Self::from_nodes(nodes);

        if discovery.services.is_empty() {
            tracing::error!("services file does not list any service");
        }
        for node in discovery.services.values() {
            tracing::info!(service = %node.name, url = %node.base_address, "loaded service");
        }
        Ok(discovery)
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeDescriptor>) -> Self {
        let services = nodes
            .into_iter()
            .map(|node| (node.name.clone(), node))
            .collect();
        Self { services }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[async_trait]
impl Discovery for FileDiscovery {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn resolve(&self) -> Result<Snapshot, DiscoveryError> {
        Ok(self.services.clone())
    }
}
