// Fan-out aggregation: resolve a fresh snapshot, fetch every node concurrently, merge.
// Failures are absorbed per node (health -> DOWN/UNKNOWN, info -> omitted); a catalog
// failure degrades to an empty composite.

mod merger;

pub use merger::{Outcome, ResultMerger};

use futures_util::future::join_all;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::discovery::Discovery;
use crate::endpoint::endpoint_url;
use crate::models::{Composite, FetchKind, NodeDescriptor};

pub struct Aggregator {
    discovery: Arc<dyn Discovery>,
    client: Client,
}

impl Aggregator {
    /// `timeout` bounds every per-node call.
    pub fn new(discovery: Arc<dyn Discovery>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(discovery, client))
    }

    pub fn with_client(discovery: Arc<dyn Discovery>, client: Client) -> Self {
        Self { discovery, client }
    }

    pub async fn aggregate_info(&self) -> Composite {
        self.aggregate(FetchKind::Info).await
    }

    pub async fn aggregate_health(&self) -> Composite {
        self.aggregate(FetchKind::Health).await
    }

    #[instrument(skip(self), fields(backend = self.discovery.backend()))]
    pub async fn aggregate(&self, kind: FetchKind) -> Composite {
        let snapshot = match self.discovery.resolve().await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "discovery failed; returning empty composite");
                return Composite::new();
            }
        };
        let nodes = snapshot.len();

        let merger = Arc::new(ResultMerger::new());
        let (names, workers): (Vec<String>, Vec<_>) = snapshot
            .into_iter()
            .map(|(name, node)| {
                let client = self.client.clone();
                let merger = merger.clone();
                let key = name.clone();
                let worker = tokio::spawn(async move {
                    let outcome = fetch(&client, &node, kind).await;
                    merger.record(key, outcome);
                });
                (name, worker)
            })
            .unzip();

        for (name, joined) in names.into_iter().zip(join_all(workers).await) {
            if let Err(e) = joined {
                warn!(service = %name, error = %e, "worker did not finish");
                if !merger.contains(&name) {
                    merger.record(name, Outcome::failed(kind));
                }
            }
        }

        let composite = merger.take();
        debug!(nodes, reported = composite.len(), "aggregation complete");
        composite
    }
}

/// One network call for one node, folded into an outcome.
pub async fn fetch(client: &Client, node: &NodeDescriptor, kind: FetchKind) -> Outcome {
    let Some(url) = endpoint_url(node, kind) else {
        debug!(service = %node.name, base = %node.base_address, %kind, "no resolvable endpoint");
        return match kind {
            FetchKind::Health => Outcome::Unknown,
            FetchKind::Info => Outcome::Omitted,
        };
    };

    match (kind, get_json(client, url.clone()).await) {
        (FetchKind::Health, Ok(body)) if body.is_object() => Outcome::Report(body),
        (FetchKind::Health, Ok(_)) => {
            warn!(service = %node.name, %url, "health response is not a status document");
            Outcome::Down
        }
        (FetchKind::Health, Err(e)) => {
            warn!(service = %node.name, %url, error = %e, "health check failed");
            Outcome::Down
        }
        (FetchKind::Info, Ok(Value::Object(doc))) if !doc.is_empty() => {
            Outcome::Report(Value::Object(doc))
        }
        (FetchKind::Info, Ok(_)) => {
            warn!(service = %node.name, %url, "info response is empty or not an object");
            Outcome::Omitted
        }
        (FetchKind::Info, Err(e)) => {
            warn!(service = %node.name, %url, error = %e, "unable to collect info");
            Outcome::Omitted
        }
    }
}

async fn get_json(client: &Client, url: Url) -> reqwest::Result<Value> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await
}
