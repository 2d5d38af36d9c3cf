// Shared test helpers: in-memory discovery, fake instances, unreachable addresses

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use service_index::aggregator::Aggregator;
use service_index::discovery::{Discovery, DiscoveryError, FileDiscovery, Snapshot};
use service_index::models::NodeDescriptor;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Discovery whose catalog is always unreachable.
pub struct FailingDiscovery;

#[async_trait]
impl Discovery for FailingDiscovery {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn resolve(&self) -> Result<Snapshot, DiscoveryError> {
        Err(DiscoveryError::Timeout(Duration::from_secs(1)))
    }
}

pub fn static_discovery(nodes: Vec<NodeDescriptor>) -> Arc<dyn Discovery> {
    Arc::new(FileDiscovery::from_nodes(nodes))
}

pub fn aggregator(nodes: Vec<NodeDescriptor>) -> Aggregator {
    Aggregator::new(static_discovery(nodes), TEST_TIMEOUT).unwrap()
}

pub fn failing_aggregator() -> Aggregator {
    Aggregator::new(Arc::new(FailingDiscovery), TEST_TIMEOUT).unwrap()
}

/// Address of a port nothing listens on (bound, then released).
pub fn unreachable_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Fake instance answering GET `route` with `status` and a JSON body.
pub async fn instance(route: &str, status: u16, body: Value) -> MockServer {
    let server = MockServer::start().await;
    mount(&server, route, status, body).await;
    server
}

pub async fn mount(server: &MockServer, route: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}
