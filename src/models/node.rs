// One reachable service instance as reported by a discovery backend.

use super::FetchKind;

pub const DEFAULT_INFO_PATH: &str = "/info";
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// Where a logical service can be reached and which paths it serves info/health on.
/// Built fresh on every discovery call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub name: String,
    /// `host:port` or an absolute URL (may carry a path prefix).
    pub base_address: String,
    pub info_path: Option<String>,
    pub health_path: Option<String>,
}

impl NodeDescriptor {
    pub fn new(name: impl Into<String>, base_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_address: base_address.into(),
            info_path: None,
            health_path: None,
        }
    }

    pub fn with_info_path(mut self, path: impl Into<String>) -> Self {
        self.info_path = Some(path.into());
        self
    }

    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = Some(path.into());
        self
    }

    /// Path for `kind`; absent or empty overrides fall back to `/info` and `/health`.
    pub fn path(&self, kind: FetchKind) -> &str {
        let configured = match kind {
            FetchKind::Info => self.info_path.as_deref(),
            FetchKind::Health => self.health_path.as_deref(),
        };
        configured
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| kind.default_path())
    }
}
