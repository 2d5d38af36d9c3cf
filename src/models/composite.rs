// Fetch kinds and the merged composite document returned by the aggregator.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::{DEFAULT_HEALTH_PATH, DEFAULT_INFO_PATH};

/// Logical service name -> the instance's own document (or a synthesized status).
pub type Composite = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Info,
    Health,
}

impl FetchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchKind::Info => "info",
            FetchKind::Health => "health",
        }
    }

    pub fn default_path(self) -> &'static str {
        match self {
            FetchKind::Info => DEFAULT_INFO_PATH,
            FetchKind::Health => DEFAULT_HEALTH_PATH,
        }
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
    Unknown,
}

impl Status {
    /// `{"status": "<STATUS>"}`
    pub fn document(self) -> Value {
        serde_json::json!({ "status": self })
    }
}
