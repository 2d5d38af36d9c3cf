// Shared result map for fan-out workers. The lock is held for a single insert only.

use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{Composite, FetchKind, Status};

/// What one worker contributes to the composite.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The instance's own decoded document.
    Report(Value),
    /// Health call failed; reported as `{"status":"DOWN"}`.
    Down,
    /// No usable health endpoint; reported as `{"status":"UNKNOWN"}`.
    Unknown,
    /// Info call failed or came back empty; the name is left out.
    Omitted,
}

impl Outcome {
    /// Outcome for a worker that could not complete its fetch.
    pub fn failed(kind: FetchKind) -> Self {
        match kind {
            FetchKind::Health => Outcome::Down,
            FetchKind::Info => Outcome::Omitted,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Report(v) => Some(v),
            Outcome::Down => Some(Status::Down.document()),
            Outcome::Unknown => Some(Status::Unknown.document()),
            Outcome::Omitted => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ResultMerger {
    results: Mutex<Composite>,
}

impl ResultMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, name: String, value: Value) {
        self.lock().insert(name, value);
    }

    /// Inserts the outcome's value; `Omitted` leaves the map untouched.
    pub fn record(&self, name: String, outcome: Outcome) {
        if let Some(value) = outcome.into_value() {
            self.put(name, value);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Moves the merged map out. Only call once every worker has been joined.
    pub fn take(&self) -> Composite {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Composite> {
        // A worker panicking mid-insert cannot leave the map half-written.
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
