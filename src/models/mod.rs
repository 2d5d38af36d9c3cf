// Domain models: discovered nodes, fetch kinds, composite results

mod composite;
mod node;

pub use composite::{Composite, FetchKind, Status};
pub use node::{DEFAULT_HEALTH_PATH, DEFAULT_INFO_PATH, NodeDescriptor};
