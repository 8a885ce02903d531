//! Log append-only de una corrida del pipeline.

pub mod store;
pub mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{PipelineEvent, PipelineEventKind};
