//! modelflow-registry: versiones inmutables de modelos y su máquina de
//! estados de promoción (None → Staging → Production, con Archived como
//! salida).

pub mod error;
pub mod events;
pub mod model;
pub mod registry;

pub use error::RegistryError;
pub use events::{MemoryPromotionSink, NoopPromotionSink, PromotionEvent, PromotionSink};
pub use model::{LifecycleStage, ModelVersion, PromotionRequest, RegistrySnapshot};
pub use registry::ModelRegistry;
