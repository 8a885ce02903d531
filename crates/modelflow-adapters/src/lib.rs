//! modelflow-adapters
//!
//! Colaboradores durables y unidades de ejemplo sobre los contratos del
//! core:
//! - `fs_workspace`: `Workspace` sobre un directorio raíz.
//! - `fs_cache`: `CacheStore` durable con manifiestos JSON estables entre
//!   corridas y máquinas.
//! - `units`: unidades del pipeline de ejemplo (ingest → preprocess →
//!   train → evaluate) y `FnUnit` para closures.
//! - `metrics`: sink de métricas sobre `tracing`.
//! - `registry_fs`: snapshot JSON del registro con rename atómico.
//! - `config`: carga de configuración desde `.env` / variables de entorno.

pub mod config;
pub mod fs_cache;
pub mod fs_workspace;
pub mod metrics;
pub mod registry_fs;
pub mod units;

pub use config::{init_dotenv, FlowConfig};
pub use fs_cache::FsCacheStore;
pub use fs_workspace::FsWorkspace;
pub use metrics::TracingMetricsRecorder;
pub use registry_fs::FsRegistrySnapshot;
pub use units::{EvaluateUnit, FnUnit, IngestUnit, PreprocessUnit, TrainUnit};
