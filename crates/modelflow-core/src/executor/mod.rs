//! Ejecución de pipelines: orden topológico, decisión re-run vs cache-hit y
//! propagación de fallos.

pub mod core;
pub mod report;

pub use core::PipelineExecutor;
pub use report::{RunReport, StageOutcome};
