//! Unidades de stage listas para usar.

pub mod demo;
pub mod fn_unit;

pub use demo::{EvaluateUnit, IngestUnit, PreprocessUnit, TrainUnit};
pub use fn_unit::FnUnit;
