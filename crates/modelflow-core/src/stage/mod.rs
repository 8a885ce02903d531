//! Stage: unidad de trabajo declarada (inputs, outputs, params) más su
//! contrato ejecutable.

pub mod definition;
pub mod status;
pub mod unit;

pub use definition::Stage;
pub use status::StageStatus;
pub use unit::{StageRunResult, StageUnit};
