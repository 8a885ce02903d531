//! Tipos de valor que cruzan las costuras del motor.

pub mod artifact;
pub mod context;
pub mod fingerprint;

pub use artifact::{ArtifactRef, ArtifactSnapshot};
pub use context::StageContext;
pub use fingerprint::StageFingerprintInput;
