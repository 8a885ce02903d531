//! Módulo de hashing y canonicalización JSON.

pub mod canonical_json;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use hash::{hash_bytes, hash_str, hash_value};

use crate::constants::ENGINE_VERSION;
use crate::model::{ArtifactRef, StageFingerprintInput};
use crate::stage::Stage;

/// Calculador de fingerprints. Puro: dos invocaciones con inputs y
/// parámetros idénticos producen el mismo digest, requisito de corrección de
/// la cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint del contenido de un artefacto (bytes crudos).
    pub fn fingerprint_bytes(&self, bytes: &[u8]) -> String {
        hash_bytes(bytes)
    }

    /// Fingerprint de ejecución de un stage: combina versión del engine,
    /// identidad del stage, fingerprints de inputs en orden declarado,
    /// outputs declarados y parámetros canónicos. El orden de claves de
    /// `params` es irrelevante (JSON canónico); el orden de inputs no.
    pub fn stage_fingerprint(&self, stage: &Stage, resolved_inputs: &[ArtifactRef]) -> String {
        let fp_input = StageFingerprintInput { engine_version: ENGINE_VERSION,
                                               stage: &stage.name,
                                               inputs: resolved_inputs,
                                               outputs: &stage.outputs,
                                               params: &stage.params };
        hash_value(&fp_input.to_value())
    }
}
