//! Artefactos del pipeline.
//!
//! Un artefacto es neutral para el core: bytes bajo una ruta lógica. El
//! motor no interpreta su contenido; sólo lo fingerprinta para identidad,
//! deduplicación y trazabilidad.

use serde::{Deserialize, Serialize};

/// Referencia lógica a un artefacto: ruta declarada + fingerprint del
/// contenido (poblado durante la resolución/ejecución).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub path: String,
    pub fingerprint: String,
}

impl ArtifactRef {
    pub fn new(path: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self { path: path.into(),
               fingerprint: fingerprint.into() }
    }
}

/// Instantánea completa de un output: la unidad de almacenamiento de la
/// cache y de la restauración byte-idéntica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSnapshot {
    pub path: String,
    pub bytes: Vec<u8>,
    pub checksum: String, // fingerprint del contenido (asignado por el hasher)
}

impl ArtifactSnapshot {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>, checksum: impl Into<String>) -> Self {
        Self { path: path.into(),
               bytes,
               checksum: checksum.into() }
    }
}
