//! Entrada de cache: inmutable desde su creación.

use chrono::{DateTime, Utc};

use crate::model::ArtifactSnapshot;

/// Valor almacenado bajo un fingerprint: instantáneas completas de los
/// outputs más el instante de creación (metadato, no entra en ningún hash).
/// Se crea en la primera ejecución exitosa de ese fingerprint y nunca se
/// muta; la evicción corre por cuenta de una política externa.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub outputs: Vec<ArtifactSnapshot>,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(fingerprint: impl Into<String>, outputs: Vec<ArtifactSnapshot>) -> Self {
        Self { fingerprint: fingerprint.into(),
               outputs,
               created_at: Utc::now() }
    }

    /// Igualdad de outputs por (ruta, checksum) en orden. Dos commits del
    /// mismo fingerprint deben coincidir aquí; si no, hay un stage impuro.
    pub fn same_outputs(&self, other: &[ArtifactSnapshot]) -> bool {
        self.outputs.len() == other.len()
        && self.outputs
               .iter()
               .zip(other)
               .all(|(a, b)| a.path == b.path && a.checksum == b.checksum)
    }
}
