//! `CacheStore` durable sobre filesystem.
//!
//! Layout bajo la raíz:
//! - `objects/<checksum>`: blob direccionado por contenido (compartido entre
//!   fingerprints que produzcan bytes idénticos).
//! - `manifests/<fingerprint>.json`: manifiesto `{fingerprint, outputs:
//!   [{path, checksum}], created_at}`.
//!
//! El formato del manifiesto es estable entre corridas y máquinas: es el
//! contrato de reproducibilidad cruzada. Manifiestos y blobs se escriben a
//! archivo temporal y se renombran, así un lector concurrente ve la entrada
//! completa o un "missing" limpio, nunca un commit parcial. Los errores de
//! I/O se reintentan con presupuesto acotado; la inconsistencia de outputs
//! es estructural y no se reintenta jamás.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use modelflow_core::cache::{CacheEntry, CacheStore};
use modelflow_core::errors::CacheError;
use modelflow_core::hashing::ContentHasher;
use modelflow_core::model::ArtifactSnapshot;

use crate::config::FlowConfig;

#[derive(Debug, Serialize, Deserialize)]
struct CacheManifest {
    fingerprint: String,
    outputs: Vec<ManifestOutput>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct ManifestOutput {
    path: String,
    checksum: String,
}

#[derive(Debug, Clone)]
pub struct FsCacheStore {
    root: PathBuf,
    retry_max: u32,
    hasher: ContentHasher,
}

impl FsCacheStore {
    pub fn new(root: impl Into<PathBuf>, retry_max: u32) -> Result<Self, CacheError> {
        let root = root.into();
        for dir in [root.join("objects"), root.join("manifests")] {
            fs::create_dir_all(&dir).map_err(|e| CacheError::Storage(e.to_string()))?;
        }
        Ok(Self { root,
                  retry_max: retry_max.max(1),
                  hasher: ContentHasher::new() })
    }

    /// Constructor desde la configuración de entorno.
    pub fn from_config(config: &FlowConfig) -> Result<Self, CacheError> {
        Self::new(&config.cache_dir, config.retry_max)
    }

    fn manifest_path(&self, fingerprint: &str) -> PathBuf {
        self.root.join("manifests").join(format!("{fingerprint}.json"))
    }

    fn object_path(&self, checksum: &str) -> PathBuf {
        self.root.join("objects").join(checksum)
    }

    /// Reintenta operaciones de I/O transitorias con presupuesto acotado.
    fn with_retry<T>(&self, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.kind() == ErrorKind::NotFound => return Err(e), // no transitorio
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retry_max {
                        return Err(e);
                    }
                    warn!(attempt, error = %e, "transient cache io error, retrying");
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
        }
    }

    fn read_manifest(&self, fingerprint: &str) -> Result<Option<CacheManifest>, CacheError> {
        let bytes = match self.with_retry(|| fs::read(self.manifest_path(fingerprint))) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Storage(e.to_string())),
        };
        serde_json::from_slice(&bytes).map(Some)
                                      .map_err(|e| CacheError::Storage(format!("corrupt manifest {fingerprint}: {e}")))
    }

    /// Escritura atómica: archivo temporal en el mismo directorio + rename.
    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<(), CacheError> {
        let tmp = target.with_extension("tmp");
        self.with_retry(|| fs::write(&tmp, bytes))
            .and_then(|_| self.with_retry(|| fs::rename(&tmp, target)))
            .map_err(|e| CacheError::Storage(e.to_string()))
    }
}

impl CacheStore for FsCacheStore {
    fn lookup(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError> {
        let Some(manifest) = self.read_manifest(fingerprint)? else {
            return Ok(None);
        };
        let mut outputs = Vec::with_capacity(manifest.outputs.len());
        for output in &manifest.outputs {
            let bytes = self.with_retry(|| fs::read(self.object_path(&output.checksum)))
                            .map_err(|e| CacheError::Storage(format!("cache object {} unreadable: {e}",
                                                                     output.checksum)))?;
            if self.hasher.fingerprint_bytes(&bytes) != output.checksum {
                return Err(CacheError::Storage(format!("cache object {} fails checksum verification",
                                                       output.checksum)));
            }
            outputs.push(ArtifactSnapshot::new(output.path.clone(), bytes, output.checksum.clone()));
        }
        Ok(Some(CacheEntry { fingerprint: manifest.fingerprint,
                             outputs,
                             created_at: manifest.created_at }))
    }

    fn commit(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let incoming: Vec<ManifestOutput> = entry.outputs
                                                 .iter()
                                                 .map(|s| ManifestOutput { path: s.path.clone(),
                                                                           checksum: s.checksum.clone() })
                                                 .collect();

        if let Some(existing) = self.read_manifest(&entry.fingerprint)? {
            if existing.outputs == incoming {
                return Ok(()); // re-commit idéntico
            }
            warn!(fingerprint = %entry.fingerprint, "divergent outputs for cached fingerprint");
            return Err(CacheError::Inconsistency { fingerprint: entry.fingerprint });
        }

        // Blobs primero: un manifiesto publicado siempre referencia objetos
        // ya completos.
        for snapshot in &entry.outputs {
            let target = self.object_path(&snapshot.checksum);
            if !target.exists() {
                self.write_atomic(&target, &snapshot.bytes)?;
            }
        }

        let manifest = CacheManifest { fingerprint: entry.fingerprint.clone(),
                                       outputs: incoming,
                                       created_at: entry.created_at };
        let body = serde_json::to_vec_pretty(&manifest).map_err(|e| CacheError::Storage(e.to_string()))?;
        self.write_atomic(&self.manifest_path(&entry.fingerprint), &body)?;
        debug!(fingerprint = %entry.fingerprint, outputs = entry.outputs.len(), "cache entry persisted");
        Ok(())
    }
}
