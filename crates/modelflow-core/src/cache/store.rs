//! Almacenamiento de cache por fingerprint.
//!
//! El contrato de concurrencia: `lookup` nunca observa un `commit` parcial.
//! La variante en memoria lo garantiza insertando entradas completas bajo un
//! `RwLock`; la variante durable (adapters) lo hace con rename atómico de
//! manifiestos.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, warn};

use super::CacheEntry;
use crate::errors::{CacheError, WorkspaceError};
use crate::model::ArtifactSnapshot;
use crate::workspace::Workspace;

pub trait CacheStore {
    /// Entrada completa para `fingerprint`, o `None` (resultado "missing"
    /// limpio).
    fn lookup(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Registra los outputs de una ejecución. Idempotente: repetir el mismo
    /// fingerprint con outputs idénticos es un no-op; outputs divergentes
    /// son `CacheError::Inconsistency` y la entrada original queda intacta.
    fn commit(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Materializa los outputs de la entrada en el workspace,
    /// byte-idénticos a lo que se confirmó.
    fn restore(&self, entry: &CacheEntry, workspace: &mut dyn Workspace) -> Result<(), CacheError> {
        for snapshot in &entry.outputs {
            write_snapshot(snapshot, workspace)?;
        }
        Ok(())
    }
}

fn write_snapshot(snapshot: &ArtifactSnapshot, workspace: &mut dyn Workspace) -> Result<(), CacheError> {
    workspace.write(&snapshot.path, &snapshot.bytes)
             .map_err(|WorkspaceError::Io(e)| CacheError::Storage(e))
}

/// Cache en memoria. Entradas insertadas completas: lectores concurrentes
/// ven la entrada entera o "missing".
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    inner: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for InMemoryCacheStore {
    fn lookup(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError> {
        let map = self.inner
                      .read()
                      .map_err(|_| CacheError::Storage("cache lock poisoned".into()))?;
        Ok(map.get(fingerprint).cloned())
    }

    fn commit(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let mut map = self.inner
                          .write()
                          .map_err(|_| CacheError::Storage("cache lock poisoned".into()))?;
        match map.get(&entry.fingerprint) {
            Some(existing) if existing.same_outputs(&entry.outputs) => Ok(()), // re-commit idéntico
            Some(_) => {
                warn!(fingerprint = %entry.fingerprint, "divergent outputs for cached fingerprint");
                Err(CacheError::Inconsistency { fingerprint: entry.fingerprint })
            }
            None => {
                debug!(fingerprint = %entry.fingerprint, outputs = entry.outputs.len(), "cache commit");
                map.insert(entry.fingerprint.clone(), entry);
                Ok(())
            }
        }
    }
}
