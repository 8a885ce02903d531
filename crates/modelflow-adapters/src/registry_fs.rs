//! Persistencia del estado del registro como snapshot JSON.
//!
//! El registro vive en memoria; este adaptador lo vuelca/recupera de un
//! archivo con escritura atómica (tmp + rename) y reintentos acotados para
//! I/O transitoria. El snapshot usa `BTreeMap`, así el archivo es estable
//! entre corridas.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use modelflow_registry::{RegistryError, RegistrySnapshot};

#[derive(Debug, Clone)]
pub struct FsRegistrySnapshot {
    path: PathBuf,
    retry_max: u32,
}

impl FsRegistrySnapshot {
    pub fn new(path: impl Into<PathBuf>, retry_max: u32) -> Self {
        Self { path: path.into(),
               retry_max: retry_max.max(1) }
    }

    fn with_retry<T>(&self, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.kind() == ErrorKind::NotFound => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.retry_max {
                        return Err(e);
                    }
                    warn!(attempt, error = %e, "transient registry io error, retrying");
                    std::thread::sleep(Duration::from_millis(10));
                }
            }
        }
    }

    /// Persiste el snapshot. Lectores concurrentes ven el archivo anterior
    /// o el nuevo, nunca uno a medias.
    pub fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RegistryError::Storage(e.to_string()))?;
        }
        let body = serde_json::to_vec_pretty(snapshot).map_err(|e| RegistryError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        self.with_retry(|| fs::write(&tmp, &body))
            .and_then(|_| self.with_retry(|| fs::rename(&tmp, &self.path)))
            .map_err(|e| RegistryError::Storage(e.to_string()))?;
        debug!(path = %self.path.display(), models = snapshot.len(), "registry snapshot persisted");
        Ok(())
    }

    /// Recupera el snapshot persistido; `None` si todavía no existe.
    pub fn load(&self) -> Result<Option<RegistrySnapshot>, RegistryError> {
        let bytes = match self.with_retry(|| fs::read(&self.path)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RegistryError::Storage(e.to_string())),
        };
        serde_json::from_slice(&bytes).map(Some)
                                      .map_err(|e| RegistryError::Storage(format!("corrupt snapshot: {e}")))
    }
}
