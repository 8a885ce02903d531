//! `Workspace` sobre un directorio raíz del filesystem.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use modelflow_core::errors::WorkspaceError;
use modelflow_core::workspace::Workspace;

/// Workspace durable: cada ruta lógica se resuelve bajo `root`. Los
/// directorios intermedios se crean al escribir.
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| WorkspaceError::Io(e.to_string()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Workspace for FsWorkspace {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>, WorkspaceError> {
        match fs::read(self.resolve(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WorkspaceError::Io(e.to_string())),
        }
    }

    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), WorkspaceError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| WorkspaceError::Io(e.to_string()))?;
        }
        fs::write(&full, bytes).map_err(|e| WorkspaceError::Io(e.to_string()))
    }

    fn contains(&self, path: &str) -> Result<bool, WorkspaceError> {
        Ok(self.resolve(path).exists())
    }
}
