//! Errores del registro. Toda operación que falla deja el estado intacto:
//! las validaciones corren completas antes de cualquier mutación.

use thiserror::Error;

use crate::model::LifecycleStage;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum RegistryError {
    #[error("unknown model '{0}'")]
    UnknownModel(String),
    #[error("unknown version {version} for model '{name}'")]
    UnknownVersion { name: String, version: u64 },
    #[error("version {version} of '{name}' is archived and cannot transition")]
    VersionArchived { name: String, version: u64 },
    #[error("'{0:?}' is not a valid promotion target")]
    InvalidTarget(LifecycleStage),
    #[error("registry storage: {0}")]
    Storage(String),
}
