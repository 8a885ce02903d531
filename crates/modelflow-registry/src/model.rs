//! Registros del ciclo de vida de modelos.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Etapa del ciclo de vida de una versión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleStage {
    None,
    Staging,
    Production,
    Archived,
}

impl std::fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::None => "None",
            Self::Staging => "Staging",
            Self::Production => "Production",
            Self::Archived => "Archived",
        };
        f.write_str(label)
    }
}

/// Registro inmutable de una versión de modelo.
///
/// Invariantes (impuestos por `ModelRegistry`):
/// - `version` es monótona por nombre y nunca se reutiliza;
/// - a lo sumo una versión `Production` por nombre en todo instante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name: String,
    pub version: u64,
    /// Ubicación del artefacto entrenado (opaca para el registro).
    pub artifact: String,
    /// Métricas de evaluación capturadas al registrar.
    pub metrics: BTreeMap<String, f64>,
    pub stage: LifecycleStage,
    pub created_at: DateTime<Utc>,
}

/// Solicitud de transición de etapa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRequest {
    pub name: String,
    pub version: u64,
    pub target: LifecycleStage,
}

impl PromotionRequest {
    pub fn new(name: impl Into<String>, version: u64, target: LifecycleStage) -> Self {
        Self { name: name.into(),
               version,
               target }
    }
}

/// Estado completo del registro, serializable para persistencia externa.
/// BTreeMap: forma estable entre corridas y máquinas.
pub type RegistrySnapshot = BTreeMap<String, Vec<ModelVersion>>;
