//! Definición declarativa de un pipeline.
//!
//! Es la entrada externa del sistema: una lista de stages con `name`,
//! `inputs`, `outputs`, `params` y opcionalmente `metrics`. Se consume en
//! `StageGraph::from_definition`, donde las definiciones malformadas fallan
//! antes de cualquier ejecución.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GraphError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub stages: Vec<StageSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Objeto de parámetros; ausente equivale a `{}`.
    #[serde(default)]
    pub params: Value,
    /// Ruta de output cuyo JSON alimenta el sink de métricas.
    #[serde(default)]
    pub metrics: Option<String>,
}

impl PipelineDefinition {
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        serde_json::from_str(text).map_err(|e| GraphError::Malformed(e.to_string()))
    }
}
