//! Declaración de un stage.

use serde_json::Value;

use super::unit::StageUnit;

/// Stage declarado: identidad, artefactos de entrada/salida en orden, un
/// objeto de parámetros y la unidad ejecutable (opaca para el core).
///
/// Invariantes (impuestos por `StageGraph::add_stage`):
/// - ningún output puede repetir el output de otro stage;
/// - ninguna ruta puede ser input y output del mismo stage;
/// - el conjunto completo de stages forma un DAG.
pub struct Stage {
    pub name: String,
    pub inputs: Vec<String>,  // orden declarado significativo
    pub outputs: Vec<String>, // cada output pertenece a exactamente un stage
    pub params: Value,
    /// Output cuyo JSON se empaqueta para el sink de métricas tras
    /// Succeeded/Skipped. Debe ser una de las rutas de `outputs`.
    pub metrics_output: Option<String>,
    unit: Box<dyn StageUnit>,
}

impl Stage {
    pub fn new(name: impl Into<String>,
               inputs: Vec<String>,
               outputs: Vec<String>,
               params: Value,
               unit: Box<dyn StageUnit>)
               -> Self {
        Self { name: name.into(),
               inputs,
               outputs,
               params,
               metrics_output: None,
               unit }
    }

    /// Marca un output como fuente de métricas.
    pub fn with_metrics_output(mut self, path: impl Into<String>) -> Self {
        self.metrics_output = Some(path.into());
        self
    }

    pub fn unit(&self) -> &dyn StageUnit {
        self.unit.as_ref()
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
         .field("name", &self.name)
         .field("inputs", &self.inputs)
         .field("outputs", &self.outputs)
         .field("params", &self.params)
         .field("metrics_output", &self.metrics_output)
         .finish_non_exhaustive()
    }
}
