//! Contexto de ejecución entregado a `StageUnit::run`.

use serde_json::Value;

use crate::errors::StageError;
use crate::model::ArtifactRef;
use crate::workspace::Workspace;

/// Vista que recibe la unidad de un stage: inputs resueltos (con
/// fingerprint), rutas de output declaradas, parámetros canónicos y el
/// workspace donde debe escribir esos outputs.
pub struct StageContext<'a> {
    pub inputs: &'a [ArtifactRef],
    pub outputs: &'a [String],
    pub params: &'a Value,
    pub workspace: &'a mut dyn Workspace,
}

impl StageContext<'_> {
    /// Lee el input en posición `idx` (orden declarado).
    pub fn read_input(&self, idx: usize) -> Result<Vec<u8>, StageError> {
        let r = self.inputs
                    .get(idx)
                    .ok_or_else(|| StageError::MissingInput(format!("input #{idx}")))?;
        self.read(&r.path)
    }

    /// Ruta del output declarado en posición `idx`.
    pub fn output_path(&self, idx: usize) -> Result<&str, StageError> {
        self.outputs
            .get(idx)
            .map(|s| s.as_str())
            .ok_or_else(|| StageError::Unit(format!("stage declares no output #{idx}")))
    }

    /// Lee un artefacto arbitrario del workspace.
    pub fn read(&self, path: &str) -> Result<Vec<u8>, StageError> {
        match self.workspace.read(path) {
            Ok(Some(bytes)) => Ok(bytes),
            Ok(None) => Err(StageError::MissingInput(path.to_string())),
            Err(e) => Err(StageError::Workspace(e.to_string())),
        }
    }

    /// Escribe un output declarado.
    pub fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), StageError> {
        self.workspace
            .write(path, bytes)
            .map_err(|e| StageError::Workspace(e.to_string()))
    }

    /// Parámetro por nombre, `Null` si no existe.
    pub fn param(&self, key: &str) -> &Value {
        self.params.get(key).unwrap_or(&Value::Null)
    }
}
