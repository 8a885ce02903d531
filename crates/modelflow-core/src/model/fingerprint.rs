//! Insumos del fingerprint de un stage.

use serde_json::{json, Value};

use super::ArtifactRef;

/// Agrupa los insumos del fingerprint de un stage. NO es el fingerprint
/// final (string hash) sino el modelo previo a canonicalizar.
pub struct StageFingerprintInput<'a> {
    pub engine_version: &'a str,
    pub stage: &'a str,
    pub inputs: &'a [ArtifactRef], // en orden declarado; el orden es significativo
    pub outputs: &'a [String],     // rutas declaradas, en orden
    pub params: &'a Value,         // canonicalizable; orden de claves irrelevante
}

impl StageFingerprintInput<'_> {
    /// Forma JSON estable del insumo. Los inputs serializan como pares
    /// `[ruta, fingerprint]` para fijar la asociación y el orden.
    pub fn to_value(&self) -> Value {
        let inputs: Vec<Value> = self.inputs
                                     .iter()
                                     .map(|r| json!([r.path, r.fingerprint]))
                                     .collect();
        json!({
            "engine_version": self.engine_version,
            "stage": self.stage,
            "inputs": inputs,
            "outputs": self.outputs,
            "params": self.params,
        })
    }
}
