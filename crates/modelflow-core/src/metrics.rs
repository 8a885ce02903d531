//! Frontera de métricas de evaluación.
//!
//! El core sólo garantiza empaquetar determinísticamente el output de
//! métricas declarado por un stage como mapa clave→numérico; el protocolo
//! del sink externo no se define aquí. El sink es un handle explícito del
//! executor, no un singleton de proceso.

use std::collections::BTreeMap;

use serde_json::Value;

/// Consumidor de métricas (sink de tracking externo).
pub trait MetricsRecorder {
    fn record(&mut self, stage: &str, metrics: &BTreeMap<String, f64>);
}

/// Sink nulo.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsRecorder;

impl MetricsRecorder for NoopMetricsRecorder {
    fn record(&mut self, _stage: &str, _metrics: &BTreeMap<String, f64>) {}
}

/// Sink en memoria para tests y dobles.
#[derive(Debug, Default)]
pub struct MemoryMetricsRecorder {
    recorded: Vec<(String, BTreeMap<String, f64>)>,
}

impl MemoryMetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> &[(String, BTreeMap<String, f64>)] {
        &self.recorded
    }
}

impl MetricsRecorder for MemoryMetricsRecorder {
    fn record(&mut self, stage: &str, metrics: &BTreeMap<String, f64>) {
        self.recorded.push((stage.to_string(), metrics.clone()));
    }
}

/// Empaqueta el JSON de un output de métricas como mapa ordenado
/// clave→f64. Sólo campos numéricos de primer nivel; `None` si el contenido
/// no es un objeto JSON.
pub fn package_metrics(bytes: &[u8]) -> Option<BTreeMap<String, f64>> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    let object = value.as_object()?;
    Some(object.iter()
               .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
               .collect())
}
