//! Sink de métricas sobre `tracing`.

use std::collections::BTreeMap;

use tracing::info;

use modelflow_core::metrics::MetricsRecorder;

/// Publica cada paquete de métricas como evento estructurado de log. Hace
/// de puente mínimo hacia el sink de tracking externo cuando no hay uno
/// configurado.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricsRecorder;

impl MetricsRecorder for TracingMetricsRecorder {
    fn record(&mut self, stage: &str, metrics: &BTreeMap<String, f64>) {
        for (key, value) in metrics {
            info!(stage, metric = %key, value, "evaluation metric");
        }
    }
}
