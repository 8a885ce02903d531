//! Unidades del pipeline de ejemplo: ingest → preprocess → train →
//! evaluate sobre un CSV `label,texto` por línea.
//!
//! Son deterministas por construcción: mismo input + mismos parámetros ⇒
//! mismos bytes de salida. El "modelo" es un stub (pesos por conteo de
//! tokens) suficiente para ejercitar cache, fingerprints y registro.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use modelflow_core::errors::StageError;
use modelflow_core::model::StageContext;
use modelflow_core::stage::{StageRunResult, StageUnit};

fn read_lines(ctx: &StageContext<'_>, idx: usize) -> Result<Vec<String>, StageError> {
    let bytes = ctx.read_input(idx)?;
    let text = String::from_utf8(bytes).map_err(|e| StageError::Unit(format!("input is not utf-8: {e}")))?;
    Ok(text.lines().map(|l| l.to_string()).collect())
}

fn parse_row(line: &str) -> Option<(i64, Vec<String>)> {
    let (label, text) = line.split_once(',')?;
    let label: i64 = label.trim().parse().ok()?;
    let tokens = text.split_whitespace().map(|t| t.to_string()).collect();
    Some((label, tokens))
}

/// Copia la fuente cruda al pipeline descartando líneas vacías.
pub struct IngestUnit;

impl StageUnit for IngestUnit {
    fn run(&self, ctx: &mut StageContext<'_>) -> StageRunResult {
        StageRunResult::from_result((|| {
            let lines = read_lines(ctx, 0)?;
            let kept: Vec<&str> = lines.iter()
                                       .map(|l| l.as_str())
                                       .filter(|l| !l.trim().is_empty())
                                       .collect();
            let out = ctx.output_path(0)?.to_string();
            ctx.write(&out, kept.join("\n").as_bytes())
        })())
    }
}

/// Normalización: minúsculas y espacios colapsados.
pub struct PreprocessUnit;

impl StageUnit for PreprocessUnit {
    fn run(&self, ctx: &mut StageContext<'_>) -> StageRunResult {
        StageRunResult::from_result((|| {
            let lines = read_lines(ctx, 0)?;
            let normalized: Vec<String> = lines.iter()
                                               .map(|l| {
                                                   l.to_lowercase()
                                                    .split_whitespace()
                                                    .collect::<Vec<_>>()
                                                    .join(" ")
                                               })
                                               .collect();
            let out = ctx.output_path(0)?.to_string();
            ctx.write(&out, normalized.join("\n").as_bytes())
        })())
    }
}

/// Entrena el stub: peso por token = conteo con signo del label, escalado
/// por `learning_rate`. Serializa el modelo como JSON con claves ordenadas.
pub struct TrainUnit;

impl StageUnit for TrainUnit {
    fn run(&self, ctx: &mut StageContext<'_>) -> StageRunResult {
        StageRunResult::from_result((|| {
            let learning_rate = ctx.param("learning_rate").as_f64().unwrap_or(0.1);
            let lines = read_lines(ctx, 0)?;

            let mut weights: BTreeMap<String, f64> = BTreeMap::new();
            let mut samples = 0i64;
            for line in &lines {
                let Some((label, tokens)) = parse_row(line) else {
                    continue;
                };
                samples += 1;
                let signal = if label > 0 { 1.0 } else { -1.0 };
                for token in tokens {
                    *weights.entry(token).or_insert(0.0) += signal * learning_rate;
                }
            }

            let model = json!({
                "learning_rate": learning_rate,
                "samples": samples,
                "weights": weights,
            });
            let out = ctx.output_path(0)?.to_string();
            ctx.write(&out, model.to_string().as_bytes())
        })())
    }
}

/// Evalúa el modelo contra un split de prueba y escribe el JSON de
/// métricas (mapa clave→numérico) declarado como output.
pub struct EvaluateUnit;

impl StageUnit for EvaluateUnit {
    fn run(&self, ctx: &mut StageContext<'_>) -> StageRunResult {
        StageRunResult::from_result((|| {
            let model_bytes = ctx.read_input(0)?;
            let model: Value = serde_json::from_slice(&model_bytes)
                .map_err(|e| StageError::Unit(format!("model is not valid JSON: {e}")))?;
            let weights = model.get("weights")
                               .and_then(Value::as_object)
                               .ok_or_else(|| StageError::Unit("model has no weights object".into()))?;

            let lines = read_lines(ctx, 1)?;
            let mut total = 0u64;
            let mut correct = 0u64;
            for line in &lines {
                let Some((label, tokens)) = parse_row(line) else {
                    continue;
                };
                total += 1;
                let score: f64 = tokens.iter()
                                       .filter_map(|t| weights.get(t).and_then(Value::as_f64))
                                       .sum();
                let predicted = if score >= 0.0 { 1 } else { 0 };
                if predicted == label.max(0) {
                    correct += 1;
                }
            }

            let accuracy = if total == 0 { 0.0 } else { correct as f64 / total as f64 };
            let metrics = json!({
                "accuracy": accuracy,
                "samples": total as f64,
            });
            let out = ctx.output_path(0)?.to_string();
            ctx.write(&out, metrics.to_string().as_bytes())
        })())
    }
}
