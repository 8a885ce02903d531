//! Tipos de evento de corrida y estructura `PipelineEvent`.
//!
//! Rol en el flujo:
//! - Cada corrida del `PipelineExecutor` emite eventos a un `EventStore`
//!   append-only.
//! - El `RunReport` se deriva de las mismas transiciones, así el manifiesto
//!   visible y el log histórico nunca divergen.
//! - El enum `PipelineEventKind` define el contrato observable del motor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEventKind {
    /// Primer evento de una corrida: fija el hash de la definición y la
    /// cantidad de stages.
    RunStarted { definition_hash: String, stage_count: usize },
    /// Un stage comenzó a ejecutar su unidad. No implica éxito.
    StageStarted { stage: String },
    /// Cache-hit: outputs restaurados, la unidad no corrió. El fingerprint
    /// restaurado es el mismo que habría producido la ejecución, por eso el
    /// skip es transparente para los descendientes.
    StageSkipped { stage: String, fingerprint: String },
    /// La unidad terminó y sus outputs quedaron confirmados en cache.
    StageFinished {
        stage: String,
        fingerprint: String,
        outputs: Vec<String>, // checksums en orden declarado
    },
    /// La unidad falló (o no produjo un output declarado).
    StageFailed { stage: String, error: String },
    /// Nunca corrió: depende transitivamente de un stage fallido.
    StageBlocked { stage: String, failed_dependency: String },
    /// Cierre de la corrida con el conteo por estado terminal.
    RunCompleted { succeeded: usize, skipped: usize, failed: usize, blocked: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub seq: u64, // asignado por el EventStore (orden de append)
    pub run_id: Uuid,
    pub kind: PipelineEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en ningún fingerprint)
}
