//! Manifiesto de una corrida.
//!
//! Responde las dos preguntas de depuración de cache: "¿por qué tardó 0
//! segundos?" (todo Skipped) y "¿por qué mi cambio no tuvo efecto?" (el
//! stage esperado no aparece como Succeeded).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stage::StageStatus;

/// Resultado terminal de un stage en una corrida.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: String,
    pub status: StageStatus,
    /// Fingerprint calculado para esta corrida. `None` en stages Blocked
    /// (sus inputs nunca se resolvieron).
    pub fingerprint: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Outcomes en orden topológico de la corrida.
    pub outcomes: Vec<StageOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn status_of(&self, stage: &str) -> Option<StageStatus> {
        self.outcomes.iter().find(|o| o.stage == stage).map(|o| o.status)
    }

    pub fn fingerprint_of(&self, stage: &str) -> Option<&str> {
        self.outcomes
            .iter()
            .find(|o| o.stage == stage)
            .and_then(|o| o.fingerprint.as_deref())
    }

    fn count(&self, status: StageStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Stages cuya unidad se ejecutó en esta corrida.
    pub fn ran(&self) -> usize {
        self.count(StageStatus::Succeeded) + self.count(StageStatus::Failed)
    }

    pub fn succeeded(&self) -> usize {
        self.count(StageStatus::Succeeded)
    }

    pub fn skipped(&self) -> usize {
        self.count(StageStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(StageStatus::Failed)
    }

    pub fn blocked(&self) -> usize {
        self.count(StageStatus::Blocked)
    }

    /// La corrida terminó sin fallos ni bloqueos.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.blocked() == 0
    }
}
