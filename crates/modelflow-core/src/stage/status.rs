//! Estado de un stage durante una corrida.

use serde::{Deserialize, Serialize};

/// Las transiciones válidas son:
/// - `Pending` -> `Skipped` (cache-hit)
/// - `Pending` -> `Running` -> `Succeeded`
/// - `Pending` -> `Running` -> `Failed`
/// - `Pending` -> `Blocked` (dependencia transitiva de un stage fallido)
///
/// No se permiten reversiones ni saltos arbitrarios entre estados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    /// Pendiente de decisión (aún no alcanzado por el orden topológico).
    Pending,
    /// Outputs restaurados desde cache; la unidad no se ejecutó.
    Skipped,
    /// La unidad está en ejecución.
    Running,
    /// La unidad terminó y sus outputs fueron confirmados en cache.
    Succeeded,
    /// La unidad falló (o no produjo un output declarado).
    Failed,
    /// Nunca se ejecutó: depende transitivamente de un stage fallido.
    Blocked,
}

impl StageStatus {
    /// Estados terminales de una corrida.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Skipped | Self::Succeeded | Self::Failed | Self::Blocked)
    }
}
