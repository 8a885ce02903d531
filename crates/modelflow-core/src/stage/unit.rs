//! Contrato ejecutable de un stage.

use crate::errors::StageError;
use crate::model::StageContext;

/// Unidad de trabajo opaca para el core: recibe inputs resueltos y
/// parámetros, debe producir las rutas de output declaradas en el workspace
/// y reportar éxito o fallo. Implementaciones deben ser puras respecto a
/// inputs + params; un stage no determinista rompe la cache (ver
/// `CacheError::Inconsistency`).
pub trait StageUnit {
    fn run(&self, ctx: &mut StageContext<'_>) -> StageRunResult;
}

/// Resultado abstracto de ejecutar una unidad.
pub enum StageRunResult {
    Success,
    Failure { error: StageError },
}

impl StageRunResult {
    /// Azúcar para unidades escritas con `?` sobre `StageError`.
    pub fn from_result(res: Result<(), StageError>) -> Self {
        match res {
            Ok(()) => Self::Success,
            Err(error) => Self::Failure { error },
        }
    }
}
