//! Errores del core, separados por familia.
//!
//! Taxonomía:
//! - `GraphError`: estructural, detectado al construir el grafo o al validar
//!   insumos externos. Fatal: ningún grafo parcial es utilizable.
//! - `StageError` / `ExecutionError`: fallo de la unidad de un stage. No es
//!   fatal para el executor, que sólo detiene la rama afectada.
//! - `CacheError::Inconsistency`: un fingerprint produjo outputs divergentes
//!   entre corridas. Señala un stage no determinista; se reporta fuerte y
//!   nunca se resuelve en silencio.
//! - `WorkspaceError`: I/O del almacén de artefactos.
//! - `PipelineError`: paraguas en la frontera del executor.

use thiserror::Error;

/// Errores estructurales del grafo de stages. Nunca se reintentan.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GraphError {
    #[error("duplicate stage name '{0}'")]
    DuplicateStage(String),
    #[error("artifact '{artifact}' is already produced by stage '{producer}'")]
    DuplicateOutput { artifact: String, producer: String },
    #[error("stage '{stage}' declares '{artifact}' as both input and output")]
    SelfCycle { stage: String, artifact: String },
    #[error("adding stage '{stage}' would create a dependency cycle")]
    Cycle { stage: String },
    #[error("no unit bound for stage '{stage}'")]
    UnboundUnit { stage: String },
    #[error("input '{artifact}' of stage '{stage}' is neither produced nor present in the workspace")]
    DanglingInput { stage: String, artifact: String },
    #[error("malformed pipeline definition: {0}")]
    Malformed(String),
}

/// Causa de fallo reportada por la unidad de un stage.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StageError {
    #[error("unit failed: {0}")]
    Unit(String),
    #[error("missing input artifact '{0}'")]
    MissingInput(String),
    #[error("workspace access: {0}")]
    Workspace(String),
}

/// Fallo de ejecución con identidad del stage y causa subyacente.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ExecutionError {
    #[error("stage '{stage}' failed: {cause}")]
    UnitFailed {
        stage: String,
        #[source]
        cause: StageError,
    },
    #[error("stage '{stage}' finished without producing declared output '{artifact}'")]
    MissingOutput { stage: String, artifact: String },
}

/// Errores del almacén de cache.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CacheError {
    /// Mismo fingerprint, outputs distintos: violación de pureza aguas
    /// arriba. La entrada existente queda intacta.
    #[error("cache inconsistency: fingerprint {fingerprint} was committed with divergent outputs")]
    Inconsistency { fingerprint: String },
    #[error("cache storage: {0}")]
    Storage(String),
}

/// I/O del workspace de artefactos.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum WorkspaceError {
    #[error("workspace io: {0}")]
    Io(String),
}

/// Error agregado en la frontera de `PipelineExecutor::run`.
///
/// Los fallos de stage NO aparecen aquí: quedan en el `RunReport` porque el
/// executor continúa con las ramas no afectadas.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}
