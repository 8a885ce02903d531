//! Implementación del `PipelineExecutor`.
//!
//! Un único hilo coordinador recorre el orden topológico y decide, por
//! stage, entre restaurar desde cache (`Skipped`) o ejecutar la unidad
//! (`Running` → `Succeeded`/`Failed`). El contrato central es la
//! transparencia del skip: los fingerprints aguas abajo incorporan el
//! fingerprint del output restaurado igual que si el stage hubiera corrido.

use std::collections::HashMap;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::{CacheEntry, CacheStore};
use crate::errors::{ExecutionError, GraphError, PipelineError};
use crate::event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
use crate::executor::report::{RunReport, StageOutcome};
use crate::graph::StageGraph;
use crate::hashing::ContentHasher;
use crate::metrics::{package_metrics, MetricsRecorder, NoopMetricsRecorder};
use crate::model::{ArtifactRef, ArtifactSnapshot, StageContext};
use crate::stage::{Stage, StageRunResult, StageStatus};
use crate::workspace::Workspace;

/// Motor de ejecución. Los colaboradores (hasher, cache, eventos, métricas)
/// son handles explícitos para permitir dobles de test; no hay singletons
/// de proceso.
#[derive(Debug)]
pub struct PipelineExecutor<C, E, M>
    where C: CacheStore,
          E: EventStore,
          M: MetricsRecorder
{
    hasher: ContentHasher,
    cache: C,
    events: E,
    metrics: M,
    last_run_id: Option<Uuid>,
}

impl PipelineExecutor<crate::cache::InMemoryCacheStore, InMemoryEventStore, NoopMetricsRecorder> {
    /// Executor con colaboradores en memoria.
    pub fn in_memory() -> Self {
        Self::new(crate::cache::InMemoryCacheStore::new(), InMemoryEventStore::new(), NoopMetricsRecorder)
    }
}

impl<C, E, M> PipelineExecutor<C, E, M>
    where C: CacheStore,
          E: EventStore,
          M: MetricsRecorder
{
    pub fn new(cache: C, events: E, metrics: M) -> Self {
        Self { hasher: ContentHasher::new(),
               cache,
               events,
               metrics,
               last_run_id: None }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn event_store(&self) -> &E {
        &self.events
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Eventos de la última corrida, si la hubo.
    pub fn last_events(&self) -> Vec<PipelineEvent> {
        self.last_run_id
            .map(|id| self.events.list(id))
            .unwrap_or_default()
    }

    /// Ejecuta el grafo completo contra el workspace dado.
    ///
    /// Los fallos de stage NO abortan la corrida: detienen su rama (los
    /// dependientes transitivos quedan `Blocked`) y se reportan en el
    /// `RunReport`. Sólo los errores estructurales (insumos externos
    /// ausentes), de cache (incluida la inconsistencia por impureza) y de
    /// workspace cortan la corrida con `Err`.
    pub fn run(&mut self, graph: &StageGraph, workspace: &mut dyn Workspace) -> Result<RunReport, PipelineError> {
        self.check_external_inputs(graph, workspace)?;

        let run_id = Uuid::new_v4();
        self.last_run_id = Some(run_id);
        let started_at = chrono::Utc::now();
        let order = graph.topological_order();

        self.events.append_kind(run_id,
                                PipelineEventKind::RunStarted { definition_hash: graph.definition_hash(),
                                                                stage_count: graph.len() });
        info!(%run_id, stages = graph.len(), "pipeline run started");

        let n = graph.len();
        let mut statuses = vec![StageStatus::Pending; n];
        let mut blocked_by: Vec<Option<String>> = vec![None; n];
        // path -> fingerprint de los outputs ya resueltos en esta corrida.
        let mut resolved: HashMap<String, String> = HashMap::new();
        let mut outcomes: Vec<StageOutcome> = Vec::with_capacity(n);

        for &idx in &order {
            let stage = &graph.stages()[idx];

            if statuses[idx] == StageStatus::Blocked {
                outcomes.push(StageOutcome { stage: stage.name.clone(),
                                             status: StageStatus::Blocked,
                                             fingerprint: None,
                                             error: blocked_by[idx].as_ref()
                                                                   .map(|d| format!("blocked by failed stage '{d}'")) });
                continue;
            }

            let refs = self.resolve_inputs(stage, &resolved, workspace)?;
            let fingerprint = self.hasher.stage_fingerprint(stage, &refs);

            if let Some(entry) = self.cache.lookup(&fingerprint)? {
                self.cache.restore(&entry, workspace)?;
                for snapshot in &entry.outputs {
                    resolved.insert(snapshot.path.clone(), snapshot.checksum.clone());
                }
                statuses[idx] = StageStatus::Skipped;
                self.events.append_kind(run_id,
                                        PipelineEventKind::StageSkipped { stage: stage.name.clone(),
                                                                          fingerprint: fingerprint.clone() });
                info!(stage = %stage.name, "cache hit, outputs restored");
                self.emit_metrics(stage, &entry.outputs);
                outcomes.push(StageOutcome { stage: stage.name.clone(),
                                             status: StageStatus::Skipped,
                                             fingerprint: Some(fingerprint),
                                             error: None });
                continue;
            }

            statuses[idx] = StageStatus::Running;
            self.events.append_kind(run_id, PipelineEventKind::StageStarted { stage: stage.name.clone() });
            info!(stage = %stage.name, "running stage");

            let run_result = {
                let mut ctx = StageContext { inputs: &refs,
                                             outputs: &stage.outputs,
                                             params: &stage.params,
                                             workspace: &mut *workspace };
                stage.unit().run(&mut ctx)
            };

            let failure = match run_result {
                StageRunResult::Failure { error } => {
                    Some(ExecutionError::UnitFailed { stage: stage.name.clone(),
                                                      cause: error })
                }
                StageRunResult::Success => {
                    match self.collect_outputs(stage, workspace)? {
                        Ok(snapshots) => {
                            // Confirmar ANTES de marcar Succeeded: outputs
                            // parciales de un stage fallido jamás llegan a
                            // la cache.
                            let entry = CacheEntry::new(fingerprint.clone(), snapshots);
                            self.cache.commit(entry.clone())?;
                            for snapshot in &entry.outputs {
                                resolved.insert(snapshot.path.clone(), snapshot.checksum.clone());
                            }
                            statuses[idx] = StageStatus::Succeeded;
                            self.events.append_kind(run_id,
                                                    PipelineEventKind::StageFinished {
                                                        stage: stage.name.clone(),
                                                        fingerprint: fingerprint.clone(),
                                                        outputs: entry.outputs
                                                                      .iter()
                                                                      .map(|s| s.checksum.clone())
                                                                      .collect(),
                                                    });
                            debug!(stage = %stage.name, "stage succeeded");
                            self.emit_metrics(stage, &entry.outputs);
                            outcomes.push(StageOutcome { stage: stage.name.clone(),
                                                         status: StageStatus::Succeeded,
                                                         fingerprint: Some(fingerprint.clone()),
                                                         error: None });
                            None
                        }
                        Err(missing) => Some(missing),
                    }
                }
            };

            if let Some(error) = failure {
                statuses[idx] = StageStatus::Failed;
                self.events.append_kind(run_id,
                                        PipelineEventKind::StageFailed { stage: stage.name.clone(),
                                                                         error: error.to_string() });
                warn!(stage = %stage.name, %error, "stage failed, blocking dependents");
                outcomes.push(StageOutcome { stage: stage.name.clone(),
                                             status: StageStatus::Failed,
                                             fingerprint: Some(fingerprint),
                                             error: Some(error.to_string()) });
                self.block_downstream(graph, idx, run_id, &mut statuses, &mut blocked_by);
            }
        }

        let report = RunReport { run_id,
                                 outcomes,
                                 started_at,
                                 finished_at: chrono::Utc::now() };
        self.events.append_kind(run_id,
                                PipelineEventKind::RunCompleted { succeeded: report.succeeded(),
                                                                  skipped: report.skipped(),
                                                                  failed: report.failed(),
                                                                  blocked: report.blocked() });
        info!(%run_id,
              succeeded = report.succeeded(),
              skipped = report.skipped(),
              failed = report.failed(),
              blocked = report.blocked(),
              "pipeline run completed");
        Ok(report)
    }

    /// Los insumos que ningún stage produce deben existir en el workspace
    /// antes de ejecutar nada (fail-fast de referencias colgantes).
    fn check_external_inputs(&self, graph: &StageGraph, workspace: &dyn Workspace) -> Result<(), PipelineError> {
        for path in graph.external_inputs() {
            if !workspace.contains(path)? {
                let consumer = graph.stages()
                                    .iter()
                                    .find(|s| s.inputs.iter().any(|i| i == path))
                                    .map(|s| s.name.clone())
                                    .unwrap_or_default();
                return Err(GraphError::DanglingInput { stage: consumer,
                                                       artifact: path.to_string() }.into());
            }
        }
        Ok(())
    }

    /// Resuelve los fingerprints actuales de los inputs de un stage: outputs
    /// ya computados en esta corrida primero, contenido del workspace para
    /// los insumos externos.
    fn resolve_inputs(&self,
                      stage: &Stage,
                      resolved: &HashMap<String, String>,
                      workspace: &dyn Workspace)
                      -> Result<Vec<ArtifactRef>, PipelineError> {
        let mut refs = Vec::with_capacity(stage.inputs.len());
        for path in &stage.inputs {
            let fingerprint = match resolved.get(path) {
                Some(fp) => fp.clone(),
                None => match workspace.read(path)? {
                    Some(bytes) => self.hasher.fingerprint_bytes(&bytes),
                    // Validado al inicio; si desapareció en medio de la
                    // corrida lo tratamos igual que entonces.
                    None => {
                        return Err(GraphError::DanglingInput { stage: stage.name.clone(),
                                                               artifact: path.clone() }.into())
                    }
                },
            };
            refs.push(ArtifactRef::new(path.clone(), fingerprint));
        }
        Ok(refs)
    }

    /// Lee y fingerprinta los outputs declarados tras un run exitoso. Un
    /// output ausente convierte el éxito de la unidad en fallo del stage.
    #[allow(clippy::type_complexity)]
    fn collect_outputs(&self,
                       stage: &Stage,
                       workspace: &dyn Workspace)
                       -> Result<Result<Vec<ArtifactSnapshot>, ExecutionError>, PipelineError> {
        let mut snapshots = Vec::with_capacity(stage.outputs.len());
        for path in &stage.outputs {
            match workspace.read(path)? {
                Some(bytes) => {
                    let checksum = self.hasher.fingerprint_bytes(&bytes);
                    snapshots.push(ArtifactSnapshot::new(path.clone(), bytes, checksum));
                }
                None => {
                    return Ok(Err(ExecutionError::MissingOutput { stage: stage.name.clone(),
                                                                  artifact: path.clone() }))
                }
            }
        }
        Ok(Ok(snapshots))
    }

    /// Marca `Blocked` todo dependiente transitivo aún pendiente del stage
    /// fallido. Sólo la rama afectada se detiene.
    fn block_downstream(&mut self,
                        graph: &StageGraph,
                        failed: usize,
                        run_id: Uuid,
                        statuses: &mut [StageStatus],
                        blocked_by: &mut [Option<String>]) {
        let failed_name = graph.stages()[failed].name.clone();
        let mut frontier = vec![failed];
        while let Some(current) = frontier.pop() {
            for dependent in graph.dependents(current) {
                if statuses[dependent] == StageStatus::Pending {
                    statuses[dependent] = StageStatus::Blocked;
                    blocked_by[dependent] = Some(failed_name.clone());
                    self.events.append_kind(run_id,
                                            PipelineEventKind::StageBlocked {
                                                stage: graph.stages()[dependent].name.clone(),
                                                failed_dependency: failed_name.clone(),
                                            });
                    frontier.push(dependent);
                }
            }
        }
    }

    /// Empaqueta y entrega métricas si el stage declara un output de
    /// métricas. Telemetría, no gate de corrección: contenido no-objeto se
    /// reporta y se omite.
    fn emit_metrics(&mut self, stage: &Stage, snapshots: &[ArtifactSnapshot]) {
        let Some(metrics_path) = &stage.metrics_output else {
            return;
        };
        let Some(snapshot) = snapshots.iter().find(|s| &s.path == metrics_path) else {
            warn!(stage = %stage.name, path = %metrics_path, "metrics output not among snapshots");
            return;
        };
        match package_metrics(&snapshot.bytes) {
            Some(metrics) => self.metrics.record(&stage.name, &metrics),
            None => warn!(stage = %stage.name, path = %metrics_path, "metrics output is not a JSON object"),
        }
    }
}
