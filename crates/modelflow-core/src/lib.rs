//! modelflow-core: motor determinista de pipelines con cache direccionada
//! por contenido.

pub mod cache;
pub mod constants;
pub mod errors;
pub mod event;
pub mod executor;
pub mod graph;
pub mod hashing;
pub mod metrics;
pub mod model;
pub mod stage;
pub mod workspace;

pub use cache::{CacheEntry, CacheStore, InMemoryCacheStore};
pub use errors::{CacheError, ExecutionError, GraphError, PipelineError, StageError, WorkspaceError};
pub use event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
pub use executor::{PipelineExecutor, RunReport, StageOutcome};
pub use graph::{PipelineDefinition, StageGraph, StageSpec};
pub use hashing::ContentHasher;
pub use metrics::{MemoryMetricsRecorder, MetricsRecorder, NoopMetricsRecorder};
pub use model::{ArtifactRef, ArtifactSnapshot, StageContext};
pub use stage::{Stage, StageRunResult, StageStatus, StageUnit};
pub use workspace::{InMemoryWorkspace, Workspace};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct SeedUnit {
        payload: &'static [u8],
    }
    impl StageUnit for SeedUnit {
        fn run(&self, ctx: &mut StageContext<'_>) -> StageRunResult {
            StageRunResult::from_result(ctx.write("data/seed.txt", self.payload))
        }
    }

    struct UpperUnit;
    impl StageUnit for UpperUnit {
        fn run(&self, ctx: &mut StageContext<'_>) -> StageRunResult {
            let bytes = match ctx.read_input(0) {
                Ok(bytes) => bytes,
                Err(error) => return StageRunResult::Failure { error },
            };
            StageRunResult::from_result(ctx.write("data/upper.txt", &bytes.to_ascii_uppercase()))
        }
    }

    fn linear_graph() -> StageGraph {
        let mut graph = StageGraph::new();
        graph.add_stage(Stage::new("seed",
                                   vec![],
                                   vec!["data/seed.txt".into()],
                                   json!({}),
                                   Box::new(SeedUnit { payload: b"hola" })))
             .expect("seed stage");
        graph.add_stage(Stage::new("upper",
                                   vec!["data/seed.txt".into()],
                                   vec!["data/upper.txt".into()],
                                   json!({}),
                                   Box::new(UpperUnit)))
             .expect("upper stage");
        graph
    }

    #[test]
    fn linear_run_then_full_cache_hit() {
        let graph = linear_graph();
        let mut workspace = InMemoryWorkspace::new();
        let mut executor = PipelineExecutor::in_memory();

        let first = executor.run(&graph, &mut workspace).expect("first run");
        assert_eq!(first.succeeded(), 2);
        assert_eq!(workspace.read("data/upper.txt").unwrap().unwrap(), b"HOLA");

        // Second run over unchanged state: zero Running transitions.
        let second = executor.run(&graph, &mut workspace).expect("second run");
        assert_eq!(second.ran(), 0);
        assert_eq!(second.skipped(), 2);
    }

    #[test]
    fn param_key_order_does_not_change_fingerprint() {
        let hasher = ContentHasher::new();
        let a = Stage::new("s",
                           vec![],
                           vec!["out".into()],
                           json!({"alpha": 1, "beta": 2}),
                           Box::new(SeedUnit { payload: b"x" }));
        let b = Stage::new("s",
                           vec![],
                           vec!["out".into()],
                           json!({"beta": 2, "alpha": 1}),
                           Box::new(SeedUnit { payload: b"x" }));
        assert_eq!(hasher.stage_fingerprint(&a, &[]), hasher.stage_fingerprint(&b, &[]));
    }

    #[test]
    fn param_value_change_changes_fingerprint() {
        let hasher = ContentHasher::new();
        let a = Stage::new("s",
                           vec![],
                           vec!["out".into()],
                           json!({"lr": 0.1}),
                           Box::new(SeedUnit { payload: b"x" }));
        let b = Stage::new("s",
                           vec![],
                           vec!["out".into()],
                           json!({"lr": 0.2}),
                           Box::new(SeedUnit { payload: b"x" }));
        assert_ne!(hasher.stage_fingerprint(&a, &[]), hasher.stage_fingerprint(&b, &[]));
    }
}
