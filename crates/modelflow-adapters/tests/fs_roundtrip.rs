//! Integración sobre filesystem: workspace, cache durable con manifiestos
//! estables y snapshot del registro.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde_json::json;
use uuid::Uuid;

use modelflow_adapters::{
    EvaluateUnit, FsCacheStore, FsRegistrySnapshot, FsWorkspace, IngestUnit, PreprocessUnit, TrainUnit,
};
use modelflow_core::{
    ArtifactSnapshot, CacheEntry, CacheError, CacheStore, ContentHasher, InMemoryEventStore,
    NoopMetricsRecorder, PipelineExecutor, Stage, StageGraph, Workspace,
};
use modelflow_registry::{LifecycleStage, ModelRegistry, PromotionRequest};

/// Directorio de trabajo propio por test, bajo el tmp del sistema.
struct Scratch {
    root: PathBuf,
}

impl Scratch {
    fn new(label: &str) -> Self {
        let root = std::env::temp_dir().join(format!("modelflow-{label}-{}", Uuid::new_v4()));
        fs::create_dir_all(&root).expect("scratch dir");
        Self { root }
    }

    fn path(&self, sub: &str) -> PathBuf {
        self.root.join(sub)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn snapshot(path: &str, bytes: &[u8]) -> ArtifactSnapshot {
    let hasher = ContentHasher::new();
    ArtifactSnapshot::new(path, bytes.to_vec(), hasher.fingerprint_bytes(bytes))
}

#[test]
fn fs_workspace_reads_what_it_wrote() {
    let scratch = Scratch::new("ws");
    let mut workspace = FsWorkspace::new(scratch.path("workspace")).expect("workspace");

    assert!(!workspace.contains("data/raw.csv").expect("contains"));
    workspace.write("data/raw.csv", b"1,hello\n").expect("write");
    assert!(workspace.contains("data/raw.csv").expect("contains"));
    assert_eq!(workspace.read("data/raw.csv").expect("read").expect("bytes"), b"1,hello\n");
    assert!(workspace.read("missing").expect("read").is_none());
}

#[test]
fn fs_cache_round_trip_is_byte_identical_across_instances() {
    let scratch = Scratch::new("cache");
    let store = FsCacheStore::new(scratch.path("cache"), 3).expect("store");
    let outputs = vec![snapshot("models/model.bin", b"\x00weights\xff"),
                       snapshot("reports/metrics.json", br#"{"acc":0.9}"#)];
    store.commit(CacheEntry::new("fp-disk", outputs.clone())).expect("commit");

    // A fresh instance over the same directory reads the same manifest:
    // the on-disk format is the cross-machine contract.
    let reopened = FsCacheStore::new(scratch.path("cache"), 3).expect("reopen");
    let entry = reopened.lookup("fp-disk").expect("lookup").expect("entry");
    assert_eq!(entry.outputs, outputs);

    let mut workspace = FsWorkspace::new(scratch.path("restore")).expect("workspace");
    reopened.restore(&entry, &mut workspace).expect("restore");
    assert_eq!(workspace.read("models/model.bin").expect("read").expect("bytes"),
               b"\x00weights\xff");
}

#[test]
fn fs_cache_divergent_commit_is_inconsistency() {
    let scratch = Scratch::new("cache-div");
    let store = FsCacheStore::new(scratch.path("cache"), 3).expect("store");
    store.commit(CacheEntry::new("fp", vec![snapshot("a", b"original")])).expect("first");
    store.commit(CacheEntry::new("fp", vec![snapshot("a", b"original")])).expect("idempotent");

    let err = store.commit(CacheEntry::new("fp", vec![snapshot("a", b"mutant")]))
                   .expect_err("divergent");
    assert!(matches!(err, CacheError::Inconsistency { .. }));

    let entry = store.lookup("fp").expect("lookup").expect("entry");
    assert_eq!(entry.outputs[0].bytes, b"original");
}

#[test]
fn fs_cache_missing_fingerprint_is_clean_missing() {
    let scratch = Scratch::new("cache-miss");
    let store = FsCacheStore::new(scratch.path("cache"), 3).expect("store");
    assert!(store.lookup("never-committed").expect("lookup").is_none());
}

fn demo_graph() -> StageGraph {
    let mut graph = StageGraph::new();
    graph.add_stage(Stage::new("ingest",
                               vec!["data/raw.csv".into()],
                               vec!["data/ingested.csv".into()],
                               json!({}),
                               Box::new(IngestUnit)))
         .expect("ingest");
    graph.add_stage(Stage::new("preprocess",
                               vec!["data/ingested.csv".into()],
                               vec!["data/features.csv".into()],
                               json!({}),
                               Box::new(PreprocessUnit)))
         .expect("preprocess");
    graph.add_stage(Stage::new("train",
                               vec!["data/features.csv".into()],
                               vec!["models/model.json".into()],
                               json!({"learning_rate": 0.5}),
                               Box::new(TrainUnit)))
         .expect("train");
    graph.add_stage(Stage::new("evaluate",
                               vec!["models/model.json".into(), "data/features.csv".into()],
                               vec!["reports/metrics.json".into()],
                               json!({}),
                               Box::new(EvaluateUnit))
                        .with_metrics_output("reports/metrics.json"))
         .expect("evaluate");
    graph
}

#[test]
fn durable_pipeline_run_registers_and_promotes_a_model() {
    let scratch = Scratch::new("e2e");
    let mut workspace = FsWorkspace::new(scratch.path("workspace")).expect("workspace");
    workspace.write("data/raw.csv", b"1,Good fine\n\n0,Bad awful\n1,Good again\n")
             .expect("seed raw data");

    let cache = FsCacheStore::new(scratch.path("cache"), 3).expect("cache");
    let mut executor = PipelineExecutor::new(cache, InMemoryEventStore::new(), NoopMetricsRecorder);
    let graph = demo_graph();

    let first = executor.run(&graph, &mut workspace).expect("first run");
    assert_eq!(first.succeeded(), 4);

    // Second run against the same durable cache: everything skips.
    let second = executor.run(&graph, &mut workspace).expect("second run");
    assert_eq!(second.ran(), 0);
    assert_eq!(second.skipped(), 4);

    // Terminal stage output feeds the registry as the metrics snapshot.
    let metrics_bytes = workspace.read("reports/metrics.json").expect("read").expect("metrics");
    let metrics = modelflow_core::metrics::package_metrics(&metrics_bytes).expect("numeric metrics");
    assert!(metrics.contains_key("accuracy"));

    let registry = ModelRegistry::new();
    let staged = registry.register_and_stage("demo", "models/model.json", metrics).expect("register");
    assert_eq!(staged.stage, LifecycleStage::Staging);
    registry.promote(&PromotionRequest::new("demo", staged.version, LifecycleStage::Production))
            .expect("promote");
    assert_eq!(registry.get_latest("demo", LifecycleStage::Production).expect("serving").version,
               staged.version);

    // Registry snapshot round-trips through disk.
    let persistence = FsRegistrySnapshot::new(scratch.path("registry.json"), 3);
    persistence.save(&registry.snapshot()).expect("save");
    let restored = persistence.load().expect("load").expect("snapshot");
    assert_eq!(restored, registry.snapshot());
}

#[test]
fn registry_snapshot_load_before_save_is_none() {
    let scratch = Scratch::new("reg-none");
    let persistence = FsRegistrySnapshot::new(scratch.path("registry.json"), 3);
    assert!(persistence.load().expect("load").is_none());
}

#[test]
fn config_defaults_are_populated() {
    let config = modelflow_adapters::FlowConfig::from_env();
    assert!(config.retry_max >= 1);
    assert!(!config.cache_dir.as_os_str().is_empty());
    assert!(!config.workspace_dir.as_os_str().is_empty());
}
