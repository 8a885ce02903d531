//! Demo end-to-end: definición declarativa → dos corridas del pipeline
//! (la segunda íntegra desde cache) → registro, staging y promoción del
//! modelo entrenado → lectura desde el lado de serving.

use std::collections::HashMap;
use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use modelflow_adapters::{
    EvaluateUnit, FlowConfig, FsCacheStore, FsRegistrySnapshot, FsWorkspace, IngestUnit, PreprocessUnit,
    TracingMetricsRecorder, TrainUnit,
};
use modelflow_core::metrics::package_metrics;
use modelflow_core::{
    InMemoryEventStore, PipelineDefinition, PipelineExecutor, RunReport, StageGraph, StageUnit, Workspace,
};
use modelflow_registry::{LifecycleStage, ModelRegistry, PromotionRequest};

const PIPELINE_JSON: &str = r#"{
    "stages": [
        {"name": "ingest",
         "inputs": ["data/raw.csv"],
         "outputs": ["data/ingested.csv"]},
        {"name": "preprocess",
         "inputs": ["data/ingested.csv"],
         "outputs": ["data/features.csv"]},
        {"name": "train",
         "inputs": ["data/features.csv"],
         "outputs": ["models/model.json"],
         "params": {"learning_rate": 0.5}},
        {"name": "evaluate",
         "inputs": ["models/model.json", "data/features.csv"],
         "outputs": ["reports/metrics.json"],
         "metrics": "reports/metrics.json"}
    ]
}"#;

const RAW_SAMPLE: &str = "\
1,Great product would buy again
0,Terrible experience awful support
1,Fine quality great value
0,Awful build bad finish
1,Great support great price
";

fn print_report(label: &str, report: &RunReport) {
    println!("{label} (run {}):", report.run_id);
    for outcome in &report.outcomes {
        println!("  {:<12} {:?}", outcome.stage, outcome.status);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env()
                                                  .unwrap_or_else(|_| EnvFilter::new("info")))
                             .init();

    let config = FlowConfig::from_env();
    let mut workspace = FsWorkspace::new(&config.workspace_dir)?;
    if !workspace.contains("data/raw.csv")? {
        workspace.write("data/raw.csv", RAW_SAMPLE.as_bytes())?;
        info!("seeded demo dataset at data/raw.csv");
    }

    let definition = PipelineDefinition::from_json(PIPELINE_JSON)?;
    let mut units: HashMap<String, Box<dyn StageUnit>> = HashMap::new();
    units.insert("ingest".into(), Box::new(IngestUnit));
    units.insert("preprocess".into(), Box::new(PreprocessUnit));
    units.insert("train".into(), Box::new(TrainUnit));
    units.insert("evaluate".into(), Box::new(EvaluateUnit));
    let graph = StageGraph::from_definition(definition, units)?;

    let cache = FsCacheStore::from_config(&config)?;
    let mut executor = PipelineExecutor::new(cache, InMemoryEventStore::new(), TracingMetricsRecorder);

    let first = executor.run(&graph, &mut workspace)?;
    print_report("first run", &first);

    // Misma definición, mismos datos: nada debe ejecutarse de nuevo.
    let second = executor.run(&graph, &mut workspace)?;
    print_report("second run", &second);

    let metrics_bytes = workspace.read("reports/metrics.json")?
                                 .ok_or("evaluate stage left no metrics output")?;
    let metrics = package_metrics(&metrics_bytes).ok_or("metrics output is not a JSON object")?;

    let registry = ModelRegistry::new();
    let staged = registry.register_and_stage("sentiment", "models/model.json", metrics)?;
    println!("registered {} v{} into {}", staged.name, staged.version, staged.stage);

    let promoted = registry.promote(&PromotionRequest::new("sentiment", staged.version, LifecycleStage::Production))?;
    println!("promoted {} v{} to {}", promoted.name, promoted.version, promoted.stage);

    // Lo que vería la capa de serving.
    match registry.get_latest("sentiment", LifecycleStage::Production) {
        Some(serving) => println!("serving {} v{} ({:?})", serving.name, serving.version, serving.metrics),
        None => println!("no model available yet"),
    }

    let persistence = FsRegistrySnapshot::new(config.cache_dir.with_file_name("registry.json"), config.retry_max);
    persistence.save(&registry.snapshot())?;

    Ok(())
}
