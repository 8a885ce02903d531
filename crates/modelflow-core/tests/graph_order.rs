use std::collections::HashMap;

use serde_json::json;
use modelflow_core::{GraphError, PipelineDefinition, Stage, StageContext, StageGraph, StageRunResult, StageUnit};

struct NopUnit;
impl StageUnit for NopUnit {
    fn run(&self, _ctx: &mut StageContext<'_>) -> StageRunResult {
        StageRunResult::Success
    }
}

fn stage(name: &str, inputs: &[&str], outputs: &[&str]) -> Stage {
    Stage::new(name,
               inputs.iter().map(|s| s.to_string()).collect(),
               outputs.iter().map(|s| s.to_string()).collect(),
               json!({}),
               Box::new(NopUnit))
}

fn diamond() -> StageGraph {
    // a -> b, a -> c, (b, c) -> d
    let mut graph = StageGraph::new();
    graph.add_stage(stage("a", &[], &["x"])).expect("a");
    graph.add_stage(stage("b", &["x"], &["y"])).expect("b");
    graph.add_stage(stage("c", &["x"], &["z"])).expect("c");
    graph.add_stage(stage("d", &["y", "z"], &["w"])).expect("d");
    graph
}

#[test]
fn topological_order_respects_every_edge() {
    let graph = diamond();
    let order = graph.topological_order();
    let pos = |name: &str| {
        order.iter()
             .position(|&i| graph.stages()[i].name == name)
             .expect("stage in order")
    };
    assert!(pos("a") < pos("b"));
    assert!(pos("a") < pos("c"));
    assert!(pos("b") < pos("d"));
    assert!(pos("c") < pos("d"));
}

#[test]
fn ties_break_by_declaration_order_and_order_is_stable() {
    let graph = diamond();
    // b and c are independent; b was declared first.
    assert_eq!(graph.topological_order(), vec![0, 1, 2, 3]);
    // Stable across repeated calls on an unchanged graph.
    assert_eq!(graph.topological_order(), graph.topological_order());

    // Same stages, c declared before b: schedule follows declaration.
    let mut swapped = StageGraph::new();
    swapped.add_stage(stage("a", &[], &["x"])).expect("a");
    swapped.add_stage(stage("c", &["x"], &["z"])).expect("c");
    swapped.add_stage(stage("b", &["x"], &["y"])).expect("b");
    swapped.add_stage(stage("d", &["y", "z"], &["w"])).expect("d");
    let names: Vec<&str> = swapped.topological_order()
                                  .into_iter()
                                  .map(|i| swapped.stages()[i].name.as_str())
                                  .collect();
    assert_eq!(names, vec!["a", "c", "b", "d"]);
}

#[test]
fn independent_stages_keep_declaration_order() {
    let mut graph = StageGraph::new();
    graph.add_stage(stage("s1", &[], &["o1"])).expect("s1");
    graph.add_stage(stage("s2", &[], &["o2"])).expect("s2");
    graph.add_stage(stage("s3", &[], &["o3"])).expect("s3");
    assert_eq!(graph.topological_order(), vec![0, 1, 2]);
}

#[test]
fn cycle_is_rejected_and_graph_stays_usable() {
    let mut graph = StageGraph::new();
    graph.add_stage(stage("a", &["p"], &["q"])).expect("a");
    let err = graph.add_stage(stage("b", &["q"], &["p"])).expect_err("cycle");
    assert_eq!(err, GraphError::Cycle { stage: "b".into() });
    // Rejected insertion left no trace.
    assert_eq!(graph.len(), 1);
    assert!(graph.get("b").is_none());
    assert_eq!(graph.topological_order(), vec![0]);
}

#[test]
fn duplicate_output_names_the_existing_producer() {
    let mut graph = StageGraph::new();
    graph.add_stage(stage("first", &[], &["shared"])).expect("first");
    let err = graph.add_stage(stage("second", &[], &["shared"])).expect_err("dup output");
    assert_eq!(err,
               GraphError::DuplicateOutput { artifact: "shared".into(),
                                             producer: "first".into() });
}

#[test]
fn duplicate_stage_name_is_rejected() {
    let mut graph = StageGraph::new();
    graph.add_stage(stage("train", &[], &["m1"])).expect("train");
    let err = graph.add_stage(stage("train", &[], &["m2"])).expect_err("dup name");
    assert_eq!(err, GraphError::DuplicateStage("train".into()));
}

#[test]
fn self_cycle_is_rejected() {
    let mut graph = StageGraph::new();
    let err = graph.add_stage(stage("loopy", &["a"], &["a"])).expect_err("self cycle");
    assert_eq!(err,
               GraphError::SelfCycle { stage: "loopy".into(),
                                       artifact: "a".into() });
}

#[test]
fn external_inputs_are_the_unproduced_ones() {
    let graph = diamond();
    assert_eq!(graph.external_inputs(), Vec::<&str>::new());

    let mut graph = StageGraph::new();
    graph.add_stage(stage("ingest", &["data/raw.csv"], &["data/clean.csv"]))
         .expect("ingest");
    graph.add_stage(stage("train", &["data/clean.csv", "config/extra.json"], &["model.bin"]))
         .expect("train");
    assert_eq!(graph.external_inputs(), vec!["data/raw.csv", "config/extra.json"]);
}

#[test]
fn definition_hash_ignores_params_but_not_shape() {
    let mut a = StageGraph::new();
    a.add_stage(Stage::new("s", vec![], vec!["o".into()], json!({"lr": 0.1}), Box::new(NopUnit)))
     .expect("s");
    let mut b = StageGraph::new();
    b.add_stage(Stage::new("s", vec![], vec!["o".into()], json!({"lr": 0.9}), Box::new(NopUnit)))
     .expect("s");
    assert_eq!(a.definition_hash(), b.definition_hash());

    let mut c = StageGraph::new();
    c.add_stage(Stage::new("s", vec![], vec!["other".into()], json!({"lr": 0.1}), Box::new(NopUnit)))
     .expect("s");
    assert_ne!(a.definition_hash(), c.definition_hash());
}

fn units_for(names: &[&str]) -> HashMap<String, Box<dyn StageUnit>> {
    names.iter()
         .map(|n| (n.to_string(), Box::new(NopUnit) as Box<dyn StageUnit>))
         .collect()
}

#[test]
fn definition_builds_a_graph_with_bound_units() {
    let text = r#"{
        "stages": [
            {"name": "ingest", "inputs": ["data/raw.csv"], "outputs": ["data/clean.csv"]},
            {"name": "train", "inputs": ["data/clean.csv"], "outputs": ["model.bin", "reports/metrics.json"],
             "params": {"lr": 0.1}, "metrics": "reports/metrics.json"}
        ]
    }"#;
    let definition = PipelineDefinition::from_json(text).expect("parse");
    let graph = StageGraph::from_definition(definition, units_for(&["ingest", "train"])).expect("graph");
    assert_eq!(graph.len(), 2);
    let train = graph.get("train").expect("train");
    assert_eq!(train.metrics_output.as_deref(), Some("reports/metrics.json"));
    assert_eq!(train.params["lr"], json!(0.1));
}

#[test]
fn definition_without_unit_fails_fast() {
    let definition = PipelineDefinition::from_json(r#"{"stages": [{"name": "lonely"}]}"#).expect("parse");
    let err = StageGraph::from_definition(definition, HashMap::new()).expect_err("no unit");
    assert_eq!(err, GraphError::UnboundUnit { stage: "lonely".into() });
}

#[test]
fn definition_with_non_object_params_fails_fast() {
    let definition =
        PipelineDefinition::from_json(r#"{"stages": [{"name": "s", "params": [1, 2]}]}"#).expect("parse");
    let err = StageGraph::from_definition(definition, units_for(&["s"])).expect_err("bad params");
    assert!(matches!(err, GraphError::Malformed(_)));
}

#[test]
fn definition_with_foreign_metrics_path_fails_fast() {
    let definition = PipelineDefinition::from_json(
        r#"{"stages": [{"name": "s", "outputs": ["o"], "metrics": "not-an-output"}]}"#,
    ).expect("parse");
    let err = StageGraph::from_definition(definition, units_for(&["s"])).expect_err("bad metrics");
    assert!(matches!(err, GraphError::Malformed(_)));
}

#[test]
fn malformed_json_is_a_graph_error() {
    let err = PipelineDefinition::from_json("{not json").expect_err("malformed");
    assert!(matches!(err, GraphError::Malformed(_)));
}
