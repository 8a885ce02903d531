//! Adaptador de closures al contrato `StageUnit`.

use modelflow_core::errors::StageError;
use modelflow_core::model::StageContext;
use modelflow_core::stage::{StageRunResult, StageUnit};

/// Envuelve una closure como unidad de stage. Útil para tests y para
/// pipelines definidos programáticamente sin tipos dedicados.
pub struct FnUnit<F>
    where F: Fn(&mut StageContext<'_>) -> Result<(), StageError>
{
    f: F,
}

impl<F> FnUnit<F> where F: Fn(&mut StageContext<'_>) -> Result<(), StageError>
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> StageUnit for FnUnit<F> where F: Fn(&mut StageContext<'_>) -> Result<(), StageError>
{
    fn run(&self, ctx: &mut StageContext<'_>) -> StageRunResult {
        StageRunResult::from_result((self.f)(ctx))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use modelflow_core::workspace::Workspace;
    use modelflow_core::{InMemoryWorkspace, PipelineExecutor, Stage, StageGraph};

    use super::*;

    #[test]
    fn closure_unit_runs_inside_a_pipeline() {
        let mut graph = StageGraph::new();
        graph.add_stage(Stage::new("emit",
                                   vec![],
                                   vec!["out.txt".into()],
                                   json!({}),
                                   Box::new(FnUnit::new(|ctx: &mut StageContext<'_>| {
                                       let out = ctx.output_path(0)?.to_string();
                                       ctx.write(&out, b"from closure")
                                   }))))
             .expect("emit stage");

        let mut workspace = InMemoryWorkspace::new();
        let mut executor = PipelineExecutor::in_memory();
        let report = executor.run(&graph, &mut workspace).expect("run");
        assert_eq!(report.succeeded(), 1);
        assert_eq!(workspace.read("out.txt").expect("read").expect("bytes"), b"from closure");
    }
}
