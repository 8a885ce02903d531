//! `StageGraph`: conjunto de stages con aristas derivadas de sus artefactos.
//!
//! Las aristas no se declaran: el stage B depende de A cuando algún input de
//! B es output de A. `add_stage` rechaza duplicados y ciclos dejando el
//! grafo intacto, de modo que un grafo construido es siempre un DAG y el
//! orden topológico existe por invariante.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::json;

use super::definition::PipelineDefinition;
use crate::errors::GraphError;
use crate::hashing::hash_value;
use crate::stage::{Stage, StageUnit};

#[derive(Default)]
pub struct StageGraph {
    stages: Vec<Stage>, // orden de declaración, desempate del orden topológico
    /// output path -> índice del stage productor, en orden de declaración.
    producers: IndexMap<String, usize>,
    names: HashMap<String, usize>,
}

impl StageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye el grafo desde la definición declarativa, ligando cada
    /// stage a su unidad por nombre. Nombres duplicados, unidades ausentes,
    /// outputs repetidos y ciclos fallan aquí, antes de cualquier ejecución.
    pub fn from_definition(definition: PipelineDefinition,
                           mut units: HashMap<String, Box<dyn StageUnit>>)
                           -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for spec in definition.stages {
            let unit = units.remove(&spec.name)
                            .ok_or_else(|| GraphError::UnboundUnit { stage: spec.name.clone() })?;
            let params = match spec.params {
                serde_json::Value::Null => json!({}),
                obj @ serde_json::Value::Object(_) => obj,
                other => {
                    return Err(GraphError::Malformed(format!("params of stage '{}' must be an object, got {}",
                                                             spec.name, other)))
                }
            };
            let mut stage = Stage::new(spec.name, spec.inputs, spec.outputs, params, unit);
            if let Some(metrics) = spec.metrics {
                if !stage.outputs.contains(&metrics) {
                    return Err(GraphError::Malformed(format!("metrics path '{}' of stage '{}' is not a declared output",
                                                             metrics, stage.name)));
                }
                stage = stage.with_metrics_output(metrics);
            }
            graph.add_stage(stage)?;
        }
        Ok(graph)
    }

    /// Inserta un stage validando invariantes. En caso de error el grafo no
    /// cambia.
    pub fn add_stage(&mut self, stage: Stage) -> Result<(), GraphError> {
        if self.names.contains_key(&stage.name) {
            return Err(GraphError::DuplicateStage(stage.name));
        }
        if let Some(path) = stage.outputs.iter().find(|o| stage.inputs.contains(o)) {
            return Err(GraphError::SelfCycle { stage: stage.name.clone(),
                                               artifact: path.clone() });
        }
        if let Some((path, producer)) = stage.outputs
                                             .iter()
                                             .find_map(|o| self.producers.get(o).map(|&p| (o, p)))
        {
            return Err(GraphError::DuplicateOutput { artifact: path.clone(),
                                                     producer: self.stages[producer].name.clone() });
        }

        // Inserción tentativa: las aristas derivan de `producers`, así que
        // el chequeo de ciclo corre sobre el estado ya extendido.
        let idx = self.stages.len();
        let name = stage.name.clone();
        for output in &stage.outputs {
            self.producers.insert(output.clone(), idx);
        }
        self.names.insert(name.clone(), idx);
        self.stages.push(stage);

        if self.try_order().is_none() {
            let removed = self.stages.pop();
            self.names.remove(&name);
            if let Some(stage) = removed {
                for output in &stage.outputs {
                    self.producers.shift_remove(output.as_str());
                }
            }
            return Err(GraphError::Cycle { stage: name });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn get(&self, name: &str) -> Option<&Stage> {
        self.names.get(name).map(|&i| &self.stages[i])
    }

    /// Índices de los stages productores de los inputs de `idx`, en orden
    /// declarado y sin repetir.
    pub fn dependencies(&self, idx: usize) -> Vec<usize> {
        let mut deps = Vec::new();
        for input in &self.stages[idx].inputs {
            if let Some(&p) = self.producers.get(input) {
                if !deps.contains(&p) {
                    deps.push(p);
                }
            }
        }
        deps
    }

    /// Índices de los stages que consumen directamente algún output de
    /// `idx`.
    pub fn dependents(&self, idx: usize) -> Vec<usize> {
        (0..self.stages.len()).filter(|&j| self.dependencies(j).contains(&idx))
                              .collect()
    }

    /// Inputs que ningún stage produce: artefactos fuente externos. En orden
    /// de primera aparición, sin repetir.
    pub fn external_inputs(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for stage in &self.stages {
            for input in &stage.inputs {
                if !self.producers.contains_key(input) && !seen.contains(&input.as_str()) {
                    seen.push(input.as_str());
                }
            }
        }
        seen
    }

    /// Orden total determinista consistente con las aristas; empates entre
    /// stages independientes se resuelven por orden de declaración, así dos
    /// corridas sobre un grafo sin cambios agendan idéntico.
    pub fn topological_order(&self) -> Vec<usize> {
        // None sólo si el invariante DAG se rompió; add_stage lo impide.
        let order = self.try_order();
        debug_assert!(order.is_some(), "graph invariant broken: cycle in accepted graph");
        order.unwrap_or_default()
    }

    /// Kahn con selección del índice mínimo listo. `None` si hay ciclo.
    fn try_order(&self) -> Option<Vec<usize>> {
        let n = self.stages.len();
        let deps: Vec<Vec<usize>> = (0..n).map(|i| self.dependencies(i)).collect();
        let mut remaining: Vec<usize> = deps.iter().map(|d| d.len()).collect();
        let mut emitted = vec![false; n];
        let mut order = Vec::with_capacity(n);

        while order.len() < n {
            let next = (0..n).find(|&i| !emitted[i] && remaining[i] == 0)?;
            emitted[next] = true;
            order.push(next);
            for j in 0..n {
                if !emitted[j] && deps[j].contains(&next) {
                    remaining[j] -= 1;
                }
            }
        }
        Some(order)
    }

    /// Hash canónico de la interfaz del grafo (nombres + artefactos por
    /// stage). Se registra en eventos de corrida como procedencia; NO entra
    /// en los fingerprints por stage, para que añadir un stage no
    /// relacionado no invalide caches ajenas.
    pub fn definition_hash(&self) -> String {
        let shape: Vec<serde_json::Value> = self.stages
                                                .iter()
                                                .map(|s| {
                                                    json!({
                                                        "name": s.name,
                                                        "inputs": s.inputs,
                                                        "outputs": s.outputs,
                                                    })
                                                })
                                                .collect();
        hash_value(&json!(shape))
    }
}

impl std::fmt::Debug for StageGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageGraph")
         .field("stages", &self.stages.iter().map(|s| s.name.as_str()).collect::<Vec<_>>())
         .finish()
    }
}
