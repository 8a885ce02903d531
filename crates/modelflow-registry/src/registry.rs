//! `ModelRegistry`: registro concurrente de versiones con promoción
//! transaccional.
//!
//! Concurrencia: cada nombre de modelo tiene su propio `Mutex`, tomado
//! durante toda la transacción de promoción. Promociones concurrentes sobre
//! el mismo nombre se serializan: cada solicitud valida contra el estado
//! que dejó la anterior (last-committed-wins explícito, sin error de
//! conflicto). Ningún lector observa jamás dos versiones `Production`
//! porque la democión y la promoción ocurren dentro de la misma sección
//! crítica.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::events::{NoopPromotionSink, PromotionEvent, PromotionSink};
use crate::model::{LifecycleStage, ModelVersion, PromotionRequest, RegistrySnapshot};

type VersionLog = Arc<Mutex<Vec<ModelVersion>>>;

pub struct ModelRegistry<S: PromotionSink = NoopPromotionSink> {
    models: DashMap<String, VersionLog>,
    sink: S,
}

impl ModelRegistry<NoopPromotionSink> {
    pub fn new() -> Self {
        Self::with_sink(NoopPromotionSink)
    }
}

impl Default for ModelRegistry<NoopPromotionSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PromotionSink> ModelRegistry<S> {
    pub fn with_sink(sink: S) -> Self {
        Self { models: DashMap::new(),
               sink }
    }

    /// Reconstruye un registro desde un snapshot persistido.
    pub fn from_snapshot(snapshot: RegistrySnapshot, sink: S) -> Self {
        let registry = Self::with_sink(sink);
        for (name, versions) in snapshot {
            registry.models.insert(name, Arc::new(Mutex::new(versions)));
        }
        registry
    }

    /// Acceso al sink de promociones (útil para inspección en tests).
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn log_for(&self, name: &str) -> VersionLog {
        self.models
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    fn existing_log(&self, name: &str) -> Option<VersionLog> {
        self.models.get(name).map(|entry| entry.value().clone())
    }

    /// Registra un artefacto como la siguiente versión monótona de `name`,
    /// en etapa inicial `None`. Las versiones nunca se reutilizan.
    pub fn register(&self,
                    name: &str,
                    artifact: &str,
                    metrics: BTreeMap<String, f64>)
                    -> Result<ModelVersion, RegistryError> {
        let log = self.log_for(name);
        let mut versions = log.lock()
                              .map_err(|_| RegistryError::Storage("model lock poisoned".into()))?;
        let record = ModelVersion { name: name.to_string(),
                                    version: versions.len() as u64 + 1,
                                    artifact: artifact.to_string(),
                                    metrics,
                                    stage: LifecycleStage::None,
                                    created_at: Utc::now() };
        versions.push(record.clone());
        info!(model = name, version = record.version, "model version registered");
        Ok(record)
    }

    /// Registra y lleva la versión nueva a `Staging` en la misma sección
    /// crítica, archivando cualquier versión que estuviera en `Staging`.
    pub fn register_and_stage(&self,
                              name: &str,
                              artifact: &str,
                              metrics: BTreeMap<String, f64>)
                              -> Result<ModelVersion, RegistryError> {
        let log = self.log_for(name);
        let mut versions = log.lock()
                              .map_err(|_| RegistryError::Storage("model lock poisoned".into()))?;

        for prior in versions.iter_mut().filter(|v| v.stage == LifecycleStage::Staging) {
            prior.stage = LifecycleStage::Archived;
            self.sink.publish(PromotionEvent { name: prior.name.clone(),
                                               version: prior.version,
                                               from: LifecycleStage::Staging,
                                               to: LifecycleStage::Archived,
                                               ts: Utc::now() });
        }

        let record = ModelVersion { name: name.to_string(),
                                    version: versions.len() as u64 + 1,
                                    artifact: artifact.to_string(),
                                    metrics,
                                    stage: LifecycleStage::Staging,
                                    created_at: Utc::now() };
        versions.push(record.clone());
        self.sink.publish(PromotionEvent { name: record.name.clone(),
                                           version: record.version,
                                           from: LifecycleStage::None,
                                           to: LifecycleStage::Staging,
                                           ts: Utc::now() });
        info!(model = name, version = record.version, "model version registered into staging");
        Ok(record)
    }

    /// Aplica una transición de etapa.
    ///
    /// Valida que la versión exista y no esté `Archived`. Si el destino es
    /// `Production`, demuele atómicamente la `Production` vigente (si hay) a
    /// `Archived` y asciende el objetivo: una sola transición, sin estados
    /// intermedios observables. Demover a `Staging` o `Archived` nunca toca
    /// otras versiones. Todo error deja el estado sin cambios.
    pub fn promote(&self, request: &PromotionRequest) -> Result<ModelVersion, RegistryError> {
        if request.target == LifecycleStage::None {
            return Err(RegistryError::InvalidTarget(request.target));
        }
        let log = self.existing_log(&request.name)
                      .ok_or_else(|| RegistryError::UnknownModel(request.name.clone()))?;
        let mut versions = log.lock()
                              .map_err(|_| RegistryError::Storage("model lock poisoned".into()))?;

        let idx = (request.version as usize)
            .checked_sub(1)
            .filter(|&i| i < versions.len())
            .ok_or_else(|| RegistryError::UnknownVersion { name: request.name.clone(),
                                                           version: request.version })?;
        if versions[idx].stage == LifecycleStage::Archived {
            return Err(RegistryError::VersionArchived { name: request.name.clone(),
                                                        version: request.version });
        }

        if request.target == LifecycleStage::Production {
            let current = (0..versions.len()).find(|&i| i != idx && versions[i].stage == LifecycleStage::Production);
            if let Some(prev) = current {
                versions[prev].stage = LifecycleStage::Archived;
                debug!(model = %request.name,
                       demoted = versions[prev].version,
                       "previous production version archived");
                self.sink.publish(PromotionEvent { name: versions[prev].name.clone(),
                                                   version: versions[prev].version,
                                                   from: LifecycleStage::Production,
                                                   to: LifecycleStage::Archived,
                                                   ts: Utc::now() });
            }
        }

        let from = versions[idx].stage;
        versions[idx].stage = request.target;
        self.sink.publish(PromotionEvent { name: versions[idx].name.clone(),
                                           version: versions[idx].version,
                                           from,
                                           to: request.target,
                                           ts: Utc::now() });
        info!(model = %request.name,
              version = request.version,
              from = %from,
              to = %request.target,
              "model version promoted");
        Ok(versions[idx].clone())
    }

    /// Versión más alta actualmente en `stage`, o `None` ("todavía no hay
    /// modelo", no es condición fatal para el consumidor de serving).
    pub fn get_latest(&self, name: &str, stage: LifecycleStage) -> Option<ModelVersion> {
        let log = self.existing_log(name)?;
        let versions = log.lock().ok()?;
        versions.iter().rev().find(|v| v.stage == stage).cloned()
    }

    /// Todas las versiones registradas de `name`, ascendentes.
    pub fn versions(&self, name: &str) -> Vec<ModelVersion> {
        self.existing_log(name)
            .and_then(|log| log.lock().map(|v| v.clone()).ok())
            .unwrap_or_default()
    }

    /// Estado completo, estable, para persistencia externa.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut snapshot = RegistrySnapshot::new();
        for entry in self.models.iter() {
            if let Ok(versions) = entry.value().lock() {
                snapshot.insert(entry.key().clone(), versions.clone());
            }
        }
        snapshot
    }
}
