//! Eventos de promoción hacia el sink de telemetría externo.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::LifecycleStage;

/// Transición aplicada sobre una versión.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionEvent {
    pub name: String,
    pub version: u64,
    pub from: LifecycleStage,
    pub to: LifecycleStage,
    pub ts: DateTime<Utc>,
}

/// Consumidor de eventos de promoción. Se invoca dentro de la sección
/// crítica por nombre, así el orden publicado coincide con el orden
/// aplicado.
pub trait PromotionSink {
    fn publish(&self, event: PromotionEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPromotionSink;

impl PromotionSink for NoopPromotionSink {
    fn publish(&self, _event: PromotionEvent) {}
}

/// Sink en memoria para tests.
#[derive(Debug, Default)]
pub struct MemoryPromotionSink {
    inner: Mutex<Vec<PromotionEvent>>,
}

impl MemoryPromotionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PromotionEvent> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl PromotionSink for MemoryPromotionSink {
    fn publish(&self, event: PromotionEvent) {
        if let Ok(mut events) = self.inner.lock() {
            events.push(event);
        }
    }
}
