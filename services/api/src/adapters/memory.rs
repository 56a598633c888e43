//! services/api/src/adapters/memory.rs
//!
//! A `HistoryRepository` that lives only as long as the process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use study_assistant_core::{HistoryRepository, PortError, PortResult, QuizResult};

#[derive(Default)]
pub struct InMemoryHistoryAdapter {
    slots: Mutex<HashMap<String, Vec<QuizResult>>>,
}

impl InMemoryHistoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates `slot`, as if a previous run had saved `results`.
    pub fn with_history(slot: &str, results: Vec<QuizResult>) -> Self {
        let adapter = Self::default();
        if let Ok(mut slots) = adapter.slots.lock() {
            slots.insert(slot.to_string(), results);
        }
        adapter
    }

    /// What is currently saved under `slot`.
    pub fn saved(&self, slot: &str) -> Vec<QuizResult> {
        self.slots
            .lock()
            .map(|slots| slots.get(slot).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryAdapter {
    async fn load_history(&self, slot: &str) -> PortResult<Vec<QuizResult>> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| PortError::Persistence(e.to_string()))?;
        Ok(slots.get(slot).cloned().unwrap_or_default())
    }

    async fn save_history(&self, slot: &str, results: &[QuizResult]) -> PortResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| PortError::Persistence(e.to_string()))?;
        slots.insert(slot.to_string(), results.to_vec());
        Ok(())
    }
}
