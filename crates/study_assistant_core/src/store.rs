//! crates/study_assistant_core/src/store.rs
//!
//! The Result Store: the append-only history of finished quizzes, persisted
//! through an injected `HistoryRepository`.

use crate::domain::QuizResult;
use crate::ports::{HistoryRepository, PortResult};
use crate::quiz::QuizSession;
use futures::lock::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ResultStore {
    repo: Arc<dyn HistoryRepository>,
    slot: String,
    // Held across the repository write so concurrent appends persist in order.
    results: Mutex<Vec<QuizResult>>,
}

impl ResultStore {
    /// Loads the history saved under `slot`. Never fails: a missing, unreadable
    /// or corrupt history starts the store empty.
    pub async fn load(repo: Arc<dyn HistoryRepository>, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let results = match repo.load_history(&slot).await {
            Ok(results) => {
                info!("Loaded {} quiz results from slot '{}'.", results.len(), slot);
                results
            }
            Err(e) => {
                warn!("Quiz history in slot '{}' is unusable, starting empty: {}", slot, e);
                Vec::new()
            }
        };
        Self {
            repo,
            slot,
            results: Mutex::new(results),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Persists the history with `result` appended, then commits it in memory.
    /// When the write fails the in-memory history is left unchanged.
    pub async fn append(&self, result: QuizResult) -> PortResult<()> {
        let mut results = self.results.lock().await;
        let mut next = results.clone();
        next.push(result);
        self.repo.save_history(&self.slot, &next).await?;
        *results = next;
        Ok(())
    }

    /// Appends the session's result unless it is already stored. After a
    /// failed write the result stays unsaved, so calling this again retries.
    pub async fn save_session_result(&self, session: &mut QuizSession) -> PortResult<()> {
        let Some(result) = session.unsaved_result().cloned() else {
            return Ok(());
        };
        self.append(result).await?;
        session.mark_result_saved();
        Ok(())
    }

    /// A snapshot of every stored result, in insertion order.
    pub async fn all(&self) -> Vec<QuizResult> {
        self.results.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.results.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
