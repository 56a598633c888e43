//! crates/study_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;

use crate::domain::{QuizQuestion, QuizResult};
use crate::input::{NotesQuery, QuizSpec};
use crate::notes::StudyNotes;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The answer provider could not be reached or reported a failure.
    #[error("Answer provider failed: {0}")]
    Provider(String),
    /// The answer provider replied with data that does not match the expected shape.
    #[error("Answer provider returned malformed data: {0}")]
    MalformedResponse(String),
    /// Stored history could not be read or written.
    #[error("Persistence failed: {0}")]
    Persistence(String),
    /// Stored history exists but cannot be parsed.
    #[error("Stored history is corrupt: {0}")]
    Corrupt(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait StudyNotesService: Send + Sync {
    /// Produces tutor-style notes for a topic of a course, with the web sources used.
    async fn fetch_study_notes(&self, query: &NotesQuery) -> PortResult<StudyNotes>;
}

#[async_trait]
pub trait QuizGenerationService: Send + Sync {
    /// Generates exactly `spec.count()` validated questions of the requested types.
    async fn generate_quiz(&self, spec: &QuizSpec) -> PortResult<Vec<QuizQuestion>>;
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Loads the results saved under `slot`. An absent slot is an empty history;
    /// unparseable data is reported as `PortError::Corrupt`, while single
    /// entries that fail to decode are skipped.
    async fn load_history(&self, slot: &str) -> PortResult<Vec<QuizResult>>;

    /// Replaces the results saved under `slot`.
    async fn save_history(&self, slot: &str, results: &[QuizResult]) -> PortResult<()>;
}
