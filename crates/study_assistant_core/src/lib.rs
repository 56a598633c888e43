pub mod analytics;
pub mod domain;
pub mod input;
pub mod notes;
pub mod ports;
pub mod quiz;
pub mod store;

pub use analytics::{AnalyticsSummary, ScorePoint, TopicAverage, DEFAULT_WEAK_TOPIC_THRESHOLD};
pub use domain::{
    Difficulty, GradedAnswer, QuestionId, QuestionKind, QuestionType, QuizQuestion, QuizResult,
    ScoreBand,
};
pub use input::{NotesQuery, QuizSpec, ValidationError};
pub use notes::{NoteSection, Source, StudyNotes};
pub use ports::{
    HistoryRepository, PortError, PortResult, QuizGenerationService, StudyNotesService,
};
pub use quiz::{QuizSession, QuizStatus, TimeLimit};
pub use store::ResultStore;
