//! crates/study_assistant_core/src/input.rs
//!
//! Validated user input. A request only reaches the answer provider or the
//! quiz session once it has been turned into one of these types.

use crate::domain::{Difficulty, QuestionType};
use crate::quiz::TimeLimit;

/// The largest quiz a user may request.
pub const MAX_QUESTIONS: u32 = 20;

/// Rejected user input. Raised at the input boundary only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a course.")]
    MissingCourse,
    #[error("Please enter a topic.")]
    MissingTopic,
    #[error("The number of questions must be between 1 and 20, got {0}.")]
    QuestionCount(u32),
    #[error("Select at least one question type.")]
    NoQuestionTypes,
    #[error("A quiz needs at least one question.")]
    EmptyQuiz,
}

/// A study-notes search for one topic within a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesQuery {
    course: String,
    topic: String,
}

impl NotesQuery {
    pub fn new(course: &str, topic: &str) -> Result<Self, ValidationError> {
        let course = course.trim();
        let topic = topic.trim();
        if course.is_empty() {
            return Err(ValidationError::MissingCourse);
        }
        if topic.is_empty() {
            return Err(ValidationError::MissingTopic);
        }
        Ok(Self {
            course: course.to_string(),
            topic: topic.to_string(),
        })
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// The parameters of a quiz to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSpec {
    topic: String,
    count: u32,
    types: Vec<QuestionType>,
    difficulty: Difficulty,
    time_limit_minutes: u32,
}

impl QuizSpec {
    /// Validates the quiz form. Duplicate question types are collapsed, keeping
    /// the order in which they were first given. A time limit of zero minutes
    /// means no limit.
    pub fn new(
        topic: &str,
        count: u32,
        types: &[QuestionType],
        difficulty: Difficulty,
        time_limit_minutes: u32,
    ) -> Result<Self, ValidationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::MissingTopic);
        }
        if !(1..=MAX_QUESTIONS).contains(&count) {
            return Err(ValidationError::QuestionCount(count));
        }
        let mut unique = Vec::with_capacity(types.len());
        for t in types {
            if !unique.contains(t) {
                unique.push(*t);
            }
        }
        if unique.is_empty() {
            return Err(ValidationError::NoQuestionTypes);
        }
        Ok(Self {
            topic: topic.to_string(),
            count,
            types: unique,
            difficulty,
            time_limit_minutes,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn types(&self) -> &[QuestionType] {
        &self.types
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn time_limit(&self) -> TimeLimit {
        TimeLimit::from_minutes(self.time_limit_minutes)
    }
}
