//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API
//! server, and their conversions from the core domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use study_assistant_core::{
    analytics::format_minutes_seconds, quiz::format_clock, AnalyticsSummary, Difficulty,
    GradedAnswer, QuestionType, QuizQuestion, QuizResult, QuizSession, QuizStatus, ScoreBand,
    ScorePoint, Source, StudyNotes, TimeLimit, TopicAverage,
};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Payloads Sent FROM the Client TO the Server
//=========================================================================================

/// Requests study notes for a topic of a course.
#[derive(Deserialize, Debug, ToSchema)]
pub struct NotesRequest {
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub topic: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum QuestionTypeDto {
    #[serde(rename = "Multiple Choice", alias = "multipleChoice")]
    MultipleChoice,
    #[serde(rename = "Short Answer", alias = "shortAnswer")]
    ShortAnswer,
    #[serde(rename = "True/False", alias = "trueFalse")]
    TrueFalse,
}

impl From<QuestionTypeDto> for QuestionType {
    fn from(dto: QuestionTypeDto) -> Self {
        match dto {
            QuestionTypeDto::MultipleChoice => QuestionType::MultipleChoice,
            QuestionTypeDto::ShortAnswer => QuestionType::ShortAnswer,
            QuestionTypeDto::TrueFalse => QuestionType::TrueFalse,
        }
    }
}

impl From<QuestionType> for QuestionTypeDto {
    fn from(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::MultipleChoice => QuestionTypeDto::MultipleChoice,
            QuestionType::ShortAnswer => QuestionTypeDto::ShortAnswer,
            QuestionType::TrueFalse => QuestionTypeDto::TrueFalse,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
pub enum DifficultyDto {
    #[serde(alias = "easy")]
    Easy,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
}

impl From<DifficultyDto> for Difficulty {
    fn from(dto: DifficultyDto) -> Self {
        match dto {
            DifficultyDto::Easy => Difficulty::Easy,
            DifficultyDto::Medium => Difficulty::Medium,
            DifficultyDto::Hard => Difficulty::Hard,
        }
    }
}

/// The quiz generator form.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_question_count")]
    pub num_questions: u32,
    #[serde(default = "default_question_types")]
    pub question_types: Vec<QuestionTypeDto>,
    #[serde(default)]
    pub difficulty: DifficultyDto,
    /// Whole minutes; `0` means no time limit.
    #[serde(default = "default_time_limit_minutes")]
    pub time_limit_minutes: u32,
}

fn default_question_count() -> u32 {
    5
}

fn default_question_types() -> Vec<QuestionTypeDto> {
    vec![QuestionTypeDto::MultipleChoice]
}

fn default_time_limit_minutes() -> u32 {
    10
}

/// Sets the answer of the current question.
#[derive(Deserialize, Debug, ToSchema)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsParams {
    /// Weak-topic threshold in percent. Defaults to the configured value.
    pub threshold: Option<u32>,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceView {
    pub title: String,
    pub uri: String,
    pub display_title: String,
}

impl From<&Source> for SourceView {
    fn from(source: &Source) -> Self {
        Self {
            title: source.title.clone(),
            uri: source.uri.clone(),
            display_title: source.display_title().to_string(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct NoteSectionView {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct NotesResponse {
    pub text: String,
    pub sections: Vec<NoteSectionView>,
    pub sources: Vec<SourceView>,
}

impl From<StudyNotes> for NotesResponse {
    fn from(notes: StudyNotes) -> Self {
        let sections = notes
            .sections()
            .into_iter()
            .map(|s| NoteSectionView {
                title: s.title,
                lines: s.lines,
            })
            .collect();
        let sources = notes.sources.iter().map(SourceView::from).collect();
        Self {
            text: notes.text,
            sections,
            sources,
        }
    }
}

/// A question as shown while the quiz is running: no answer, no explanation.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: usize,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionTypeDto,
    /// The options to pick from; empty for short answer questions.
    pub choices: Vec<String>,
}

impl From<&QuizQuestion> for QuestionView {
    fn from(question: &QuizQuestion) -> Self {
        Self {
            id: question.id.0,
            question: question.question.clone(),
            question_type: question.question_type().into(),
            choices: question.choices(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum QuizStatusDto {
    InProgress,
    Finished,
}

#[derive(Serialize, Debug, Clone, Copy, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ScoreBandDto {
    Strong,
    Fair,
    Weak,
}

impl From<ScoreBand> for ScoreBandDto {
    fn from(band: ScoreBand) -> Self {
        match band {
            ScoreBand::Strong => ScoreBandDto::Strong,
            ScoreBand::Fair => ScoreBandDto::Fair,
            ScoreBand::Weak => ScoreBandDto::Weak,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswerView {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionTypeDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub explanation: String,
    pub user_answer: String,
    pub is_correct: bool,
}

impl From<&GradedAnswer> for GradedAnswerView {
    fn from(graded: &GradedAnswer) -> Self {
        Self {
            question: graded.question.question.clone(),
            question_type: graded.question.question_type().into(),
            options: graded.question.options().map(<[String]>::to_vec),
            correct_answer: graded.question.answer.clone(),
            explanation: graded.question.explanation.clone(),
            user_answer: graded.user_answer.clone(),
            is_correct: graded.is_correct,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultView {
    pub topic: String,
    pub score: u32,
    pub total_questions: u32,
    pub score_percent: u32,
    pub band: ScoreBandDto,
    pub time_taken_seconds: u64,
    /// `Xm Ys`
    pub time_taken: String,
    pub date: DateTime<Utc>,
    pub answers: Vec<GradedAnswerView>,
}

impl From<&QuizResult> for QuizResultView {
    fn from(result: &QuizResult) -> Self {
        Self {
            topic: result.topic.clone(),
            score: result.score,
            total_questions: result.total_questions,
            score_percent: result.rounded_percent(),
            band: result.band().into(),
            time_taken_seconds: result.time_taken_secs,
            time_taken: format_minutes_seconds(result.time_taken_secs as f64),
            date: result.date,
            answers: result.answers.iter().map(GradedAnswerView::from).collect(),
        }
    }
}

/// The state of the active quiz.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub id: Uuid,
    pub topic: String,
    pub status: QuizStatusDto,
    pub current_index: usize,
    pub total_questions: usize,
    pub answered_count: usize,
    pub current_question: QuestionView,
    pub current_answer: Option<String>,
    /// `None` when the quiz has no time limit.
    pub time_remaining_seconds: Option<u32>,
    /// `MM:SS`
    pub time_remaining_clock: Option<String>,
    /// Present once the quiz has finished.
    pub result: Option<QuizResultView>,
}

impl QuizView {
    pub fn from_session(id: Uuid, session: &QuizSession) -> Self {
        let time_remaining_seconds = match session.time_remaining() {
            TimeLimit::Unlimited => None,
            TimeLimit::Seconds(left) => Some(left),
        };
        Self {
            id,
            topic: session.topic().to_string(),
            status: match session.status() {
                QuizStatus::InProgress => QuizStatusDto::InProgress,
                QuizStatus::Finished => QuizStatusDto::Finished,
            },
            current_index: session.current_index(),
            total_questions: session.questions().len(),
            answered_count: session.answered_count(),
            current_question: session.current_question().into(),
            current_answer: session.current_answer().map(str::to_string),
            time_remaining_seconds,
            time_remaining_clock: time_remaining_seconds.map(format_clock),
            result: session.result().map(QuizResultView::from),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScorePointView {
    pub date: DateTime<Utc>,
    pub score_percent: u32,
}

impl From<&ScorePoint> for ScorePointView {
    fn from(point: &ScorePoint) -> Self {
        Self {
            date: point.date,
            score_percent: point.score_percent,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicAverageView {
    pub topic: String,
    pub average_percent: u32,
    pub attempts: usize,
}

impl From<&TopicAverage> for TopicAverageView {
    fn from(topic: &TopicAverage) -> Self {
        Self {
            topic: topic.topic.clone(),
            average_percent: topic.average_percent,
            attempts: topic.attempts,
        }
    }
}

/// Performance analytics. Averages are `null` while no quiz has been taken.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_quizzes: usize,
    pub threshold: u32,
    pub average_score_percent: Option<f64>,
    pub average_time_seconds: Option<f64>,
    /// `Xm Ys`
    pub average_time: Option<String>,
    pub timeline: Vec<ScorePointView>,
    pub topics: Vec<TopicAverageView>,
    pub weak_topics: Vec<TopicAverageView>,
}

impl AnalyticsResponse {
    pub fn new(summary: Option<AnalyticsSummary>, threshold: u32) -> Self {
        let Some(summary) = summary else {
            return Self {
                total_quizzes: 0,
                threshold,
                average_score_percent: None,
                average_time_seconds: None,
                average_time: None,
                timeline: Vec::new(),
                topics: Vec::new(),
                weak_topics: Vec::new(),
            };
        };
        Self {
            total_quizzes: summary.total_quizzes,
            threshold,
            average_score_percent: Some(summary.average_score_percent),
            average_time_seconds: Some(summary.average_time_seconds),
            average_time: Some(format_minutes_seconds(summary.average_time_seconds)),
            timeline: summary.timeline.iter().map(ScorePointView::from).collect(),
            topics: summary.topics.iter().map(TopicAverageView::from).collect(),
            weak_topics: summary.weak_topics.iter().map(TopicAverageView::from).collect(),
        }
    }
}
