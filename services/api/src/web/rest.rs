//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for study notes, stored results and analytics,
//! and the master definition for the OpenAPI specification.

use crate::error::{port_rejection, validation_rejection, HandlerError};
use crate::web::protocol::{
    AnalyticsParams, AnalyticsResponse, AnswerRequest, CreateQuizRequest, DifficultyDto,
    GradedAnswerView, NoteSectionView, NotesRequest, NotesResponse, QuestionTypeDto,
    QuestionView, QuizResultView, QuizStatusDto, QuizView, ScoreBandDto, ScorePointView,
    SourceView, TopicAverageView,
};
use crate::web::{quiz, state::AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use study_assistant_core::{analytics::summarize, NotesQuery};
use tracing::info;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        notes_handler,
        quiz::create_quiz_handler,
        quiz::get_quiz_handler,
        quiz::answer_handler,
        quiz::next_handler,
        quiz::previous_handler,
        quiz::finish_handler,
        quiz::abandon_handler,
        list_results_handler,
        analytics_handler,
    ),
    components(
        schemas(
            NotesRequest, NotesResponse, NoteSectionView, SourceView,
            CreateQuizRequest, QuestionTypeDto, DifficultyDto, AnswerRequest,
            QuizView, QuestionView, QuizStatusDto,
            QuizResultView, GradedAnswerView, ScoreBandDto,
            AnalyticsResponse, ScorePointView, TopicAverageView
        )
    ),
    tags(
        (name = "Study Assistant API", description = "Study notes, mock quizzes and performance analytics.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Fetch tutor-style study notes for a topic of a course.
#[utoipa::path(
    post,
    path = "/notes",
    request_body = NotesRequest,
    responses(
        (status = 200, description = "Study notes with their sources", body = NotesResponse),
        (status = 400, description = "Course or topic missing"),
        (status = 409, description = "The same notes are already being fetched"),
        (status = 502, description = "The answer provider failed")
    )
)]
pub async fn notes_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<NotesRequest>,
) -> Result<Json<NotesResponse>, HandlerError> {
    let query = NotesQuery::new(&payload.course, &payload.topic).map_err(validation_rejection)?;

    let key = format!(
        "notes:{}:{}",
        query.course().to_lowercase(),
        query.topic().to_lowercase()
    );
    let _guard = app_state.in_flight.try_acquire(key).ok_or_else(|| {
        (
            StatusCode::CONFLICT,
            "These notes are already being fetched.".to_string(),
        )
    })?;

    let notes = app_state
        .notes_adapter
        .fetch_study_notes(&query)
        .await
        .map_err(|e| port_rejection(e, "fetch study notes"))?;
    info!(
        "Study notes for '{}' ready with {} sources.",
        query.topic(),
        notes.sources.len()
    );
    Ok(Json(NotesResponse::from(notes)))
}

/// List every stored quiz result, oldest first.
#[utoipa::path(
    get,
    path = "/results",
    responses(
        (status = 200, description = "Stored quiz results", body = [QuizResultView])
    )
)]
pub async fn list_results_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<QuizResultView>> {
    let results = app_state.results.all().await;
    Json(results.iter().map(QuizResultView::from).collect())
}

/// Summarize performance across every stored quiz result.
#[utoipa::path(
    get,
    path = "/analytics",
    params(AnalyticsParams),
    responses(
        (status = 200, description = "Performance analytics", body = AnalyticsResponse),
        (status = 400, description = "Threshold above 100")
    )
)]
pub async fn analytics_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsResponse>, HandlerError> {
    let threshold = params
        .threshold
        .unwrap_or(app_state.config.weak_topic_threshold);
    if threshold > 100 {
        return Err((
            StatusCode::BAD_REQUEST,
            "The threshold must be a percentage between 0 and 100.".to_string(),
        ));
    }
    let results = app_state.results.all().await;
    Ok(Json(AnalyticsResponse::new(
        summarize(&results, threshold),
        threshold,
    )))
}
