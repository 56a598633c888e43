//! services/api/src/web/quiz.rs
//!
//! Axum handlers driving the quiz session: generation, answering, navigation,
//! finishing and abandoning.

use crate::error::{port_rejection, validation_rejection, HandlerError};
use crate::web::protocol::{AnswerRequest, CreateQuizRequest, QuizResultView, QuizView};
use crate::web::state::{ActiveQuiz, AppState, QuizHandle};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use study_assistant_core::{QuestionType, QuizSession, QuizSpec};
use tracing::{error, info};
use uuid::Uuid;

fn quiz_not_found(id: Uuid) -> HandlerError {
    (StatusCode::NOT_FOUND, format!("Quiz {} is not active.", id))
}

fn quiz_finished() -> HandlerError {
    (
        StatusCode::CONFLICT,
        "This quiz has already finished.".to_string(),
    )
}

async fn active_quiz(app_state: &AppState, id: Uuid) -> Result<QuizHandle, HandlerError> {
    app_state
        .quiz_slot
        .get(id)
        .await
        .ok_or_else(|| quiz_not_found(id))
}

/// Identifies a generation request for the in-flight gate.
fn generation_key(spec: &QuizSpec) -> String {
    let types: Vec<&str> = spec.types().iter().map(|t| QuestionType::label(*t)).collect();
    format!(
        "quiz:{}:{}:{}:{}:{:?}",
        spec.topic().to_lowercase(),
        spec.count(),
        types.join(","),
        spec.difficulty(),
        spec.time_limit()
    )
}

/// Applies `change` to an in-progress session and returns its new view.
async fn update_session(
    app_state: &AppState,
    id: Uuid,
    change: impl FnOnce(&mut QuizSession),
) -> Result<Json<QuizView>, HandlerError> {
    let quiz = active_quiz(app_state, id).await?;
    let mut session = quiz.session.lock().await;
    if session.is_finished() {
        return Err(quiz_finished());
    }
    change(&mut session);
    Ok(Json(QuizView::from_session(id, &session)))
}

//=========================================================================================
// Quiz Handlers
//=========================================================================================

/// Generate a quiz and start it, replacing any active quiz.
#[utoipa::path(
    post,
    path = "/quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Quiz generated and started", body = QuizView),
        (status = 400, description = "Invalid quiz settings"),
        (status = 409, description = "The same quiz is already being generated, or a newer one replaced it"),
        (status = 502, description = "The answer provider failed")
    )
)]
pub async fn create_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let types: Vec<QuestionType> = payload.question_types.into_iter().map(Into::into).collect();
    let spec = QuizSpec::new(
        &payload.topic,
        payload.num_questions,
        &types,
        payload.difficulty.into(),
        payload.time_limit_minutes,
    )
    .map_err(validation_rejection)?;

    let _guard = app_state
        .in_flight
        .try_acquire(generation_key(&spec))
        .ok_or_else(|| {
            (
                StatusCode::CONFLICT,
                "This quiz is already being generated.".to_string(),
            )
        })?;
    let ticket = app_state.quiz_slot.begin_generation();

    let questions = app_state
        .quiz_adapter
        .generate_quiz(&spec)
        .await
        .map_err(|e| port_rejection(e, "generate the quiz"))?;
    let session = QuizSession::new(spec.topic(), questions, spec.time_limit())
        .map_err(validation_rejection)?;

    let quiz = ActiveQuiz::start(session, app_state.results.clone());
    let handle = app_state
        .quiz_slot
        .install(ticket, quiz)
        .await
        .map_err(|stale| {
            info!("Discarding quiz {}: a newer request replaced it.", stale.id);
            (
                StatusCode::CONFLICT,
                "A newer quiz request replaced this one.".to_string(),
            )
        })?;

    let session = handle.session.lock().await;
    info!(
        "Quiz {} started on '{}' with {} questions.",
        handle.id,
        session.topic(),
        session.questions().len()
    );
    Ok((
        StatusCode::CREATED,
        Json(QuizView::from_session(handle.id, &session)),
    ))
}

/// Get the state of the active quiz.
#[utoipa::path(
    get,
    path = "/quizzes/{id}",
    params(("id" = Uuid, Path, description = "The id of the active quiz.")),
    responses(
        (status = 200, description = "The quiz state", body = QuizView),
        (status = 404, description = "No active quiz with this id")
    )
)]
pub async fn get_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, HandlerError> {
    let quiz = active_quiz(&app_state, id).await?;
    let session = quiz.session.lock().await;
    Ok(Json(QuizView::from_session(id, &session)))
}

/// Record the answer to the current question.
#[utoipa::path(
    put,
    path = "/quizzes/{id}/answer",
    params(("id" = Uuid, Path, description = "The id of the active quiz.")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = QuizView),
        (status = 404, description = "No active quiz with this id"),
        (status = 409, description = "The quiz has already finished")
    )
)]
pub async fn answer_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<QuizView>, HandlerError> {
    update_session(&app_state, id, |session| session.record_answer(payload.answer)).await
}

/// Move to the next question.
#[utoipa::path(
    post,
    path = "/quizzes/{id}/next",
    params(("id" = Uuid, Path, description = "The id of the active quiz.")),
    responses(
        (status = 200, description = "Moved forward, or stayed on the last question", body = QuizView),
        (status = 404, description = "No active quiz with this id"),
        (status = 409, description = "The quiz has already finished")
    )
)]
pub async fn next_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, HandlerError> {
    update_session(&app_state, id, QuizSession::advance).await
}

/// Move to the previous question.
#[utoipa::path(
    post,
    path = "/quizzes/{id}/previous",
    params(("id" = Uuid, Path, description = "The id of the active quiz.")),
    responses(
        (status = 200, description = "Moved back, or stayed on the first question", body = QuizView),
        (status = 404, description = "No active quiz with this id"),
        (status = 409, description = "The quiz has already finished")
    )
)]
pub async fn previous_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, HandlerError> {
    update_session(&app_state, id, QuizSession::retreat).await
}

/// Finish the quiz and store its result. Finishing again returns the same result
/// and retries the save if it failed before.
#[utoipa::path(
    post,
    path = "/quizzes/{id}/finish",
    params(("id" = Uuid, Path, description = "The id of the active quiz.")),
    responses(
        (status = 200, description = "The quiz result", body = QuizResultView),
        (status = 404, description = "No active quiz with this id"),
        (status = 500, description = "The result could not be saved")
    )
)]
pub async fn finish_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizResultView>, HandlerError> {
    let quiz = active_quiz(&app_state, id).await?;
    let mut session = quiz.session.lock().await;
    quiz.cancellation_token.cancel();

    if let Some(result) = session.finish() {
        info!(
            "Quiz {} finished with {}/{}.",
            id, result.score, result.total_questions
        );
    }
    // Also retries a result whose earlier save (on finish or timeout) failed.
    app_state
        .results
        .save_session_result(&mut session)
        .await
        .map_err(|e| port_rejection(e, "save the quiz result"))?;

    let result = session.result().ok_or_else(|| {
        error!("Quiz {} is finished but has no result.", id);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to finish the quiz.".to_string(),
        )
    })?;
    Ok(Json(QuizResultView::from(result)))
}

/// Abandon the quiz: stop its timer and discard it without storing a result.
#[utoipa::path(
    delete,
    path = "/quizzes/{id}",
    params(("id" = Uuid, Path, description = "The id of the active quiz.")),
    responses(
        (status = 204, description = "Quiz abandoned"),
        (status = 404, description = "No active quiz with this id")
    )
)]
pub async fn abandon_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    if app_state.quiz_slot.abandon(id).await {
        info!("Quiz {} abandoned.", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(quiz_not_found(id))
    }
}
