//! services/api/src/web/router.rs
//!
//! Assembles the HTTP router: routes, CORS, request tracing and Swagger UI.

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::{quiz, rest, rest::ApiDoc, state::AppState};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let api_router = Router::new()
        .route("/notes", post(rest::notes_handler))
        .route("/quizzes", post(quiz::create_quiz_handler))
        .route(
            "/quizzes/{id}",
            get(quiz::get_quiz_handler).delete(quiz::abandon_handler),
        )
        .route("/quizzes/{id}/answer", put(quiz::answer_handler))
        .route("/quizzes/{id}/next", post(quiz::next_handler))
        .route("/quizzes/{id}/previous", post(quiz::previous_handler))
        .route("/quizzes/{id}/finish", post(quiz::finish_handler))
        .route("/results", get(rest::list_results_handler))
        .route("/analytics", get(rest::analytics_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
