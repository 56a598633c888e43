//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        FileHistoryAdapter, InMemoryHistoryAdapter, OpenAiNotesAdapter, OpenAiQuizAdapter,
        SqliteHistoryAdapter,
    },
    config::{Config, HistoryBackend},
    error::ApiError,
    web::{build_router, AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use std::sync::Arc;
use study_assistant_core::{HistoryRepository, ResultStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Quiz History ---
    let history: Arc<dyn HistoryRepository> = match config.history_backend {
        HistoryBackend::Sqlite => {
            info!("Connecting to database...");
            let db_adapter = SqliteHistoryAdapter::connect(&config.database_url, 5).await?;
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        HistoryBackend::File => {
            info!("Storing quiz history under {}", config.history_dir.display());
            Arc::new(FileHistoryAdapter::new(config.history_dir.clone()))
        }
        HistoryBackend::Memory => {
            info!("Quiz history is kept in memory only.");
            Arc::new(InMemoryHistoryAdapter::new())
        }
    };
    let results = Arc::new(ResultStore::load(history, config.history_slot.clone()).await);

    // --- 3. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new().with_api_key(config.require_provider_api_key()?);
    if let Some(base_url) = &config.provider_base_url {
        openai_config = openai_config.with_api_base(base_url);
    }
    let openai_client = Client::with_config(openai_config);

    let notes_adapter = Arc::new(OpenAiNotesAdapter::new(
        openai_client.clone(),
        config.notes_model.clone(),
    ));
    let quiz_adapter = Arc::new(OpenAiQuizAdapter::new(
        openai_client,
        config.quiz_model.clone(),
    ));

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        notes_adapter,
        quiz_adapter,
        results,
    ));
    let app = build_router(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
