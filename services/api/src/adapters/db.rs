//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `HistoryRepository` port from the `core` crate. Each named slot is one
//! row holding the whole history as a JSON array, stored in SQLite via `sqlx`.

use crate::adapters::records::{decode_history, encode_history};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use study_assistant_core::{HistoryRepository, PortError, PortResult, QuizResult};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `HistoryRepository` port.
#[derive(Clone)]
pub struct SqliteHistoryAdapter {
    pool: SqlitePool,
}

impl SqliteHistoryAdapter {
    /// Creates a new `SqliteHistoryAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url`. An in-memory database must use a single
    /// connection, since every connection would otherwise see its own database.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SlotRecord {
    payload: String,
    updated_at: DateTime<Utc>,
}

//=========================================================================================
// `HistoryRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl HistoryRepository for SqliteHistoryAdapter {
    async fn load_history(&self, slot: &str) -> PortResult<Vec<QuizResult>> {
        let record = sqlx::query_as::<_, SlotRecord>(
            "SELECT payload, updated_at FROM history_slots WHERE slot = ?",
        )
        .bind(slot)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        match record {
            Some(record) => {
                debug!("Slot '{}' was last written at {}.", slot, record.updated_at);
                decode_history(&record.payload)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save_history(&self, slot: &str, results: &[QuizResult]) -> PortResult<()> {
        let payload = encode_history(results)?;
        sqlx::query(
            "INSERT INTO history_slots (slot, payload, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT (slot) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(slot)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;
        Ok(())
    }
}
