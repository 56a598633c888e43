//! services/api/src/web/timer_task.rs
//!
//! This module contains the asynchronous "worker" function that counts a timed
//! quiz down and finishes it when the time runs out.

use std::sync::Arc;
use std::time::Duration;
use study_assistant_core::{PortResult, QuizSession, ResultStore};
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

const TICK: Duration = Duration::from_secs(1);

/// Ticks the session once per second until it times out or the token is cancelled.
///
/// On timeout the token is cancelled and the result is saved to the store. A
/// failed save leaves the result unsaved for the next finish request.
/// Cancellation is checked again under the session lock, so a stopped countdown
/// never mutates the session.
pub async fn countdown_process(
    session_lock: Arc<Mutex<QuizSession>>,
    results: Arc<ResultStore>,
    cancellation_token: CancellationToken,
) -> PortResult<()> {
    let mut interval = interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Countdown stopped.");
                return Ok(());
            }
            _ = interval.tick() => {}
        }

        let mut session = session_lock.lock().await;
        if cancellation_token.is_cancelled() {
            return Ok(());
        }
        if let Some(result) = session.tick() {
            cancellation_token.cancel();
            info!(
                "Quiz on '{}' timed out with {}/{}.",
                result.topic, result.score, result.total_questions
            );
            return results.save_session_result(&mut session).await;
        }
    }
}
