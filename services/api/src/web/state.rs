//! services/api/src/web/state.rs
//!
//! Defines the application's shared state: the adapters, the result store, the
//! single active quiz and the gate that rejects duplicate provider requests.

use crate::config::Config;
use crate::web::timer_task::countdown_process;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use study_assistant_core::{QuizGenerationService, QuizSession, ResultStore, StudyNotesService};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub notes_adapter: Arc<dyn StudyNotesService>,
    pub quiz_adapter: Arc<dyn QuizGenerationService>,
    pub results: Arc<ResultStore>,
    pub quiz_slot: QuizSlot,
    pub in_flight: Arc<InFlightRequests>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        notes_adapter: Arc<dyn StudyNotesService>,
        quiz_adapter: Arc<dyn QuizGenerationService>,
        results: Arc<ResultStore>,
    ) -> Self {
        Self {
            config,
            notes_adapter,
            quiz_adapter,
            results,
            quiz_slot: QuizSlot::default(),
            in_flight: Arc::new(InFlightRequests::default()),
        }
    }
}

//=========================================================================================
// ActiveQuiz (The One Running Quiz Session)
//=========================================================================================

/// A running quiz session and the countdown task that drives it.
pub struct ActiveQuiz {
    pub id: Uuid,
    pub session: Arc<Mutex<QuizSession>>,
    /// Cancels the countdown task. Cancelled on finish, abandon, replacement or drop.
    pub cancellation_token: CancellationToken,
}

impl ActiveQuiz {
    /// Wraps `session` and, when it has a time limit, spawns its countdown.
    pub fn start(session: QuizSession, results: Arc<ResultStore>) -> Self {
        let limited = session.time_remaining().is_limited();
        let quiz = Self {
            id: Uuid::new_v4(),
            session: Arc::new(Mutex::new(session)),
            cancellation_token: CancellationToken::new(),
        };
        if limited {
            let session = quiz.session.clone();
            let token = quiz.cancellation_token.clone();
            tokio::spawn(async move {
                if let Err(e) = countdown_process(session, results, token).await {
                    error!("Countdown task ended with an error: {}", e);
                }
            });
        }
        quiz
    }

    pub fn stop(&self) {
        self.cancellation_token.cancel();
    }

    pub fn handle(&self) -> QuizHandle {
        QuizHandle {
            id: self.id,
            session: self.session.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl Drop for ActiveQuiz {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A cheap reference to the active quiz, usable after the slot lock is released.
#[derive(Clone)]
pub struct QuizHandle {
    pub id: Uuid,
    pub session: Arc<Mutex<QuizSession>>,
    pub cancellation_token: CancellationToken,
}

//=========================================================================================
// QuizSlot
//=========================================================================================

/// Holds at most one quiz. Every generation and abandon advances the epoch, so
/// a generation that finishes after a newer one started is no longer relevant.
#[derive(Default)]
pub struct QuizSlot {
    epoch: AtomicU64,
    active: Mutex<Option<ActiveQuiz>>,
}

impl QuizSlot {
    /// Takes a ticket for a generation that is about to start.
    pub fn begin_generation(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Installs `quiz` if `ticket` is still the latest, replacing (and
    /// stopping) any previous quiz. A stale quiz is handed back.
    pub async fn install(&self, ticket: u64, quiz: ActiveQuiz) -> Result<QuizHandle, ActiveQuiz> {
        let mut active = self.active.lock().await;
        if self.epoch.load(Ordering::SeqCst) != ticket {
            return Err(quiz);
        }
        let handle = quiz.handle();
        if let Some(previous) = active.replace(quiz) {
            info!("Quiz {} replaced by quiz {}.", previous.id, handle.id);
            previous.stop();
        }
        Ok(handle)
    }

    /// The active quiz, if its id is `id`.
    pub async fn get(&self, id: Uuid) -> Option<QuizHandle> {
        let active = self.active.lock().await;
        active
            .as_ref()
            .filter(|quiz| quiz.id == id)
            .map(ActiveQuiz::handle)
    }

    /// Stops and drops the quiz with `id`. Pending generations become stale.
    pub async fn abandon(&self, id: Uuid) -> bool {
        let mut active = self.active.lock().await;
        if !active.as_ref().is_some_and(|quiz| quiz.id == id) {
            return false;
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(quiz) = active.take() {
            quiz.stop();
        }
        true
    }
}

//=========================================================================================
// InFlightRequests
//=========================================================================================

/// Keys of the provider requests currently outstanding.
#[derive(Default)]
pub struct InFlightRequests {
    keys: StdMutex<HashSet<String>>,
}

impl InFlightRequests {
    /// Registers `key`, or returns `None` if an identical request is outstanding.
    /// The key is released when the guard is dropped.
    pub fn try_acquire(self: &Arc<Self>, key: String) -> Option<InFlightGuard> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            owner: self.clone(),
            key,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

pub struct InFlightGuard {
    owner: Arc<InFlightRequests>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owner
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
