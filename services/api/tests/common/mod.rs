//! Fakes and request helpers shared by the HTTP integration tests.

#![allow(dead_code)]

use api_lib::adapters::InMemoryHistoryAdapter;
use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use study_assistant_core::{
    GradedAnswer, HistoryRepository, NotesQuery, PortError, PortResult, QuestionId, QuestionKind,
    QuizGenerationService, QuizQuestion, QuizResult, QuizSpec, ResultStore, Source, StudyNotes,
    StudyNotesService,
};
use tokio::sync::{Notify, Semaphore};
use tower::ServiceExt;

pub const SLOT: &str = "quizAnalytics";

//=========================================================================================
// Fake Answer Provider
//=========================================================================================

/// Generates short answer questions `Question N` with answer `answer N`.
/// Topic `broken` fails, topic `slow` waits for `release`.
pub struct FakeProvider {
    pub entered: Notify,
    pub release: Semaphore,
    pub notes_calls: StdMutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
            notes_calls: StdMutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl StudyNotesService for FakeProvider {
    async fn fetch_study_notes(&self, query: &NotesQuery) -> PortResult<StudyNotes> {
        self.notes_calls
            .lock()
            .unwrap()
            .push(query.topic().to_string());
        match query.topic() {
            "broken" => Err(PortError::Provider("connection refused".to_string())),
            "slow" => {
                self.entered.notify_one();
                let _permit = self.release.acquire().await.unwrap();
                Ok(notes())
            }
            _ => Ok(notes()),
        }
    }
}

#[async_trait]
impl QuizGenerationService for FakeProvider {
    async fn generate_quiz(&self, spec: &QuizSpec) -> PortResult<Vec<QuizQuestion>> {
        match spec.topic() {
            "broken" => return Err(PortError::MalformedResponse("no questions".to_string())),
            "slow" => {
                self.entered.notify_one();
                let _permit = self.release.acquire().await.unwrap();
            }
            _ => {}
        }
        Ok((0..spec.count() as usize).map(question).collect())
    }
}

fn notes() -> StudyNotes {
    StudyNotes {
        text: "Tutor Explanation\nBorrowing lends access.\nStudy Notes\n* Shared borrows are read-only\n* One mutable borrow at a time".to_string(),
        sources: vec![Source {
            title: String::new(),
            uri: "https://doc.rust-lang.org/book/ch04-02-references-and-borrowing.html".to_string(),
        }],
    }
}

pub fn question(index: usize) -> QuizQuestion {
    QuizQuestion {
        id: QuestionId(index),
        question: format!("Question {}", index + 1),
        kind: QuestionKind::ShortAnswer,
        answer: format!("answer {}", index + 1),
        explanation: format!("Explanation {}", index + 1),
    }
}

//=========================================================================================
// History Fixtures
//=========================================================================================

/// A consistent result with `score` correct answers out of `total`.
pub fn stored_result(topic: &str, score: u32, total: u32, time_taken_secs: u64) -> QuizResult {
    let answers = (0..total as usize)
        .map(|i| GradedAnswer {
            question: question(i),
            user_answer: if (i as u32) < score {
                format!("answer {}", i + 1)
            } else {
                String::new()
            },
            is_correct: (i as u32) < score,
        })
        .collect();
    QuizResult {
        topic: topic.to_string(),
        score,
        total_questions: total,
        time_taken_secs,
        date: Utc::now(),
        answers,
    }
}

/// Wraps an in-memory history whose writes fail while `failing` is set.
pub struct FlakyHistory {
    pub failing: AtomicBool,
    pub inner: InMemoryHistoryAdapter,
}

impl FlakyHistory {
    pub fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
            inner: InMemoryHistoryAdapter::new(),
        }
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl HistoryRepository for FlakyHistory {
    async fn load_history(&self, slot: &str) -> PortResult<Vec<QuizResult>> {
        self.inner.load_history(slot).await
    }

    async fn save_history(&self, slot: &str, results: &[QuizResult]) -> PortResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Persistence("read-only file system".to_string()));
        }
        self.inner.save_history(slot, results).await
    }
}

//=========================================================================================
// App & Request Helpers
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub provider: Arc<FakeProvider>,
}

pub async fn app_with_history(history: Arc<dyn HistoryRepository>) -> TestApp {
    let provider = Arc::new(FakeProvider::new());
    let results = Arc::new(ResultStore::load(history, SLOT).await);
    let state = Arc::new(AppState::new(
        Arc::new(Config::default()),
        provider.clone(),
        provider.clone(),
        results,
    ));
    let router = build_router(state.clone()).unwrap();
    TestApp {
        router,
        state,
        provider,
    }
}

pub async fn app() -> TestApp {
    app_with_history(Arc::new(InMemoryHistoryAdapter::new())).await
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

/// Starts a quiz and returns its id.
pub async fn start_quiz(router: &Router, body: Value) -> String {
    let (status, quiz) = send(router, Method::POST, "/quizzes", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{quiz}");
    quiz["id"].as_str().unwrap().to_string()
}
