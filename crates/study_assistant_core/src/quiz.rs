//! crates/study_assistant_core/src/quiz.rs
//!
//! The quiz session state machine: navigation through a fixed list of
//! questions, answer capture, an optional countdown and the one-time scoring
//! that turns a session into a `QuizResult`.
//!
//! The session itself is synchronous and owns no timer. Whoever drives it calls
//! `tick` once per elapsed second; see the API service's countdown task.

use crate::domain::{GradedAnswer, QuestionId, QuizQuestion, QuizResult};
use crate::input::ValidationError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// How long a session may run before it finishes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLimit {
    Unlimited,
    Seconds(u32),
}

impl TimeLimit {
    /// Zero minutes means no limit.
    pub fn from_minutes(minutes: u32) -> Self {
        Self::from_seconds(minutes.saturating_mul(60))
    }

    /// Zero seconds means no limit.
    pub fn from_seconds(seconds: u32) -> Self {
        if seconds == 0 {
            TimeLimit::Unlimited
        } else {
            TimeLimit::Seconds(seconds)
        }
    }

    pub fn is_limited(self) -> bool {
        matches!(self, TimeLimit::Seconds(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStatus {
    InProgress,
    Finished,
}

/// A single quiz attempt, from the first question to its finalized result.
#[derive(Debug)]
pub struct QuizSession {
    topic: String,
    questions: Vec<QuizQuestion>,
    current_index: usize,
    answers: HashMap<QuestionId, String>,
    time_remaining: TimeLimit,
    status: QuizStatus,
    started_at: DateTime<Utc>,
    result: Option<QuizResult>,
    result_saved: bool,
}

impl QuizSession {
    /// Starts a session now.
    pub fn new(
        topic: impl Into<String>,
        questions: Vec<QuizQuestion>,
        time_limit: TimeLimit,
    ) -> Result<Self, ValidationError> {
        Self::started_at(topic, questions, time_limit, Utc::now())
    }

    /// Starts a session at an explicit instant.
    pub fn started_at(
        topic: impl Into<String>,
        questions: Vec<QuizQuestion>,
        time_limit: TimeLimit,
        started_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if questions.is_empty() {
            return Err(ValidationError::EmptyQuiz);
        }
        Ok(Self {
            topic: topic.into(),
            questions,
            current_index: 0,
            answers: HashMap::new(),
            time_remaining: time_limit,
            status: QuizStatus::InProgress,
            started_at,
            result: None,
            result_saved: false,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.current_index]
    }

    /// The answer recorded for the current question, if any.
    pub fn current_answer(&self) -> Option<&str> {
        self.answer_for(self.current_question().id)
    }

    pub fn answer_for(&self, id: QuestionId) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn time_remaining(&self) -> TimeLimit {
        self.time_remaining
    }

    pub fn status(&self) -> QuizStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == QuizStatus::Finished
    }

    /// The result produced when the session finished.
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// Sets or overwrites the answer for the current question. Any text is
    /// accepted, including the empty string. Ignored once finished.
    pub fn record_answer(&mut self, text: impl Into<String>) {
        if self.is_finished() {
            return;
        }
        let id = self.current_question().id;
        self.answers.insert(id, text.into());
    }

    /// Moves to the next question. Never wraps and never finishes the quiz.
    pub fn advance(&mut self) {
        if self.is_finished() {
            return;
        }
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        }
    }

    /// Moves to the previous question, stopping at the first one.
    pub fn retreat(&mut self) {
        if self.is_finished() {
            return;
        }
        if self.current_index > 0 {
            self.current_index -= 1;
        }
    }

    /// Accounts for one elapsed second. When the countdown reaches zero the
    /// session finishes and the freshly produced result is returned.
    pub fn tick(&mut self) -> Option<QuizResult> {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<QuizResult> {
        if self.is_finished() {
            return None;
        }
        match self.time_remaining {
            TimeLimit::Unlimited => None,
            TimeLimit::Seconds(left) => {
                let left = left.saturating_sub(1);
                self.time_remaining = TimeLimit::Seconds(left);
                if left == 0 {
                    self.finish_at(now)
                } else {
                    None
                }
            }
        }
    }

    /// Finishes the session and scores it.
    ///
    /// Only the first call produces a result; later calls return `None`.
    /// Whether the result has been stored is tracked separately, see
    /// `unsaved_result`.
    pub fn finish(&mut self) -> Option<QuizResult> {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(&mut self, now: DateTime<Utc>) -> Option<QuizResult> {
        if self.is_finished() {
            return None;
        }
        self.status = QuizStatus::Finished;

        let mut score = 0u32;
        let answers: Vec<GradedAnswer> = self
            .questions
            .iter()
            .map(|question| {
                let user_answer = self.answers.get(&question.id).cloned().unwrap_or_default();
                let is_correct = question.accepts(&user_answer);
                if is_correct {
                    score += 1;
                }
                GradedAnswer {
                    question: question.clone(),
                    user_answer,
                    is_correct,
                }
            })
            .collect();

        let time_taken_secs = (now - self.started_at).num_seconds().max(0) as u64;
        let result = QuizResult {
            topic: self.topic.clone(),
            score,
            total_questions: answers.len() as u32,
            time_taken_secs,
            date: now,
            answers,
        };
        self.result = Some(result.clone());
        Some(result)
    }

    /// The result, until `mark_result_saved` has been called.
    pub fn unsaved_result(&self) -> Option<&QuizResult> {
        self.result.as_ref().filter(|_| !self.result_saved)
    }

    /// Records that the result reached the result store. No-op before finishing.
    pub fn mark_result_saved(&mut self) {
        if self.result.is_some() {
            self.result_saved = true;
        }
    }
}

/// Formats seconds as a `MM:SS` countdown clock.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestionKind;
    use chrono::Duration;

    fn question(id: usize, text: &str, answer: &str) -> QuizQuestion {
        QuizQuestion {
            id: QuestionId(id),
            question: text.to_string(),
            kind: QuestionKind::ShortAnswer,
            answer: answer.to_string(),
            explanation: format!("Because {answer}."),
        }
    }

    fn session(limit: TimeLimit) -> QuizSession {
        QuizSession::new(
            "Geography",
            vec![
                question(0, "Capital of France?", "Paris"),
                question(1, "Capital of Italy?", "Rome"),
                question(2, "Capital of Spain?", "Madrid"),
            ],
            limit,
        )
        .unwrap()
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = QuizSession::new("Nothing", Vec::new(), TimeLimit::Unlimited).unwrap_err();
        assert_eq!(err, ValidationError::EmptyQuiz);
    }

    #[test]
    fn navigation_stops_at_both_ends() {
        let mut quiz = session(TimeLimit::Unlimited);
        quiz.retreat();
        assert_eq!(quiz.current_index(), 0);

        quiz.advance();
        quiz.advance();
        assert_eq!(quiz.current_index(), 2);
        quiz.advance();
        assert_eq!(quiz.current_index(), 2);
        assert_eq!(quiz.status(), QuizStatus::InProgress);

        quiz.retreat();
        assert_eq!(quiz.current_index(), 1);
    }

    #[test]
    fn recording_overwrites_the_current_answer() {
        let mut quiz = session(TimeLimit::Unlimited);
        quiz.record_answer("Lyon");
        quiz.record_answer("Paris");
        assert_eq!(quiz.current_answer(), Some("Paris"));
        assert_eq!(quiz.answered_count(), 1);

        quiz.advance();
        assert_eq!(quiz.current_answer(), None);
        quiz.record_answer("");
        assert_eq!(quiz.current_answer(), Some(""));
    }

    #[test]
    fn duplicate_question_text_keeps_answers_apart() {
        let mut quiz = QuizSession::new(
            "Repeats",
            vec![question(0, "Same?", "a"), question(1, "Same?", "b")],
            TimeLimit::Unlimited,
        )
        .unwrap();
        quiz.record_answer("a");
        quiz.advance();
        quiz.record_answer("b");

        let result = quiz.finish().unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.answers[0].user_answer, "a");
        assert_eq!(result.answers[1].user_answer, "b");
    }

    #[test]
    fn finishing_scores_in_question_order() {
        let start = Utc::now();
        let mut quiz = QuizSession::started_at(
            "Geography",
            vec![
                question(0, "Capital of France?", "paris"),
                question(1, "Capital of Italy?", "Rome"),
                question(2, "Capital of Spain?", "Madrid"),
            ],
            TimeLimit::Unlimited,
            start,
        )
        .unwrap();
        quiz.record_answer(" Paris ");
        quiz.advance();
        quiz.record_answer("Milan");

        let result = quiz.finish_at(start + Duration::seconds(42)).unwrap();

        assert_eq!(result.topic, "Geography");
        assert_eq!(result.score, 1);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.time_taken_secs, 42);
        assert_eq!(result.answers.len(), 3);
        assert!(result.answers[0].is_correct);
        assert!(!result.answers[1].is_correct);
        assert_eq!(result.answers[2].user_answer, "");
        assert!(!result.answers[2].is_correct);
        assert!(result.is_consistent());
    }

    #[test]
    fn finish_is_idempotent() {
        let mut quiz = session(TimeLimit::Unlimited);
        let first = quiz.finish();
        assert!(first.is_some());
        assert!(quiz.finish().is_none());
        assert_eq!(quiz.result(), first.as_ref());
        assert!(quiz.tick().is_none());
    }

    #[test]
    fn result_stays_unsaved_until_marked() {
        let mut quiz = session(TimeLimit::Unlimited);
        quiz.mark_result_saved();
        assert!(quiz.unsaved_result().is_none());

        let result = quiz.finish().unwrap();
        assert_eq!(quiz.unsaved_result(), Some(&result));
        assert!(quiz.finish().is_none());
        assert_eq!(quiz.unsaved_result(), Some(&result));

        quiz.mark_result_saved();
        assert!(quiz.unsaved_result().is_none());
        assert_eq!(quiz.result(), Some(&result));
    }

    #[test]
    fn finished_session_ignores_input() {
        let mut quiz = session(TimeLimit::Unlimited);
        quiz.finish();
        quiz.record_answer("Paris");
        quiz.advance();
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.answered_count(), 0);
    }

    #[test]
    fn countdown_finishes_on_the_last_second() {
        let mut quiz = session(TimeLimit::Seconds(2));
        assert!(quiz.tick().is_none());
        assert_eq!(quiz.time_remaining(), TimeLimit::Seconds(1));

        let result = quiz.tick().expect("timeout should finish the quiz");
        assert_eq!(quiz.status(), QuizStatus::Finished);
        assert_eq!(quiz.time_remaining(), TimeLimit::Seconds(0));
        assert_eq!(result.total_questions, 3);
    }

    #[test]
    fn time_taken_is_wall_clock_not_countdown() {
        let start = Utc::now();
        let mut quiz = QuizSession::started_at(
            "Geography",
            vec![question(0, "Capital of France?", "Paris")],
            TimeLimit::Seconds(1),
            start,
        )
        .unwrap();
        let result = quiz.tick_at(start + Duration::seconds(5)).unwrap();
        assert_eq!(result.time_taken_secs, 5);
    }

    #[test]
    fn unlimited_sessions_never_time_out() {
        let mut quiz = session(TimeLimit::from_minutes(0));
        for _ in 0..10_000 {
            assert!(quiz.tick().is_none());
        }
        assert_eq!(quiz.status(), QuizStatus::InProgress);
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
    }
}
