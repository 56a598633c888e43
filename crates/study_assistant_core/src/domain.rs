//! crates/study_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;

/// The choices offered for every True/False question.
pub const TRUE_FALSE_CHOICES: [&str; 2] = ["True", "False"];

/// The kinds of question a generated quiz can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    TrueFalse,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::MultipleChoice,
        QuestionType::ShortAnswer,
        QuestionType::TrueFalse,
    ];

    /// The human-readable label, which is also the wire label used by the provider.
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple Choice",
            QuestionType::ShortAnswer => "Short Answer",
            QuestionType::TrueFalse => "True/False",
        }
    }

    /// Parses a label, ignoring surrounding whitespace and ASCII case.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Requested difficulty of a generated quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identifier of a question within one quiz, assigned when the quiz is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId(pub usize);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The shape of a question. Only multiple choice questions carry options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice { options: [String; 4] },
    ShortAnswer,
    TrueFalse,
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::ShortAnswer => QuestionType::ShortAnswer,
            QuestionKind::TrueFalse => QuestionType::TrueFalse,
        }
    }
}

/// A single generated question. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: QuestionId,
    pub question: String,
    pub kind: QuestionKind,
    /// The canonical correct answer.
    pub answer: String,
    pub explanation: String,
}

impl QuizQuestion {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => Some(options.as_slice()),
            _ => None,
        }
    }

    /// The answers a client can pick from. Empty for short answer questions.
    pub fn choices(&self) -> Vec<String> {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => options.to_vec(),
            QuestionKind::TrueFalse => TRUE_FALSE_CHOICES.iter().map(|c| c.to_string()).collect(),
            QuestionKind::ShortAnswer => Vec::new(),
        }
    }

    /// Whether `user_answer` is accepted as the correct answer.
    pub fn accepts(&self, user_answer: &str) -> bool {
        answers_match(user_answer, &self.answer)
    }
}

/// Exact comparison after trimming and case-folding. No partial credit.
pub fn answers_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// One question of a finished quiz together with what the user answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question: QuizQuestion,
    pub user_answer: String,
    pub is_correct: bool,
}

/// The outcome of one finished quiz attempt. Created once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub topic: String,
    pub score: u32,
    pub total_questions: u32,
    pub time_taken_secs: u64,
    pub date: DateTime<Utc>,
    pub answers: Vec<GradedAnswer>,
}

impl QuizResult {
    /// Score as a percentage of the question count.
    pub fn score_percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total_questions) * 100.0
    }

    pub fn rounded_percent(&self) -> u32 {
        self.score_percent().round() as u32
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percent(self.rounded_percent())
    }

    /// Checks the result invariants: a non-empty quiz, one graded answer per
    /// question, and a score equal to the number of correct answers.
    pub fn is_consistent(&self) -> bool {
        let correct = self.answers.iter().filter(|a| a.is_correct).count();
        self.total_questions > 0
            && self.score <= self.total_questions
            && self.answers.len() == self.total_questions as usize
            && correct == self.score as usize
    }
}

/// Coarse grading of a single result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            70.. => ScoreBand::Strong,
            40..=69 => ScoreBand::Fair,
            _ => ScoreBand::Weak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: &str) -> QuizQuestion {
        QuizQuestion {
            id: QuestionId(0),
            question: "Capital of France?".to_string(),
            kind: QuestionKind::ShortAnswer,
            answer: answer.to_string(),
            explanation: String::new(),
        }
    }

    #[test]
    fn answers_ignore_case_and_surrounding_whitespace() {
        assert!(question("paris").accepts(" Paris "));
        assert!(question("True").accepts("true"));
        assert!(!question("paris").accepts("Pari"));
        assert!(!question("42").accepts("42.0"));
    }

    #[test]
    fn empty_answer_never_matches_a_real_answer() {
        assert!(!question("paris").accepts(""));
    }

    #[test]
    fn question_type_labels_parse_case_insensitively() {
        assert_eq!(
            QuestionType::from_label(" multiple choice "),
            Some(QuestionType::MultipleChoice)
        );
        assert_eq!(QuestionType::from_label("True/False"), Some(QuestionType::TrueFalse));
        assert_eq!(QuestionType::from_label("Essay"), None);
        assert_eq!(Difficulty::from_label("hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn true_false_questions_offer_fixed_choices() {
        let mut q = question("False");
        q.kind = QuestionKind::TrueFalse;
        assert_eq!(q.choices(), vec!["True".to_string(), "False".to_string()]);
        assert!(q.options().is_none());
    }

    #[test]
    fn score_bands_follow_percentage() {
        assert_eq!(ScoreBand::from_percent(100), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_percent(70), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_percent(69), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_percent(40), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_percent(39), ScoreBand::Weak);
    }
}
