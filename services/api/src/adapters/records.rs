//! services/api/src/adapters/records.rs
//!
//! "Impure" serialized shapes of the domain types. The same question shape is
//! used by the answer provider's quiz payload and by the persisted history, so
//! both go through the same strict conversion back into the domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use study_assistant_core::{
    domain::TRUE_FALSE_CHOICES, GradedAnswer, PortError, PortResult, QuestionId, QuestionKind,
    QuestionType, QuizQuestion, QuizResult,
};
use tracing::warn;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuestionRecord {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub answer: String,
    pub explanation: String,
}

impl QuestionRecord {
    pub fn from_domain(question: &QuizQuestion) -> Self {
        Self {
            question: question.question.clone(),
            question_type: question.question_type().label().to_string(),
            options: question.options().map(<[String]>::to_vec),
            answer: question.answer.clone(),
            explanation: question.explanation.clone(),
        }
    }

    /// Converts the record, rejecting anything that does not fit the question
    /// shape: blank text, an unknown type, options on a non multiple choice
    /// question, or a multiple choice question without exactly four options.
    pub fn to_domain(self, id: QuestionId) -> Result<QuizQuestion, String> {
        if self.question.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        if self.answer.trim().is_empty() {
            return Err("answer is empty".to_string());
        }
        let question_type = QuestionType::from_label(&self.question_type)
            .ok_or_else(|| format!("unknown question type '{}'", self.question_type))?;
        let options = self.options.unwrap_or_default();

        let kind = match question_type {
            QuestionType::MultipleChoice => {
                if options.iter().any(|o| o.trim().is_empty()) {
                    return Err("multiple choice option is empty".to_string());
                }
                let options: [String; 4] = options.try_into().map_err(|o: Vec<String>| {
                    format!("multiple choice needs exactly 4 options, got {}", o.len())
                })?;
                QuestionKind::MultipleChoice { options }
            }
            QuestionType::ShortAnswer | QuestionType::TrueFalse if !options.is_empty() => {
                return Err(format!("{} question must not carry options", question_type));
            }
            QuestionType::ShortAnswer => QuestionKind::ShortAnswer,
            QuestionType::TrueFalse => QuestionKind::TrueFalse,
        };

        Ok(QuizQuestion {
            id,
            question: self.question,
            kind,
            answer: self.answer,
            explanation: self.explanation,
        })
    }
}

/// Checks that a generated question's answer key can actually be given: a
/// multiple choice answer must be one of its options and a True/False answer
/// must be `True` or `False`.
pub fn check_answer_key(question: &QuizQuestion) -> Result<(), String> {
    let acceptable = match &question.kind {
        QuestionKind::MultipleChoice { options } => options.iter().any(|o| question.accepts(o)),
        QuestionKind::TrueFalse => TRUE_FALSE_CHOICES.iter().any(|c| question.accepts(c)),
        QuestionKind::ShortAnswer => true,
    };
    if acceptable {
        Ok(())
    } else {
        Err(format!(
            "answer '{}' is not one of the available choices",
            question.answer
        ))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct GradedAnswerRecord {
    question: QuestionRecord,
    user_answer: String,
    is_correct: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct QuizResultRecord {
    topic: String,
    score: u32,
    total_questions: u32,
    time_taken: u64,
    date: DateTime<Utc>,
    answers: Vec<GradedAnswerRecord>,
}

impl QuizResultRecord {
    fn from_domain(result: &QuizResult) -> Self {
        Self {
            topic: result.topic.clone(),
            score: result.score,
            total_questions: result.total_questions,
            time_taken: result.time_taken_secs,
            date: result.date,
            answers: result
                .answers
                .iter()
                .map(|a| GradedAnswerRecord {
                    question: QuestionRecord::from_domain(&a.question),
                    user_answer: a.user_answer.clone(),
                    is_correct: a.is_correct,
                })
                .collect(),
        }
    }

    fn to_domain(self) -> Result<QuizResult, String> {
        let answers = self
            .answers
            .into_iter()
            .enumerate()
            .map(|(index, a)| {
                Ok(GradedAnswer {
                    question: a.question.to_domain(QuestionId(index))?,
                    user_answer: a.user_answer,
                    is_correct: a.is_correct,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        let result = QuizResult {
            topic: self.topic,
            score: self.score,
            total_questions: self.total_questions,
            time_taken_secs: self.time_taken,
            date: self.date,
            answers,
        };
        if !result.is_consistent() {
            return Err(format!(
                "result for '{}' has score {} of {} with {} answers",
                result.topic,
                result.score,
                result.total_questions,
                result.answers.len()
            ));
        }
        Ok(result)
    }
}

/// Serializes a history to the persisted JSON array.
pub fn encode_history(results: &[QuizResult]) -> PortResult<String> {
    let records: Vec<QuizResultRecord> = results.iter().map(QuizResultRecord::from_domain).collect();
    serde_json::to_string(&records).map_err(|e| PortError::Unexpected(e.to_string()))
}

/// Parses a persisted JSON array. A payload that is not a JSON array is
/// `PortError::Corrupt`; entries that do not decode or break a result invariant
/// are logged and skipped.
pub fn decode_history(payload: &str) -> PortResult<Vec<QuizResult>> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(payload).map_err(|e| PortError::Corrupt(e.to_string()))?;
    let results = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let decoded = serde_json::from_value::<QuizResultRecord>(entry)
                .map_err(|e| e.to_string())
                .and_then(QuizResultRecord::to_domain);
            match decoded {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Skipping stored quiz result {}: {}", index, e);
                    None
                }
            }
        })
        .collect();
    Ok(results)
}
