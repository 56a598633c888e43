//! services/api/src/adapters/quiz_llm.rs
//!
//! This module contains the adapter for the quiz-generating LLM.
//! It implements the `QuizGenerationService` port from the `core` crate and
//! validates every generated question before it reaches the domain.

const SYSTEM_INSTRUCTIONS: &str = r#"You write mock tests for students. Reply with a single JSON object and nothing else:

{"questions": [{"question": string, "type": string, "options": [string] | null, "answer": string, "explanation": string}]}

Rules:
- "type" is exactly one of "Multiple Choice", "Short Answer", "True/False".
- Multiple Choice questions have exactly 4 distinct options and the answer is one of them, written the same way.
- Other question types have "options": null.
- True/False answers are exactly "True" or "False".
- Short Answer answers are a short word or phrase.
- "explanation" briefly explains the correct answer."#;

const USER_INPUT_TEMPLATE: &str = r#"Generate a mock test with {count} questions on the topic "{topic}".
The difficulty level should be {difficulty}.
Include the following question types: {types}."#;

use crate::adapters::records::{check_answer_key, QuestionRecord};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::Deserialize;
use study_assistant_core::{
    PortError, PortResult, QuestionId, QuizGenerationService, QuizQuestion, QuizSpec,
};
use tracing::{info, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `QuizGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQuizAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQuizAdapter {
    /// Creates a new `OpenAiQuizAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[derive(Deserialize)]
struct QuizPayload {
    questions: Vec<QuestionRecord>,
}

/// Removes a surrounding markdown code fence, if the model added one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses and validates the model's JSON reply against `spec`.
///
/// Every question must fit the question shape, be of a requested type and have
/// a reachable answer. Fewer questions than requested is an error; extra ones
/// are dropped. Questions are numbered in the order received.
pub fn parse_quiz_payload(raw: &str, spec: &QuizSpec) -> PortResult<Vec<QuizQuestion>> {
    let payload: QuizPayload = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| PortError::MalformedResponse(format!("invalid quiz JSON: {}", e)))?;

    let mut records = payload.questions;
    if records.is_empty() {
        return Err(PortError::MalformedResponse(
            "quiz contained no questions".to_string(),
        ));
    }
    let wanted = spec.count() as usize;
    if records.len() < wanted {
        return Err(PortError::MalformedResponse(format!(
            "asked for {} questions, received {}",
            wanted,
            records.len()
        )));
    }
    if records.len() > wanted {
        warn!(
            "Quiz provider returned {} questions, keeping the first {}.",
            records.len(),
            wanted
        );
        records.truncate(wanted);
    }

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let invalid = |reason: String| {
                PortError::MalformedResponse(format!("question {}: {}", index + 1, reason))
            };
            let question = record.to_domain(QuestionId(index)).map_err(invalid)?;
            if !spec.types().contains(&question.question_type()) {
                return Err(invalid(format!(
                    "type {} was not requested",
                    question.question_type()
                )));
            }
            check_answer_key(&question).map_err(invalid)?;
            Ok(question)
        })
        .collect()
}

//=========================================================================================
// `QuizGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuizGenerationService for OpenAiQuizAdapter {
    async fn generate_quiz(&self, spec: &QuizSpec) -> PortResult<Vec<QuizQuestion>> {
        let types = spec
            .types()
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join(", ");
        let user_input = USER_INPUT_TEMPLATE
            .replace("{count}", &spec.count().to_string())
            .replace("{topic}", spec.topic())
            .replace("{difficulty}", spec.difficulty().label())
            .replace("{types}", &types);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and map the error here, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::MalformedResponse(
                    "Quiz generation LLM response contained no text content.".to_string(),
                )
            })?;

        let questions = parse_quiz_payload(&content, spec)?;
        info!(
            "Generated {} questions on '{}'.",
            questions.len(),
            spec.topic()
        );
        Ok(questions)
    }
}
