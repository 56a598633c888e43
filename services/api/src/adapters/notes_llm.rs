//! services/api/src/adapters/notes_llm.rs
//!
//! This module contains the adapter for the study-notes LLM.
//! It implements the `StudyNotesService` port from the `core` crate.

const NOTES_INSTRUCTIONS: &str = r#"You are an expert tutor preparing study material for a student.

Structure every response in exactly two parts, each introduced by its heading on its own line:

Tutor Explanation
A concise, clear explanation that breaks down the core concepts as if you were talking to the student.

Study Notes
Well-structured, easy-to-digest bullet points (one per line, starting with "* ") covering key definitions, principles and examples.

Use the web search tool so the material is accurate and up to date, and cite the pages you rely on as markdown links."#;

const USER_INPUT_TEMPLATE: &str = r#"Provide comprehensive study material for the topic "{topic}" within the course "{course}"."#;

// Citations wrapped in parentheses, e.g. `([example.com](https://example.com/page))`.
const WRAPPED_CITATION_PATTERN: &str = r"\s?\(\[[^\]]*\]\([^)]*\)\)";
const LINK_PATTERN: &str = r"\[([^\]]*)\]\((https?://[^)\s]+)\)";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::responses::{CreateResponseArgs, Tool, WebSearchTool},
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use study_assistant_core::{
    NotesQuery, PortError, PortResult, Source, StudyNotes, StudyNotesService,
};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StudyNotesService` using an OpenAI-compatible LLM
/// with web search.
#[derive(Clone)]
pub struct OpenAiNotesAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiNotesAdapter {
    /// Creates a new `OpenAiNotesAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Splits the model output into clean text and the sources it cited.
///
/// Sources are taken from every markdown link, de-duplicated by uri in order of
/// first appearance. Parenthesised citations are removed from the text and any
/// remaining links are reduced to their title.
pub fn extract_sources(raw: &str) -> PortResult<StudyNotes> {
    let wrapped =
        Regex::new(WRAPPED_CITATION_PATTERN).map_err(|e| PortError::Unexpected(e.to_string()))?;
    let link = Regex::new(LINK_PATTERN).map_err(|e| PortError::Unexpected(e.to_string()))?;

    let mut sources: Vec<Source> = Vec::new();
    for caps in link.captures_iter(raw) {
        let uri = caps[2].to_string();
        if sources.iter().any(|s| s.uri == uri) {
            continue;
        }
        sources.push(Source {
            title: caps[1].trim().to_string(),
            uri,
        });
    }

    let without_citations = wrapped.replace_all(raw, "");
    let text = link.replace_all(&without_citations, "$1").trim().to_string();
    if text.is_empty() {
        return Err(PortError::MalformedResponse(
            "Study notes response contained no text content.".to_string(),
        ));
    }
    Ok(StudyNotes { text, sources })
}

//=========================================================================================
// `StudyNotesService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyNotesService for OpenAiNotesAdapter {
    /// Asks the model for a tutor explanation and study notes, grounded by web search.
    async fn fetch_study_notes(&self, query: &NotesQuery) -> PortResult<StudyNotes> {
        info!(
            "Fetching study notes for '{}' in '{}'.",
            query.topic(),
            query.course()
        );
        let user_input = USER_INPUT_TEMPLATE
            .replace("{topic}", query.topic())
            .replace("{course}", query.course());

        let request = CreateResponseArgs::default()
            .model(&self.model)
            .instructions(NOTES_INSTRUCTIONS)
            .input(user_input)
            .tools(vec![Tool::WebSearch(WebSearchTool::default())])
            .max_output_tokens(4000u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(e.to_string()))?;

        let raw = response.output_text().unwrap_or_default();
        let notes = extract_sources(&raw)?;
        info!("Study notes ready with {} sources.", notes.sources.len());
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_become_sources_and_citations_are_stripped() {
        let raw = "Tutor Explanation\nA heap is a tree ([wiki](https://en.wikipedia.org/wiki/Heap)).\n\
                   Study Notes\n* See [the docs](https://docs.rs/heap) and [wiki](https://en.wikipedia.org/wiki/Heap).";
        let notes = extract_sources(raw).unwrap();

        assert_eq!(notes.sources.len(), 2);
        assert_eq!(notes.sources[0].title, "wiki");
        assert_eq!(notes.sources[0].uri, "https://en.wikipedia.org/wiki/Heap");
        assert_eq!(notes.sources[1].uri, "https://docs.rs/heap");
        assert!(notes.text.contains("A heap is a tree."));
        assert!(notes.text.contains("See the docs and wiki."));
        assert!(!notes.text.contains("https://"));
    }

    #[test]
    fn plain_text_has_no_sources() {
        let notes = extract_sources("Study Notes\n* Plain").unwrap();
        assert!(notes.sources.is_empty());
        assert_eq!(notes.text, "Study Notes\n* Plain");
    }

    #[test]
    fn empty_output_is_malformed() {
        assert!(matches!(
            extract_sources("   "),
            Err(PortError::MalformedResponse(_))
        ));
    }
}
