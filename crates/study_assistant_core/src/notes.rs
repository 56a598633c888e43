//! crates/study_assistant_core/src/notes.rs
//!
//! Study notes returned by the answer provider, and the split of their text
//! into the headed sections the provider is asked to write.

const SECTION_HEADINGS: [&str; 2] = ["Tutor Explanation", "Study Notes"];

/// A web source the provider consulted while writing the notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

impl Source {
    /// The title, or the uri when the provider gave no title.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.uri
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyNotes {
    pub text: String,
    pub sources: Vec<Source>,
}

/// One headed block of the notes text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSection {
    pub title: String,
    pub lines: Vec<String>,
}

impl StudyNotes {
    /// Splits the text before every "Tutor Explanation" or "Study Notes"
    /// heading (ASCII case-insensitive). Text without a heading becomes
    /// `Section N`, numbered by position. Blank lines are dropped and a
    /// leading `* ` bullet is removed from each line.
    pub fn sections(&self) -> Vec<NoteSection> {
        let lowered = self.text.to_ascii_lowercase();
        let mut cuts: Vec<usize> = SECTION_HEADINGS
            .iter()
            .flat_map(|heading| {
                let needle = heading.to_ascii_lowercase();
                lowered
                    .match_indices(&needle)
                    .map(|(at, _)| at)
                    .collect::<Vec<_>>()
            })
            .filter(|&at| at > 0)
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut bounds = Vec::with_capacity(cuts.len() + 2);
        bounds.push(0);
        bounds.extend(cuts);
        bounds.push(self.text.len());

        bounds
            .windows(2)
            .enumerate()
            .filter_map(|(index, pair)| {
                let chunk = &self.text[pair[0]..pair[1]];
                if chunk.trim().is_empty() {
                    return None;
                }
                let heading = SECTION_HEADINGS.iter().find_map(|h| {
                    chunk
                        .get(..h.len())
                        .filter(|prefix| prefix.eq_ignore_ascii_case(h))
                });
                let (title, body) = match heading {
                    Some(prefix) => (prefix.to_string(), &chunk[prefix.len()..]),
                    None => (format!("Section {}", index + 1), chunk),
                };
                let lines = body
                    .trim()
                    .lines()
                    .map(|line| line.strip_prefix("* ").unwrap_or(line))
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect();
                Some(NoteSection { title, lines })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(text: &str) -> StudyNotes {
        StudyNotes {
            text: text.to_string(),
            sources: Vec::new(),
        }
    }

    #[test]
    fn splits_on_both_headings() {
        let sections = notes(
            "Tutor Explanation\nA stack is LIFO.\n\nStudy Notes\n* Push adds\n* Pop removes\n",
        )
        .sections();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Tutor Explanation");
        assert_eq!(sections[0].lines, vec!["A stack is LIFO."]);
        assert_eq!(sections[1].title, "Study Notes");
        assert_eq!(sections[1].lines, vec!["Push adds", "Pop removes"]);
    }

    #[test]
    fn leading_text_gets_a_numbered_title() {
        let sections = notes("Intro line\nstudy notes\n1. First").sections();

        assert_eq!(sections[0].title, "Section 1");
        assert_eq!(sections[0].lines, vec!["Intro line"]);
        assert_eq!(sections[1].title, "study notes");
        assert_eq!(sections[1].lines, vec!["1. First"]);
    }

    #[test]
    fn text_without_headings_is_one_section() {
        let sections = notes("Just some text.").sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Section 1");
    }

    #[test]
    fn source_title_falls_back_to_uri() {
        let source = Source {
            title: " ".to_string(),
            uri: "https://example.org".to_string(),
        };
        assert_eq!(source.display_title(), "https://example.org");
    }
}
