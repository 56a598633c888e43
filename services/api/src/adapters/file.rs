//! services/api/src/adapters/file.rs
//!
//! A `HistoryRepository` that keeps each slot in its own JSON file.

use crate::adapters::records::{decode_history, encode_history};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use study_assistant_core::{HistoryRepository, PortError, PortResult, QuizResult};

#[derive(Clone, Debug)]
pub struct FileHistoryAdapter {
    dir: PathBuf,
}

impl FileHistoryAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<dir>/<slot>.json`. Bytes of the slot name other than ASCII letters,
    /// digits, `-` and `_` are written as `%XX`, so distinct slots always get
    /// distinct files and none can leave `dir`.
    fn slot_path(&self, slot: &str) -> PathBuf {
        let mut name = String::with_capacity(slot.len());
        for byte in slot.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("%{:02X}", byte));
            }
        }
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl HistoryRepository for FileHistoryAdapter {
    async fn load_history(&self, slot: &str) -> PortResult<Vec<QuizResult>> {
        match tokio::fs::read_to_string(self.slot_path(slot)).await {
            Ok(payload) => decode_history(&payload),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(PortError::Persistence(e.to_string())),
        }
    }

    /// Writes a temporary file next to the slot and renames it into place.
    async fn save_history(&self, slot: &str, results: &[QuizResult]) -> PortResult<()> {
        let payload = encode_history(results)?;
        let path = self.slot_path(slot);
        let tmp = path.with_extension("json.tmp");

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;
        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_assistant_core::{QuestionId, QuestionKind, QuizQuestion, QuizSession, TimeLimit};

    fn finished(topic: &str) -> QuizResult {
        let question = QuizQuestion {
            id: QuestionId(0),
            question: "Is Rust memory safe?".to_string(),
            kind: QuestionKind::TrueFalse,
            answer: "True".to_string(),
            explanation: "Ownership.".to_string(),
        };
        let mut session = QuizSession::new(topic, vec![question], TimeLimit::Unlimited).unwrap();
        session.finish().unwrap()
    }

    #[tokio::test]
    async fn absent_file_is_an_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FileHistoryAdapter::new(dir.path());
        assert!(adapter.load_history("quizAnalytics").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saved_history_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FileHistoryAdapter::new(dir.path().join("nested"));
        adapter
            .save_history("quizAnalytics", &[finished("A"), finished("B")])
            .await
            .unwrap();

        let history = adapter.load_history("quizAnalytics").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].topic, "B");
        assert!(dir.path().join("nested/quizAnalytics.json").exists());
        assert!(!dir.path().join("nested/quizAnalytics.json.tmp").exists());
    }

    #[tokio::test]
    async fn garbage_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("slot.json"), "[{\"topic\":").unwrap();
        let adapter = FileHistoryAdapter::new(dir.path());
        assert!(matches!(
            adapter.load_history("slot").await,
            Err(PortError::Corrupt(_))
        ));
    }

    #[test]
    fn slot_names_cannot_escape_the_directory() {
        let adapter = FileHistoryAdapter::new("/data");
        assert_eq!(
            adapter.slot_path("../etc/passwd"),
            PathBuf::from("/data/%2E%2E%2Fetc%2Fpasswd.json")
        );
    }

    #[test]
    fn similar_slot_names_get_their_own_files() {
        let adapter = FileHistoryAdapter::new("/data");
        let paths = ["a.b", "a_b", "a%2Eb", "a b"].map(|slot| adapter.slot_path(slot));
        for (i, path) in paths.iter().enumerate() {
            assert!(paths[i + 1..].iter().all(|other| other != path), "{path:?}");
        }
        assert_eq!(
            adapter.slot_path("quiz-Analytics_2"),
            PathBuf::from("/data/quiz-Analytics_2.json")
        );
    }

    #[tokio::test]
    async fn dotted_and_underscored_slots_do_not_share_history() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FileHistoryAdapter::new(dir.path());
        adapter.save_history("a.b", &[finished("Dotted")]).await.unwrap();
        adapter.save_history("a_b", &[finished("Underscored")]).await.unwrap();

        assert_eq!(adapter.load_history("a.b").await.unwrap()[0].topic, "Dotted");
        assert_eq!(adapter.load_history("a_b").await.unwrap()[0].topic, "Underscored");
    }
}
