pub mod db;
pub mod file;
pub mod memory;
pub mod notes_llm;
pub mod quiz_llm;
pub mod records;

pub use db::SqliteHistoryAdapter;
pub use file::FileHistoryAdapter;
pub use memory::InMemoryHistoryAdapter;
pub use notes_llm::OpenAiNotesAdapter;
pub use quiz_llm::OpenAiQuizAdapter;
