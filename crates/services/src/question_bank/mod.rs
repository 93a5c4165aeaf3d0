mod document;
mod fallback;
mod loader;
mod source;

pub use document::parse_document;
pub use fallback::{builtin_questions, cycle_to};
pub use loader::{LoadedQuestions, QuestionBank, QuestionOrigin, select};
pub use source::{HttpQuestionSource, OfflineSource, QuestionSource};
