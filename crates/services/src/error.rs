//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::leaderboard::LeaderboardError;
use quiz_core::model::ScoreEntryError;
use quiz_core::session::SessionError;
use storage::repository::StorageError;

/// A question source could not deliver a usable document.
///
/// Always absorbed by the fallback chain; never reaches the user.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("no source configured")]
    Offline,
}

/// A question document could not be turned into questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("document contains no question list")]
    NoQuestionList,
    #[error("document contains no valid questions")]
    NoValidQuestions,
}

/// Errors emitted by `QuestionBank`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoaderError {
    #[error("unable to load quiz questions")]
    NoQuestionsAvailable,
}

/// Errors emitted by `QuizRunner`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
}

/// Errors emitted by `LeaderboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardServiceError {
    #[error(transparent)]
    ScoreEntry(#[from] ScoreEntryError),
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("export failed: {0}")]
    Export(#[from] serde_json::Error),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    PlayerName(#[from] ScoreEntryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
