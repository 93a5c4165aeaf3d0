use thiserror::Error;

use crate::leaderboard::LeaderboardError;
use crate::model::{ParamError, QuestionError, ScoreEntryError};
use crate::session::SessionError;

/// Any domain-level failure raised by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    ScoreEntry(#[from] ScoreEntryError),
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}
