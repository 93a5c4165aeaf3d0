use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Category, DifficultyFilter};
use crate::results::QuizResults;

/// Longest player name accepted on the leaderboard, in characters.
pub const MAX_PLAYER_NAME_LEN: usize = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreEntryError {
    #[error("player name cannot be empty")]
    EmptyPlayerName,

    #[error("player name is longer than {MAX_PLAYER_NAME_LEN} characters")]
    PlayerNameTooLong,

    #[error("score {0} is outside 0..=100")]
    ScoreOutOfRange(u8),

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("a score entry needs at least one question")]
    NoQuestions,
}

/// Normalize and validate a player display name.
///
/// # Errors
///
/// Returns `ScoreEntryError` if the trimmed name is empty or too long.
pub fn normalize_player_name(raw: &str) -> Result<String, ScoreEntryError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ScoreEntryError::EmptyPlayerName);
    }
    if name.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(ScoreEntryError::PlayerNameTooLong);
    }
    Ok(name.to_owned())
}

/// One persisted, immutable leaderboard record of a completed quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    player_name: String,
    category: Category,
    score_percent: u8,
    correct_answers: u32,
    total_questions: u32,
    time_taken_secs: u64,
    difficulty: DifficultyFilter,
    recorded_at: DateTime<Utc>,
}

impl ScoreEntry {
    /// Build the entry saved for a finished quiz.
    ///
    /// # Errors
    ///
    /// Returns `ScoreEntryError` if the player name is invalid.
    pub fn from_results(
        player_name: &str,
        category: Category,
        difficulty: DifficultyFilter,
        results: &QuizResults,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, ScoreEntryError> {
        Self::from_persisted(
            player_name,
            category,
            results.score_percent(),
            results.correct(),
            results.total(),
            results.time_taken_secs(),
            difficulty,
            recorded_at,
        )
    }

    /// Rehydrate an entry from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ScoreEntryError` if the name, score or counts are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        player_name: &str,
        category: Category,
        score_percent: u8,
        correct_answers: u32,
        total_questions: u32,
        time_taken_secs: u64,
        difficulty: DifficultyFilter,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, ScoreEntryError> {
        let player_name = normalize_player_name(player_name)?;
        if score_percent > 100 {
            return Err(ScoreEntryError::ScoreOutOfRange(score_percent));
        }
        if total_questions == 0 {
            return Err(ScoreEntryError::NoQuestions);
        }
        if correct_answers > total_questions {
            return Err(ScoreEntryError::CountMismatch {
                correct: correct_answers,
                total: total_questions,
            });
        }

        Ok(Self {
            player_name,
            category,
            score_percent,
            correct_answers,
            total_questions,
            time_taken_secs,
            difficulty,
            recorded_at,
        })
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn score_percent(&self) -> u8 {
        self.score_percent
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u64 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn difficulty(&self) -> DifficultyFilter {
        self.difficulty
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
