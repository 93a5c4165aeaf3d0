use chrono::{DateTime, Utc};
use quiz_core::model::{Category, DifficultyFilter, QuizSettings, ScoreEntry, ScoreEntryError};
use serde::{Deserialize, Serialize};

/// Persisted JSON shape of a leaderboard entry.
///
/// Field names follow the stored document (`playerName`, `timeTaken`, ...) so
/// existing leaderboards keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntryRecord {
    pub player_name: String,
    pub category: Category,
    pub score: u8,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub time_taken: u64,
    pub difficulty: DifficultyFilter,
    pub timestamp: DateTime<Utc>,
}

impl ScoreEntryRecord {
    #[must_use]
    pub fn from_entry(entry: &ScoreEntry) -> Self {
        Self {
            player_name: entry.player_name().to_owned(),
            category: entry.category(),
            score: entry.score_percent(),
            correct_answers: entry.correct_answers(),
            total_questions: entry.total_questions(),
            time_taken: entry.time_taken_secs(),
            difficulty: entry.difficulty(),
            timestamp: entry.recorded_at(),
        }
    }

    /// Convert the record back into a domain `ScoreEntry`.
    ///
    /// # Errors
    ///
    /// Returns `ScoreEntryError` if the stored values fail validation.
    pub fn into_entry(self) -> Result<ScoreEntry, ScoreEntryError> {
        ScoreEntry::from_persisted(
            &self.player_name,
            self.category,
            self.score,
            self.correct_answers,
            self.total_questions,
            self.time_taken,
            self.difficulty,
            self.timestamp,
        )
    }
}

/// Persisted home-page settings. `numQuestions` is stored as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub num_questions: String,
    pub enable_timer: bool,
    pub difficulty: String,
    pub last_category: String,
}

impl SettingsRecord {
    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self {
            num_questions: settings.question_count().to_string(),
            enable_timer: settings.timer_enabled(),
            difficulty: settings.difficulty().key().to_owned(),
            last_category: settings.last_category().key().to_owned(),
        }
    }

    /// Lenient conversion: unknown values fall back to the defaults.
    #[must_use]
    pub fn into_settings(self) -> QuizSettings {
        let defaults = QuizSettings::default();
        QuizSettings::from_persisted(
            self.num_questions
                .trim()
                .parse()
                .unwrap_or(defaults.question_count()),
            self.enable_timer,
            DifficultyFilter::from_key(&self.difficulty).unwrap_or(defaults.difficulty()),
            Category::from_key(&self.last_category).unwrap_or(defaults.last_category()),
        )
    }
}

/// Document written by the leaderboard export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardExport {
    pub exported_at: DateTime<Utc>,
    pub total_scores: usize,
    pub scores: Vec<ScoreEntryRecord>,
}
