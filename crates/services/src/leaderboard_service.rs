use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::achievements::{self, AchievementStatus};
use quiz_core::leaderboard::{
    Leaderboard, LeaderboardFilter, LeaderboardStats, LeaderboardView, PREVIEW_SIZE,
    PersonalStats, RankedEntry,
};
use quiz_core::model::{Category, DifficultyFilter, ScoreEntry};
use quiz_core::results::QuizResults;
use storage::records::{LeaderboardExport, ScoreEntryRecord};
use storage::repository::LeaderboardRepository;
use tracing::info;

use crate::error::LeaderboardServiceError;

/// A score that was written to the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedScore {
    pub entry: ScoreEntry,
    /// 1-based rank, or `None` if the score did not make the top entries.
    pub rank: Option<usize>,
}

/// Pretty-printed export ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Orchestrates persisted score history and the views built from it.
#[derive(Clone)]
pub struct LeaderboardService {
    clock: Clock,
    scores: Arc<dyn LeaderboardRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(clock: Clock, scores: Arc<dyn LeaderboardRepository>) -> Self {
        Self { clock, scores }
    }

    /// Load the current leaderboard.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` if the history cannot be read.
    pub async fn load(&self) -> Result<Leaderboard, LeaderboardServiceError> {
        Ok(Leaderboard::from_entries(self.scores.load_scores().await?))
    }

    /// Record a finished quiz under `player_name`.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::ScoreEntry` for an invalid name and
    /// `LeaderboardServiceError::Storage` if the history cannot be written.
    pub async fn save_score(
        &self,
        player_name: &str,
        category: Category,
        difficulty: DifficultyFilter,
        results: &QuizResults,
    ) -> Result<SavedScore, LeaderboardServiceError> {
        let entry =
            ScoreEntry::from_results(player_name, category, difficulty, results, self.clock.now())?;

        let mut board = self.load().await?;
        let rank = board.add(entry.clone());
        self.scores.save_scores(board.entries()).await?;

        info!(
            player = entry.player_name(),
            %category,
            score = entry.score_percent(),
            ?rank,
            "score saved"
        );
        Ok(SavedScore { entry, rank })
    }

    /// One page of the filtered leaderboard.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Leaderboard` for an invalid page.
    pub async fn query(
        &self,
        filter: &LeaderboardFilter,
        page: usize,
        page_size: usize,
    ) -> Result<LeaderboardView, LeaderboardServiceError> {
        let board = self.load().await?;
        Ok(board.query(filter, self.clock.now(), page, page_size)?)
    }

    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` if the history cannot be read.
    pub async fn podium(
        &self,
        filter: &LeaderboardFilter,
    ) -> Result<Vec<RankedEntry>, LeaderboardServiceError> {
        Ok(self.load().await?.podium(filter, self.clock.now()))
    }

    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` if the history cannot be read.
    pub async fn stats(
        &self,
        filter: &LeaderboardFilter,
    ) -> Result<LeaderboardStats, LeaderboardServiceError> {
        Ok(self.load().await?.stats(filter, self.clock.now()))
    }

    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Leaderboard` for an invalid name.
    pub async fn personal_stats(
        &self,
        player_name: &str,
    ) -> Result<Option<PersonalStats>, LeaderboardServiceError> {
        Ok(self.load().await?.personal_stats(player_name)?)
    }

    /// Top entries for the home page.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` if the history cannot be read.
    pub async fn preview(&self) -> Result<Vec<RankedEntry>, LeaderboardServiceError> {
        Ok(self.load().await?.top(PREVIEW_SIZE))
    }

    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` if the history cannot be read.
    pub async fn achievements(&self) -> Result<Vec<AchievementStatus>, LeaderboardServiceError> {
        Ok(achievements::evaluate(self.load().await?.entries()))
    }

    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` if the history cannot be read.
    pub async fn export(&self) -> Result<LeaderboardExport, LeaderboardServiceError> {
        let board = self.load().await?;
        let scores: Vec<ScoreEntryRecord> = board
            .entries()
            .iter()
            .map(ScoreEntryRecord::from_entry)
            .collect();
        Ok(LeaderboardExport {
            exported_at: self.clock.now(),
            total_scores: scores.len(),
            scores,
        })
    }

    /// Export as pretty JSON with a dated file name.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Export` if serialization fails.
    pub async fn export_file(&self) -> Result<ExportFile, LeaderboardServiceError> {
        let export = self.export().await?;
        let file_name = format!(
            "quizspark-leaderboard-{}.json",
            export.exported_at.format("%Y-%m-%d")
        );
        let contents = serde_json::to_string_pretty(&export)?;
        Ok(ExportFile {
            file_name,
            contents,
        })
    }

    /// Remove every stored score. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` if the history cannot be removed.
    pub async fn delete_all(&self) -> Result<(), LeaderboardServiceError> {
        self.scores.clear_scores().await?;
        info!("leaderboard cleared");
        Ok(())
    }
}
