use chrono::{DateTime, Duration, Local, Utc};
use thiserror::Error;

use crate::model::{Category, ScoreEntry, ScoreEntryError, normalize_player_name};
use crate::results::round_percent;

/// Most entries kept; lower scores fall off the end.
pub const LEADERBOARD_CAPACITY: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const PODIUM_SIZE: usize = 3;
/// Entries shown in the home page preview.
pub const PREVIEW_SIZE: usize = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error("page number and page size must be at least 1")]
    InvalidPage,

    #[error("page {page} is beyond the last page ({total_pages})")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("invalid player name: {0}")]
    InvalidPlayerName(#[from] ScoreEntryError),
}

//
// ─── FILTERS ───────────────────────────────────────────────────────────────────
//

/// Recency window applied to `recorded_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    /// Same UTC calendar day as now.
    Today,
    /// Trailing 7 x 24 hours.
    Week,
    /// Trailing 30 x 24 hours.
    Month,
    #[default]
    All,
}

impl TimeWindow {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            TimeWindow::Today => "today",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::All => "all",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "today" => Some(Self::Today),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(self, recorded_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            // the player's calendar day, not the UTC one
            TimeWindow::Today => {
                recorded_at.with_timezone(&Local).date_naive()
                    == now.with_timezone(&Local).date_naive()
            }
            TimeWindow::Week => recorded_at >= now - Duration::days(7),
            TimeWindow::Month => recorded_at >= now - Duration::days(30),
            TimeWindow::All => true,
        }
    }
}

/// Category, time window and name search, all combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardFilter {
    category: Option<Category>,
    window: TimeWindow,
    search: String,
}

impl LeaderboardFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Case-insensitive substring match on the player name. Blank matches everyone.
    #[must_use]
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.trim().to_lowercase();
        self
    }

    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    #[must_use]
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    #[must_use]
    pub fn matches(&self, entry: &ScoreEntry, now: DateTime<Utc>) -> bool {
        self.category.is_none_or(|c| entry.category() == c)
            && self.window.contains(entry.recorded_at(), now)
            && (self.search.is_empty()
                || entry.player_name().to_lowercase().contains(&self.search))
    }
}

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// An entry together with its 1-based position in the full leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: usize,
    pub entry: ScoreEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardPage {
    pub entries: Vec<RankedEntry>,
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    pub total_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardView {
    /// Nothing matches the filter.
    Empty,
    Page(LeaderboardPage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeaderboardStats {
    pub entry_count: usize,
    pub average_score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonalStats {
    pub best_score: u8,
    pub quizzes_taken: usize,
    pub average_score: u8,
    pub best_rank: usize,
}

//
// ─── COLLECTION ────────────────────────────────────────────────────────────────
//

/// Score history, sorted descending by score and capped at `LEADERBOARD_CAPACITY`.
///
/// Ties keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted entries, restoring the ordering and cap.
    #[must_use]
    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        entries.sort_by(|a, b| b.score_percent().cmp(&a.score_percent()));
        entries.truncate(LEADERBOARD_CAPACITY);
        Self { entries }
    }

    /// Insert an entry and return its rank, or `None` if it did not make the cut.
    pub fn add(&mut self, entry: ScoreEntry) -> Option<usize> {
        // after all equal scores, same as a stable sort of the appended entry
        let at = self
            .entries
            .partition_point(|e| e.score_percent() >= entry.score_percent());
        self.entries.insert(at, entry);
        self.entries.truncate(LEADERBOARD_CAPACITY);
        (at < LEADERBOARD_CAPACITY).then_some(at + 1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ScoreEntry> {
        self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ranked(&self) -> impl Iterator<Item = (usize, &ScoreEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }

    #[must_use]
    pub fn filtered(&self, filter: &LeaderboardFilter, now: DateTime<Utc>) -> Vec<RankedEntry> {
        self.ranked()
            .filter(|(_, e)| filter.matches(e, now))
            .map(|(rank, e)| RankedEntry {
                rank,
                entry: e.clone(),
            })
            .collect()
    }

    /// One page of the filtered leaderboard.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::InvalidPage` for a zero page or page size and
    /// `LeaderboardError::PageOutOfRange` past the last page of a non-empty result.
    pub fn query(
        &self,
        filter: &LeaderboardFilter,
        now: DateTime<Utc>,
        page: usize,
        page_size: usize,
    ) -> Result<LeaderboardView, LeaderboardError> {
        if page == 0 || page_size == 0 {
            return Err(LeaderboardError::InvalidPage);
        }

        let matching = self.filtered(filter, now);
        if matching.is_empty() {
            return Ok(LeaderboardView::Empty);
        }

        let total_entries = matching.len();
        let total_pages = total_entries.div_ceil(page_size);
        if page > total_pages {
            return Err(LeaderboardError::PageOutOfRange { page, total_pages });
        }

        let entries = matching
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Ok(LeaderboardView::Page(LeaderboardPage {
            entries,
            page,
            total_pages,
            total_entries,
        }))
    }

    #[must_use]
    pub fn podium(&self, filter: &LeaderboardFilter, now: DateTime<Utc>) -> Vec<RankedEntry> {
        let mut top = self.filtered(filter, now);
        top.truncate(PODIUM_SIZE);
        top
    }

    #[must_use]
    pub fn top(&self, n: usize) -> Vec<RankedEntry> {
        self.ranked()
            .take(n)
            .map(|(rank, e)| RankedEntry {
                rank,
                entry: e.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn stats(&self, filter: &LeaderboardFilter, now: DateTime<Utc>) -> LeaderboardStats {
        let scores: Vec<u8> = self
            .entries
            .iter()
            .filter(|e| filter.matches(e, now))
            .map(ScoreEntry::score_percent)
            .collect();
        LeaderboardStats {
            entry_count: scores.len(),
            average_score: average(&scores),
        }
    }

    /// Aggregates over every entry recorded under `player_name` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::InvalidPlayerName` if the name is blank or too long.
    pub fn personal_stats(&self, player_name: &str) -> Result<Option<PersonalStats>, LeaderboardError> {
        let name = normalize_player_name(player_name)?.to_lowercase();

        let mine: Vec<(usize, &ScoreEntry)> = self
            .ranked()
            .filter(|(_, e)| e.player_name().to_lowercase() == name)
            .collect();
        let Some(&(best_rank, best)) = mine.first() else {
            return Ok(None);
        };

        let scores: Vec<u8> = mine.iter().map(|(_, e)| e.score_percent()).collect();
        Ok(Some(PersonalStats {
            best_score: best.score_percent(),
            quizzes_taken: mine.len(),
            average_score: average(&scores),
            best_rank,
        }))
    }
}

fn average(scores: &[u8]) -> u8 {
    let sum: u32 = scores.iter().map(|s| u32::from(*s)).sum();
    let count = u32::try_from(scores.len()).unwrap_or(u32::MAX);
    round_percent(sum, count.saturating_mul(100))
}
