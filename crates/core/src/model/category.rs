use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Quiz category. Each category has its own question document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Science,
    Programming,
    History,
    Math,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::General,
        Category::Science,
        Category::Programming,
        Category::History,
        Category::Math,
    ];

    /// Stable key used in navigation parameters, documents and storage.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Science => "science",
            Category::Programming => "programming",
            Category::History => "history",
            Category::Math => "math",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Category::General => "General Knowledge",
            Category::Science => "Science & Technology",
            Category::Programming => "Programming",
            Category::History => "History",
            Category::Math => "Mathematics",
        }
    }

    /// File name of the category's question document, relative to the data root.
    #[must_use]
    pub fn data_file(self) -> &'static str {
        match self {
            Category::General => "general-knowledge.json",
            Category::Science => "science.json",
            Category::Programming => "programming.json",
            Category::History => "history.json",
            Category::Math => "mathematics.json",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Difficulty selection for a quiz. `All` is the wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyFilter {
    All,
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyFilter {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            DifficultyFilter::All => "all",
            DifficultyFilter::Easy => "easy",
            DifficultyFilter::Medium => "medium",
            DifficultyFilter::Hard => "hard",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "all" => Some(Self::All),
            other => Difficulty::from_key(other).map(Self::from),
        }
    }

    /// The single difficulty selected, or `None` for the wildcard.
    #[must_use]
    pub fn difficulty(self) -> Option<Difficulty> {
        match self {
            DifficultyFilter::All => None,
            DifficultyFilter::Easy => Some(Difficulty::Easy),
            DifficultyFilter::Medium => Some(Difficulty::Medium),
            DifficultyFilter::Hard => Some(Difficulty::Hard),
        }
    }

    #[must_use]
    pub fn matches(self, difficulty: Difficulty) -> bool {
        self.difficulty().is_none_or(|d| d == difficulty)
    }
}

impl From<Difficulty> for DifficultyFilter {
    fn from(value: Difficulty) -> Self {
        match value {
            Difficulty::Easy => Self::Easy,
            Difficulty::Medium => Self::Medium,
            Difficulty::Hard => Self::Hard,
        }
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
