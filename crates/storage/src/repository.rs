use async_trait::async_trait;
use quiz_core::model::{Category, QuizSettings, ScoreEntry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::warn;

use crate::records::{ScoreEntryRecord, SettingsRecord};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Keys of the persisted documents.
pub mod keys {
    use quiz_core::model::Category;

    pub const LEADERBOARD: &str = "quizSparkLeaderboard";
    pub const SETTINGS: &str = "quizSparkSettings";
    pub const PLAYER_NAME: &str = "quizSparkPlayerName";
    /// Bump the version when the cached question format changes.
    pub const QUESTION_CACHE_PREFIX: &str = "quiz_data_cache_v2_";

    #[must_use]
    pub fn question_cache(category: Category) -> String {
        format!("{QUESTION_CACHE_PREFIX}{}", category.key())
    }
}

//
// ─── PORTS ─────────────────────────────────────────────────────────────────────
//

/// String-keyed store of JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Repository contract for the score history.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Load every stored entry. Records that fail validation are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the document is not a JSON array.
    async fn load_scores(&self) -> Result<Vec<ScoreEntry>, StorageError>;

    /// Replace the stored history with `entries`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be written.
    async fn save_scores(&self, entries: &[ScoreEntry]) -> Result<(), StorageError>;

    /// Delete the stored history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be removed.
    async fn clear_scores(&self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be read or parsed.
    async fn load_settings(&self) -> Result<Option<QuizSettings>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn save_settings(&self, settings: &QuizSettings) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be read or parsed.
    async fn load_player_name(&self) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn save_player_name(&self, name: &str) -> Result<(), StorageError>;
}

/// Raw question documents cached per category.
#[async_trait]
pub trait QuestionCacheRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the cache cannot be read.
    async fn cached_questions(&self, category: Category) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the cache cannot be written.
    async fn cache_questions(&self, category: Category, document: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be removed.
    async fn evict_questions(&self, category: Category) -> Result<(), StorageError>;
}

//
// ─── TYPED REPOSITORIES OVER ANY KEY-VALUE STORE ───────────────────────────────
//

#[async_trait]
impl<T> LeaderboardRepository for T
where
    T: KeyValueStore + ?Sized,
{
    async fn load_scores(&self) -> Result<Vec<ScoreEntry>, StorageError> {
        let Some(raw) = self.get(keys::LEADERBOARD).await? else {
            return Ok(Vec::new());
        };
        // an unreadable document counts as no history; the next save replaces it
        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(err) => {
                warn!(error = %err, "leaderboard document unreadable, starting empty");
                return Ok(Vec::new());
            }
        };

        let mut entries = Vec::with_capacity(values.len());
        for value in values {
            let entry = serde_json::from_value::<ScoreEntryRecord>(value)
                .map_err(ser)
                .and_then(|record| record.into_entry().map_err(ser));
            match entry {
                Ok(entry) => entries.push(entry),
                Err(err) => warn!(error = %err, "skipping invalid leaderboard record"),
            }
        }
        Ok(entries)
    }

    async fn save_scores(&self, entries: &[ScoreEntry]) -> Result<(), StorageError> {
        let records: Vec<ScoreEntryRecord> =
            entries.iter().map(ScoreEntryRecord::from_entry).collect();
        let raw = serde_json::to_string(&records).map_err(ser)?;
        self.set(keys::LEADERBOARD, &raw).await
    }

    async fn clear_scores(&self) -> Result<(), StorageError> {
        self.remove(keys::LEADERBOARD).await
    }
}

#[async_trait]
impl<T> SettingsRepository for T
where
    T: KeyValueStore + ?Sized,
{
    async fn load_settings(&self) -> Result<Option<QuizSettings>, StorageError> {
        let Some(raw) = self.get(keys::SETTINGS).await? else {
            return Ok(None);
        };
        let record: SettingsRecord = serde_json::from_str(&raw).map_err(ser)?;
        Ok(Some(record.into_settings()))
    }

    async fn save_settings(&self, settings: &QuizSettings) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&SettingsRecord::from_settings(settings)).map_err(ser)?;
        self.set(keys::SETTINGS, &raw).await
    }

    async fn load_player_name(&self) -> Result<Option<String>, StorageError> {
        let Some(raw) = self.get(keys::PLAYER_NAME).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(name) => Ok(Some(name)),
            Err(err) => {
                warn!(error = %err, "stored player name unreadable, ignoring it");
                Ok(None)
            }
        }
    }

    async fn save_player_name(&self, name: &str) -> Result<(), StorageError> {
        let raw = serde_json::to_string(name).map_err(ser)?;
        self.set(keys::PLAYER_NAME, &raw).await
    }
}

#[async_trait]
impl<T> QuestionCacheRepository for T
where
    T: KeyValueStore + ?Sized,
{
    async fn cached_questions(&self, category: Category) -> Result<Option<String>, StorageError> {
        self.get(&keys::question_cache(category)).await
    }

    async fn cache_questions(&self, category: Category, document: &str) -> Result<(), StorageError> {
        self.set(&keys::question_cache(category), document).await
    }

    async fn evict_questions(&self, category: Category) -> Result<(), StorageError> {
        self.remove(&keys::question_cache(category)).await
    }
}

//
// ─── IN-MEMORY ADAPTER ─────────────────────────────────────────────────────────
//

/// Process-local store, used for tests and when the database cannot be opened.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    Sqlite,
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub leaderboard: Arc<dyn LeaderboardRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub question_cache: Arc<dyn QuestionCacheRepository>,
    backend: StorageBackend,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryStore::new(), StorageBackend::InMemory)
    }

    /// Wire every repository to one shared key-value store.
    #[must_use]
    pub fn from_store<S>(store: S, backend: StorageBackend) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let store = Arc::new(store);
        let kv: Arc<dyn KeyValueStore> = store.clone();
        let leaderboard: Arc<dyn LeaderboardRepository> = store.clone();
        let settings: Arc<dyn SettingsRepository> = store.clone();
        let question_cache: Arc<dyn QuestionCacheRepository> = store;
        Self {
            kv,
            leaderboard,
            settings,
            question_cache,
            backend,
        }
    }

    #[must_use]
    pub fn backend(&self) -> StorageBackend {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::DifficultyFilter;
    use quiz_core::time::fixed_now;

    fn entry(name: &str, score: u8) -> ScoreEntry {
        ScoreEntry::from_persisted(
            name,
            Category::History,
            score,
            1,
            2,
            40,
            DifficultyFilter::All,
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn round_trips_scores_in_order() {
        let storage = Storage::in_memory();
        let scores = vec![entry("a", 90), entry("b", 50)];
        storage.leaderboard.save_scores(&scores).await.unwrap();
        assert_eq!(storage.leaderboard.load_scores().await.unwrap(), scores);

        storage.leaderboard.clear_scores().await.unwrap();
        assert!(storage.leaderboard.load_scores().await.unwrap().is_empty());
        assert_eq!(storage.kv.get(keys::LEADERBOARD).await.unwrap(), None);
    }

    #[tokio::test]
    async fn skips_invalid_score_records() {
        let store = InMemoryStore::new();
        store
            .set(
                keys::LEADERBOARD,
                r#"[{"playerName":"","category":"math","score":10,"correctAnswers":1,"totalQuestions":1,"timeTaken":5,"difficulty":"easy","timestamp":"2023-11-14T22:13:20Z"},
                    {"playerName":"Ok","category":"math","score":100,"correctAnswers":1,"totalQuestions":1,"timeTaken":5,"difficulty":"easy","timestamp":"2023-11-14T22:13:20Z"},
                    {"nonsense":true}]"#,
            )
            .await
            .unwrap();
        let scores = store.load_scores().await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].player_name(), "Ok");

        store.set(keys::LEADERBOARD, "not json").await.unwrap();
        assert!(store.load_scores().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_documents_read_as_missing() {
        let store = InMemoryStore::new();
        store.set(keys::LEADERBOARD, r#"{"truncated": "#).await.unwrap();
        store.set(keys::PLAYER_NAME, "Ada").await.unwrap();

        assert!(store.load_scores().await.unwrap().is_empty());
        assert_eq!(store.load_player_name().await.unwrap(), None);

        // a save replaces the broken document
        store.save_scores(&[entry("Ada", 80)]).await.unwrap();
        assert_eq!(store.load_scores().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn settings_and_player_name() {
        let storage = Storage::in_memory();
        assert_eq!(storage.settings.load_settings().await.unwrap(), None);
        assert_eq!(storage.settings.load_player_name().await.unwrap(), None);

        let settings = QuizSettings::from_persisted(25, false, DifficultyFilter::Hard, Category::Science);
        storage.settings.save_settings(&settings).await.unwrap();
        storage.settings.save_player_name("Grace").await.unwrap();

        assert_eq!(storage.settings.load_settings().await.unwrap(), Some(settings));
        assert_eq!(
            storage.settings.load_player_name().await.unwrap().as_deref(),
            Some("Grace")
        );
        assert_eq!(storage.backend(), StorageBackend::InMemory);
    }

    #[tokio::test]
    async fn question_cache_is_keyed_per_category() {
        let storage = Storage::in_memory();
        storage
            .question_cache
            .cache_questions(Category::Math, "{}")
            .await
            .unwrap();
        assert_eq!(
            storage.kv.get("quiz_data_cache_v2_math").await.unwrap().as_deref(),
            Some("{}")
        );
        assert_eq!(
            storage
                .question_cache
                .cached_questions(Category::Science)
                .await
                .unwrap(),
            None
        );
        storage
            .question_cache
            .evict_questions(Category::Math)
            .await
            .unwrap();
        assert_eq!(
            storage
                .question_cache
                .cached_questions(Category::Math)
                .await
                .unwrap(),
            None
        );
    }
}
