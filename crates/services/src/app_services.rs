use std::sync::Arc;

use quiz_core::model::QuizParams;
use storage::repository::{Storage, StorageBackend, StorageError};
use tracing::warn;

use crate::Clock;
use crate::config::{AppConfig, QuizTiming};
use crate::error::{AppServicesError, QuizError};
use crate::leaderboard_service::LeaderboardService;
use crate::question_bank::{HttpQuestionSource, LoadedQuestions, QuestionBank, QuestionSource};
use crate::quiz::QuizRunner;
use crate::settings_service::SettingsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    timing: QuizTiming,
    backend: StorageBackend,
    storage_warning: Option<Arc<StorageError>>,
    question_bank: Arc<QuestionBank>,
    leaderboard: Arc<LeaderboardService>,
    settings: Arc<SettingsService>,
}

impl AppServices {
    /// Build services from configuration.
    ///
    /// If the `SQLite` database cannot be opened the services run on an
    /// in-memory store and `storage_warning` reports why.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Http` if the HTTP client cannot be built.
    pub async fn from_config(config: &AppConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let (storage, storage_warning) = match Storage::sqlite(&config.db_url).await {
            Ok(storage) => (storage, None),
            Err(err) => {
                let err = StorageError::Unavailable(err.to_string());
                warn!(error = %err, db_url = %config.db_url, "falling back to in-memory storage");
                (Storage::in_memory(), Some(Arc::new(err)))
            }
        };

        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;
        let source: Arc<dyn QuestionSource> = Arc::new(HttpQuestionSource::new(
            client,
            config.data_base_url.clone(),
            config.fetch_timeout,
        ));

        let mut services = Self::with_parts(storage, source, config.timing, clock);
        services.storage_warning = storage_warning;
        Ok(services)
    }

    /// Build services over explicit storage and question source.
    #[must_use]
    pub fn with_parts(
        storage: Storage,
        source: Arc<dyn QuestionSource>,
        timing: QuizTiming,
        clock: Clock,
    ) -> Self {
        let question_bank = Arc::new(QuestionBank::new(
            source,
            Arc::clone(&storage.question_cache),
        ));
        let leaderboard = Arc::new(LeaderboardService::new(
            clock,
            Arc::clone(&storage.leaderboard),
        ));
        let settings = Arc::new(SettingsService::new(Arc::clone(&storage.settings)));

        Self {
            clock,
            timing,
            backend: storage.backend(),
            storage_warning: None,
            question_bank,
            leaderboard,
            settings,
        }
    }

    /// Load questions for `params`, remember the choice and start the quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Loader` if no questions could be loaded at all.
    pub async fn start_quiz(&self, params: &QuizParams) -> Result<QuizRunner, QuizError> {
        let loaded = self.question_bank.load(params).await?;
        self.begin(params, loaded).await
    }

    /// `start_quiz` with a deterministic question order.
    ///
    /// # Errors
    ///
    /// Same as `start_quiz`.
    pub async fn start_quiz_seeded(
        &self,
        params: &QuizParams,
        seed: u64,
    ) -> Result<QuizRunner, QuizError> {
        let loaded = self.question_bank.load_seeded(params, seed).await?;
        self.begin(params, loaded).await
    }

    async fn begin(
        &self,
        params: &QuizParams,
        loaded: LoadedQuestions,
    ) -> Result<QuizRunner, QuizError> {
        if let Err(err) = self.settings.remember(params).await {
            warn!(error = %err, "failed to remember quiz settings");
        }
        QuizRunner::start(*params, loaded, self.timing, self.clock)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn timing(&self) -> QuizTiming {
        self.timing
    }

    #[must_use]
    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    /// Why persistent storage is unavailable, if it is.
    #[must_use]
    pub fn storage_warning(&self) -> Option<&StorageError> {
        self.storage_warning.as_deref()
    }

    #[must_use]
    pub fn question_bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.question_bank)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }
}
