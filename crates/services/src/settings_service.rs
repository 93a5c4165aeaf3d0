use std::sync::Arc;

use quiz_core::model::{QuizParams, QuizSettings, normalize_player_name};
use storage::repository::SettingsRepository;
use tracing::warn;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing or unreadable).
    pub async fn load(&self) -> QuizSettings {
        match self.repo.load_settings().await {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "settings unreadable, using defaults");
                QuizSettings::default()
            }
        }
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError::Storage` if persistence fails.
    pub async fn save(&self, settings: &QuizSettings) -> Result<(), SettingsServiceError> {
        self.repo.save_settings(settings).await?;
        Ok(())
    }

    /// Remember the choices a quiz was started with.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::Storage` if persistence fails.
    pub async fn remember(&self, params: &QuizParams) -> Result<QuizSettings, SettingsServiceError> {
        let settings = QuizSettings::from_params(params);
        self.save(&settings).await?;
        Ok(settings)
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError::Storage` if the name cannot be read.
    pub async fn player_name(&self) -> Result<Option<String>, SettingsServiceError> {
        Ok(self.repo.load_player_name().await?)
    }

    /// Validate, trim and persist the player's display name.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::PlayerName` for a blank or overlong name.
    pub async fn set_player_name(&self, raw: &str) -> Result<String, SettingsServiceError> {
        let name = normalize_player_name(raw)?;
        self.repo.save_player_name(&name).await?;
        Ok(name)
    }
}
