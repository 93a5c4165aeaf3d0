#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod leaderboard_service;
pub mod question_bank;
pub mod quiz;
pub mod settings_service;
pub mod timer;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::{AppConfig, ConfigError, QuizTiming};
pub use error::{
    AppServicesError, LeaderboardServiceError, LoaderError, QuizError, SettingsServiceError,
};
pub use leaderboard_service::{ExportFile, LeaderboardService, SavedScore};
pub use question_bank::{LoadedQuestions, QuestionBank, QuestionOrigin};
pub use quiz::{QuizRunner, TimerOutcome};
pub use settings_service::SettingsService;
pub use timer::{QuestionTimer, TimerEvent};
