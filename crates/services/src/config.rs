//! Runtime configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use quiz_core::timer::DEFAULT_QUESTION_SECS;

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
pub const DEFAULT_DATA_BASE_URL: &str = "http://localhost:8080/data";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_EXPIRY_DELAY_MS: u64 = 2_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Pause after submitting an answer before the next question appears.
pub const SUBMIT_DELAY: Duration = Duration::from_millis(1_500);
/// Pause after submitting the last answer before the quiz finishes.
pub const FINISH_DELAY: Duration = Duration::from_millis(1_000);

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

/// Delays and durations that shape a running quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizTiming {
    pub question_secs: u32,
    pub submit_delay: Duration,
    pub finish_delay: Duration,
    pub expiry_delay: Duration,
}

impl Default for QuizTiming {
    fn default() -> Self {
        Self {
            question_secs: DEFAULT_QUESTION_SECS,
            submit_delay: SUBMIT_DELAY,
            finish_delay: FINISH_DELAY,
            expiry_delay: Duration::from_millis(DEFAULT_EXPIRY_DELAY_MS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_url: String,
    /// Directory URL holding one question document per category. Always ends in `/`.
    pub data_base_url: Url,
    pub fetch_timeout: Duration,
    pub timing: QuizTiming,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from `QUIZ_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable is set but unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_url = lookup("QUIZ_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_URL.into());

        let data_base_url = parse_base_url(
            "QUIZ_DATA_BASE_URL",
            &lookup("QUIZ_DATA_BASE_URL").unwrap_or_else(|| DEFAULT_DATA_BASE_URL.into()),
        )?;

        let fetch_timeout = Duration::from_millis(parse_number(
            "QUIZ_FETCH_TIMEOUT_MS",
            lookup("QUIZ_FETCH_TIMEOUT_MS"),
            DEFAULT_FETCH_TIMEOUT_MS,
        )?);

        let question_secs = parse_number(
            "QUIZ_TIMER_SECS",
            lookup("QUIZ_TIMER_SECS"),
            DEFAULT_QUESTION_SECS,
        )?;
        if question_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "QUIZ_TIMER_SECS",
                reason: "must be at least 1".into(),
            });
        }

        let expiry_delay = Duration::from_millis(parse_number(
            "QUIZ_EXPIRY_DELAY_MS",
            lookup("QUIZ_EXPIRY_DELAY_MS"),
            DEFAULT_EXPIRY_DELAY_MS,
        )?);

        let log_level = lookup("QUIZ_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.into());

        Ok(Self {
            db_url,
            data_base_url,
            fetch_timeout,
            timing: QuizTiming {
                question_secs,
                expiry_delay,
                ..QuizTiming::default()
            },
            log_level,
        })
    }

    /// Replace the question data location.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `raw` is not an absolute URL.
    pub fn set_data_base_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.data_base_url = parse_base_url("--data-url", raw)?;
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                var,
                reason: format!("'{value}': {e}"),
            }),
    }
}

fn parse_base_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let mut value = raw.trim().to_owned();
    if !value.ends_with('/') {
        value.push('/');
    }
    Url::parse(&value).map_err(|e| ConfigError::InvalidValue {
        var,
        reason: format!("'{raw}': {e}"),
    })
}
