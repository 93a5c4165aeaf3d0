use thiserror::Error;

use crate::model::{Category, DifficultyFilter};

pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 50;
pub const DEFAULT_QUESTIONS: u32 = 10;

/// A navigation parameter that was present but unusable.
///
/// Rejected values never abort quiz start; the documented default is used instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParamError {
    #[error("unknown category `{0}`, using general")]
    UnknownCategory(String),

    #[error("invalid question count `{0}`, using {DEFAULT_QUESTIONS}")]
    InvalidQuestionCount(String),

    #[error("unknown difficulty `{0}`, using medium")]
    UnknownDifficulty(String),
}

/// Raw, unvalidated parameters as handed from the home page to the quiz page.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawQuizParams<'a> {
    pub category: Option<&'a str>,
    pub questions: Option<&'a str>,
    pub timer: Option<&'a str>,
    pub difficulty: Option<&'a str>,
}

/// Validated quiz parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizParams {
    pub category: Category,
    pub question_count: u32,
    pub timer_enabled: bool,
    pub difficulty: DifficultyFilter,
}

impl Default for QuizParams {
    fn default() -> Self {
        Self {
            category: Category::General,
            question_count: DEFAULT_QUESTIONS,
            timer_enabled: false,
            difficulty: DifficultyFilter::Medium,
        }
    }
}

/// Parameters recovered from raw input, plus every value that had to be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedParams {
    pub params: QuizParams,
    pub rejected: Vec<ParamError>,
}

impl QuizParams {
    /// Parse raw navigation parameters, substituting defaults for anything invalid.
    ///
    /// Missing values fall back silently; present-but-invalid values are listed in
    /// `ParsedParams::rejected`. The timer is enabled only by the literal `true`.
    #[must_use]
    pub fn parse(raw: &RawQuizParams<'_>) -> ParsedParams {
        let mut params = QuizParams::default();
        let mut rejected = Vec::new();

        if let Some(value) = raw.category.filter(|v| !v.is_empty()) {
            match Category::from_key(value) {
                Some(category) => params.category = category,
                None => rejected.push(ParamError::UnknownCategory(value.to_owned())),
            }
        }

        if let Some(value) = raw.questions.filter(|v| !v.is_empty()) {
            match parse_question_count(value) {
                Some(count) => params.question_count = count,
                None => rejected.push(ParamError::InvalidQuestionCount(value.to_owned())),
            }
        }

        params.timer_enabled = raw.timer == Some("true");

        if let Some(value) = raw.difficulty.filter(|v| !v.is_empty()) {
            match DifficultyFilter::from_key(value) {
                Some(difficulty) => params.difficulty = difficulty,
                None => rejected.push(ParamError::UnknownDifficulty(value.to_owned())),
            }
        }

        ParsedParams { params, rejected }
    }

    /// Returns true when `count` is an allowed question count.
    #[must_use]
    pub fn is_valid_count(count: u32) -> bool {
        (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count)
    }
}

fn parse_question_count(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| QuizParams::is_valid_count(*n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_use_defaults_silently() {
        let parsed = QuizParams::parse(&RawQuizParams::default());
        assert_eq!(parsed.params, QuizParams::default());
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn valid_values_are_kept() {
        let parsed = QuizParams::parse(&RawQuizParams {
            category: Some("history"),
            questions: Some("25"),
            timer: Some("true"),
            difficulty: Some("all"),
        });
        assert!(parsed.rejected.is_empty());
        assert_eq!(
            parsed.params,
            QuizParams {
                category: Category::History,
                question_count: 25,
                timer_enabled: true,
                difficulty: DifficultyFilter::All,
            }
        );
    }

    #[test]
    fn invalid_values_fall_back_and_are_reported() {
        let parsed = QuizParams::parse(&RawQuizParams {
            category: Some("sports"),
            questions: Some("51"),
            timer: Some("yes"),
            difficulty: Some("insane"),
        });
        assert_eq!(parsed.params, QuizParams::default());
        assert_eq!(
            parsed.rejected,
            vec![
                ParamError::UnknownCategory("sports".into()),
                ParamError::InvalidQuestionCount("51".into()),
                ParamError::UnknownDifficulty("insane".into()),
            ]
        );
    }

    #[test]
    fn zero_and_garbage_counts_are_rejected() {
        for raw in ["0", "abc", "-3"] {
            let parsed = QuizParams::parse(&RawQuizParams {
                questions: Some(raw),
                ..RawQuizParams::default()
            });
            assert_eq!(parsed.params.question_count, DEFAULT_QUESTIONS);
            assert_eq!(parsed.rejected.len(), 1);
        }
    }
}
