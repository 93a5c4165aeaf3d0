use crate::model::{Category, DEFAULT_QUESTIONS, DifficultyFilter, QuizParams};

/// Home-page quiz preferences, remembered between visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    question_count: u32,
    timer_enabled: bool,
    difficulty: DifficultyFilter,
    last_category: Category,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTIONS,
            timer_enabled: true,
            difficulty: DifficultyFilter::Medium,
            last_category: Category::General,
        }
    }
}

impl QuizSettings {
    /// Rehydrate settings, replacing an out-of-range question count with the default.
    #[must_use]
    pub fn from_persisted(
        question_count: u32,
        timer_enabled: bool,
        difficulty: DifficultyFilter,
        last_category: Category,
    ) -> Self {
        let question_count = if QuizParams::is_valid_count(question_count) {
            question_count
        } else {
            DEFAULT_QUESTIONS
        };
        Self {
            question_count,
            timer_enabled,
            difficulty,
            last_category,
        }
    }

    /// Settings remembered from the parameters a quiz was started with.
    #[must_use]
    pub fn from_params(params: &QuizParams) -> Self {
        Self::from_persisted(
            params.question_count,
            params.timer_enabled,
            params.difficulty,
            params.category,
        )
    }

    /// Parameters for starting a quiz in `category` with these settings.
    #[must_use]
    pub fn params_for(&self, category: Category) -> QuizParams {
        QuizParams {
            category,
            question_count: self.question_count,
            timer_enabled: self.timer_enabled,
            difficulty: self.difficulty,
        }
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn timer_enabled(&self) -> bool {
        self.timer_enabled
    }

    #[must_use]
    pub fn difficulty(&self) -> DifficultyFilter {
        self.difficulty
    }

    #[must_use]
    pub fn last_category(&self) -> Category {
        self.last_category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_home_page() {
        let settings = QuizSettings::default();
        assert_eq!(settings.question_count(), 10);
        assert!(settings.timer_enabled());
        assert_eq!(settings.difficulty(), DifficultyFilter::Medium);
        assert_eq!(settings.last_category(), Category::General);
    }

    #[test]
    fn persisted_count_out_of_range_is_replaced() {
        let settings =
            QuizSettings::from_persisted(99, false, DifficultyFilter::Hard, Category::Math);
        assert_eq!(settings.question_count(), DEFAULT_QUESTIONS);
        assert_eq!(settings.last_category(), Category::Math);
    }

    #[test]
    fn params_round_trip_through_settings() {
        let params = QuizParams {
            category: Category::Science,
            question_count: 20,
            timer_enabled: true,
            difficulty: DifficultyFilter::All,
        };
        let settings = QuizSettings::from_params(&params);
        assert_eq!(settings.params_for(Category::Science), params);
    }
}
