use std::sync::Arc;

use quiz_core::model::{Category, DifficultyFilter, Question, QuizParams};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use storage::repository::QuestionCacheRepository;
use tracing::{debug, info, warn};

use super::document::parse_document;
use super::fallback::{builtin_questions, cycle_to};
use super::source::QuestionSource;
use crate::error::{LoaderError, SourceError};

/// Where a question set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionOrigin {
    Cache,
    Network,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadedQuestions {
    pub questions: Vec<Question>,
    pub origin: QuestionOrigin,
}

/// Resolves question sets through the cache, the network and the built-in set, in that order.
#[derive(Clone)]
pub struct QuestionBank {
    source: Arc<dyn QuestionSource>,
    cache: Arc<dyn QuestionCacheRepository>,
    fallback: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>, cache: Arc<dyn QuestionCacheRepository>) -> Self {
        let fallback = builtin_questions().unwrap_or_else(|err| {
            warn!(error = %err, "built-in questions are invalid");
            Vec::new()
        });
        Self {
            source,
            cache,
            fallback,
        }
    }

    /// Replace the built-in set used as the last resort.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Vec<Question>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Load, filter and shuffle the questions for a quiz.
    ///
    /// # Errors
    ///
    /// Returns `LoaderError::NoQuestionsAvailable` only when every source,
    /// including the built-in set, came up empty.
    pub async fn load(&self, params: &QuizParams) -> Result<LoadedQuestions, LoaderError> {
        let (pool, origin) = self.resolve(params.category).await;
        let mut rng = rand::rng();
        Self::finish_load(pool, origin, params, &mut rng)
    }

    /// `load` with a deterministic shuffle.
    ///
    /// # Errors
    ///
    /// Same as `load`.
    pub async fn load_seeded(
        &self,
        params: &QuizParams,
        seed: u64,
    ) -> Result<LoadedQuestions, LoaderError> {
        let (pool, origin) = self.resolve(params.category).await;
        let mut rng = StdRng::seed_from_u64(seed);
        Self::finish_load(pool, origin, params, &mut rng)
    }

    fn finish_load<R: Rng + ?Sized>(
        pool: Vec<Question>,
        origin: QuestionOrigin,
        params: &QuizParams,
        rng: &mut R,
    ) -> Result<LoadedQuestions, LoaderError> {
        let count = usize::try_from(params.question_count).unwrap_or(usize::MAX);
        let questions = select(pool, origin, params.difficulty, count, rng)?;
        info!(
            category = %params.category,
            count = questions.len(),
            ?origin,
            "questions ready"
        );
        Ok(LoadedQuestions { questions, origin })
    }

    /// Walk the fallback chain for `category`. Never fails.
    pub async fn resolve(&self, category: Category) -> (Vec<Question>, QuestionOrigin) {
        match self.cache.cached_questions(category).await {
            Ok(Some(raw)) => match parse_document(&raw, category) {
                Ok(questions) => {
                    debug!(%category, "loaded questions from cache");
                    return (questions, QuestionOrigin::Cache);
                }
                Err(err) => {
                    warn!(%category, error = %err, "evicting corrupt cached questions");
                    if let Err(err) = self.cache.evict_questions(category).await {
                        warn!(%category, error = %err, "failed to evict cached questions");
                    }
                }
            },
            Ok(None) => debug!(%category, "question cache miss"),
            Err(err) => warn!(%category, error = %err, "question cache unavailable"),
        }

        match self.source.fetch(category).await {
            Ok(raw) => match parse_document(&raw, category) {
                Ok(questions) => {
                    debug!(%category, "fetched questions");
                    if let Err(err) = self.cache.cache_questions(category, &raw).await {
                        warn!(%category, error = %err, "failed to cache fetched questions");
                    }
                    return (questions, QuestionOrigin::Network);
                }
                Err(err) => warn!(%category, error = %err, "fetched document is unusable"),
            },
            Err(SourceError::Timeout) => warn!(%category, "question fetch timed out"),
            Err(err) => warn!(%category, error = %err, "question fetch failed"),
        }

        warn!(%category, "using built-in questions");
        (self.fallback.clone(), QuestionOrigin::Fallback)
    }
}

/// Narrow a resolved pool to the quiz: difficulty filter, cycling of the
/// built-in set, unbiased shuffle, then truncation to `count`.
///
/// A filter that would leave nothing is ignored.
///
/// # Errors
///
/// Returns `LoaderError::NoQuestionsAvailable` if `pool` is empty.
pub fn select<R: Rng + ?Sized>(
    pool: Vec<Question>,
    origin: QuestionOrigin,
    difficulty: DifficultyFilter,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Question>, LoaderError> {
    if pool.is_empty() {
        return Err(LoaderError::NoQuestionsAvailable);
    }

    let filtered: Vec<Question> = pool
        .iter()
        .filter(|q| difficulty.matches(q.difficulty()))
        .cloned()
        .collect();
    let mut chosen = if filtered.is_empty() {
        debug!(%difficulty, "no questions match difficulty, ignoring filter");
        pool
    } else {
        filtered
    };

    if origin == QuestionOrigin::Fallback {
        chosen = cycle_to(&chosen, count);
    }

    chosen.shuffle(rng);
    chosen.truncate(count);
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, QuestionId};

    fn question(id: u32, difficulty: Difficulty) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            0,
            difficulty,
            "",
        )
        .unwrap()
    }

    fn pool() -> Vec<Question> {
        vec![
            question(1, Difficulty::Easy),
            question(2, Difficulty::Easy),
            question(3, Difficulty::Medium),
            question(4, Difficulty::Medium),
            question(5, Difficulty::Medium),
        ]
    }

    #[test]
    fn filters_by_difficulty() {
        let mut rng = StdRng::seed_from_u64(7);
        let chosen = select(pool(), QuestionOrigin::Network, DifficultyFilter::Medium, 10, &mut rng)
            .unwrap();
        assert_eq!(chosen.len(), 3);
        assert!(chosen.iter().all(|q| q.difficulty() == Difficulty::Medium));
    }

    #[test]
    fn empty_filter_result_falls_back_to_full_set() {
        let mut rng = StdRng::seed_from_u64(7);
        let chosen =
            select(pool(), QuestionOrigin::Network, DifficultyFilter::Hard, 10, &mut rng).unwrap();
        assert_eq!(chosen.len(), 5);
    }

    #[test]
    fn truncates_to_requested_count_without_duplicates() {
        let mut rng = StdRng::seed_from_u64(42);
        let chosen =
            select(pool(), QuestionOrigin::Cache, DifficultyFilter::All, 3, &mut rng).unwrap();
        assert_eq!(chosen.len(), 3);
        let mut ids: Vec<u32> = chosen.iter().map(|q| q.id().value()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn network_data_is_not_padded() {
        let mut rng = StdRng::seed_from_u64(1);
        let chosen =
            select(pool(), QuestionOrigin::Network, DifficultyFilter::All, 20, &mut rng).unwrap();
        assert_eq!(chosen.len(), 5);
    }

    #[test]
    fn fallback_is_cycled_to_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let chosen =
            select(pool(), QuestionOrigin::Fallback, DifficultyFilter::Easy, 7, &mut rng).unwrap();
        assert_eq!(chosen.len(), 7);
        assert!(chosen.iter().all(|q| q.difficulty() == Difficulty::Easy));
    }

    #[test]
    fn same_seed_same_order() {
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            select(pool(), QuestionOrigin::Cache, DifficultyFilter::All, 5, &mut rng)
                .unwrap()
                .iter()
                .map(|q| q.id().value())
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(9), pick(9));
    }

    #[test]
    fn empty_pool_is_fatal() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            select(Vec::new(), QuestionOrigin::Fallback, DifficultyFilter::All, 5, &mut rng),
            Err(LoaderError::NoQuestionsAvailable)
        ));
    }
}
