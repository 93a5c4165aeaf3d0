use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{Category, Difficulty, DifficultyFilter, QuizParams};
use services::error::SourceError;
use services::question_bank::{QuestionSource, builtin_questions};
use services::{QuestionBank, QuestionOrigin};
use storage::repository::{InMemoryStore, KeyValueStore, QuestionCacheRepository, keys};

const MATH_DOC: &str = r#"{
    "math": [
        {"id": 1, "question": "1+1?", "options": ["1", "2", "3", "4"], "correctAnswer": 1, "difficulty": "easy"},
        {"id": 2, "question": "2*3?", "options": ["5", "6", "7", "8"], "correctAnswer": 1, "difficulty": "easy"},
        {"id": 3, "question": "sqrt(81)?", "options": ["7", "8", "9", "10"], "correctAnswer": 2, "difficulty": "medium"}
    ]
}"#;

/// Serves one fixed response and counts calls.
struct StubSource {
    response: Option<&'static str>,
    calls: AtomicUsize,
}

impl StubSource {
    fn serving(doc: &'static str) -> Arc<Self> {
        Arc::new(Self {
            response: Some(doc),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionSource for StubSource {
    async fn fetch(&self, _category: Category) -> Result<String, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.map(str::to_owned).ok_or(SourceError::Timeout)
    }
}

fn params(difficulty: DifficultyFilter, count: u32) -> QuizParams {
    QuizParams {
        category: Category::Math,
        question_count: count,
        timer_enabled: false,
        difficulty,
    }
}

#[tokio::test]
async fn network_result_is_cached_for_next_load() {
    let cache = InMemoryStore::new();
    let source = StubSource::serving(MATH_DOC);
    let bank = QuestionBank::new(source.clone(), Arc::new(cache.clone()));

    let first = bank
        .load_seeded(&params(DifficultyFilter::All, 10), 1)
        .await
        .unwrap();
    assert_eq!(first.origin, QuestionOrigin::Network);
    assert_eq!(first.questions.len(), 3);
    assert_eq!(
        cache.get(&keys::question_cache(Category::Math)).await.unwrap().as_deref(),
        Some(MATH_DOC)
    );

    let second = bank
        .load_seeded(&params(DifficultyFilter::Easy, 10), 1)
        .await
        .unwrap();
    assert_eq!(second.origin, QuestionOrigin::Cache);
    assert_eq!(second.questions.len(), 2);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn corrupt_cache_is_evicted_and_refetched() {
    let cache = InMemoryStore::new();
    cache
        .cache_questions(Category::Math, "{ definitely not json")
        .await
        .unwrap();
    let source = StubSource::serving(MATH_DOC);
    let bank = QuestionBank::new(source.clone(), Arc::new(cache.clone()));

    let loaded = bank
        .load_seeded(&params(DifficultyFilter::Medium, 10), 3)
        .await
        .unwrap();
    assert_eq!(loaded.origin, QuestionOrigin::Network);
    assert_eq!(loaded.questions.len(), 1);
    assert_eq!(source.calls(), 1);
    assert_eq!(
        cache.cached_questions(Category::Math).await.unwrap().as_deref(),
        Some(MATH_DOC)
    );
}

#[tokio::test]
async fn failed_fetch_uses_cycled_builtin_questions() {
    let cache = InMemoryStore::new();
    let bank = QuestionBank::new(StubSource::failing(), Arc::new(cache.clone()));

    let loaded = bank
        .load_seeded(&params(DifficultyFilter::All, 12), 5)
        .await
        .unwrap();
    assert_eq!(loaded.origin, QuestionOrigin::Fallback);
    assert_eq!(loaded.questions.len(), 12);

    let builtin_ids: Vec<_> = builtin_questions()
        .unwrap()
        .iter()
        .map(|q| q.id())
        .collect();
    assert!(loaded.questions.iter().all(|q| builtin_ids.contains(&q.id())));
    assert_eq!(cache.cached_questions(Category::Math).await.unwrap(), None);
}

#[tokio::test]
async fn unmatched_difficulty_returns_full_set() {
    let bank = QuestionBank::new(
        StubSource::serving(MATH_DOC),
        Arc::new(InMemoryStore::new()),
    );
    let loaded = bank
        .load_seeded(&params(DifficultyFilter::Hard, 10), 2)
        .await
        .unwrap();
    assert_eq!(loaded.questions.len(), 3);
    assert!(
        loaded
            .questions
            .iter()
            .all(|q| q.difficulty() != Difficulty::Hard)
    );
}

#[tokio::test]
async fn unusable_document_falls_through_to_builtin() {
    let bank = QuestionBank::new(
        StubSource::serving(r#"{"math": "oops"}"#),
        Arc::new(InMemoryStore::new()),
    );
    let loaded = bank
        .load_seeded(&params(DifficultyFilter::All, 3), 2)
        .await
        .unwrap();
    assert_eq!(loaded.origin, QuestionOrigin::Fallback);
    assert_eq!(loaded.questions.len(), 3);
}

#[tokio::test]
async fn empty_builtin_set_is_fatal() {
    let bank = QuestionBank::new(StubSource::failing(), Arc::new(InMemoryStore::new()))
        .with_fallback(Vec::new());
    let err = bank
        .load_seeded(&params(DifficultyFilter::All, 3), 2)
        .await
        .unwrap_err();
    assert!(matches!(err, services::LoaderError::NoQuestionsAvailable));
}
