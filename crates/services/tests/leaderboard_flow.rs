use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::achievements::AchievementId;
use quiz_core::leaderboard::{LeaderboardFilter, LeaderboardView, TimeWindow};
use quiz_core::model::{
    Category, Difficulty, DifficultyFilter, Question, QuestionId, ScoreEntryError,
};
use quiz_core::results::QuizResults;
use quiz_core::session::Answer;
use quiz_core::time::fixed_now;
use services::config::AppConfig;
use services::question_bank::OfflineSource;
use services::{AppServices, LeaderboardService, LeaderboardServiceError, QuizTiming};
use storage::repository::{InMemoryStore, KeyValueStore, Storage, StorageBackend, keys};

/// Results of a quiz with `total` questions where the first `correct` were right.
fn results(correct: u32, total: u32, secs: i64) -> QuizResults {
    let questions: Vec<Question> = (0..total)
        .map(|i| {
            let options = ["a", "b", "c", "d"].map(String::from).to_vec();
            Question::new(QuestionId::new(i), format!("Q{i}"), options, 0, Difficulty::Easy, "")
                .unwrap()
        })
        .collect();
    let answers: Vec<Answer> = (0..total)
        .map(|i| Answer::Chosen(if i < correct { 0 } else { 1 }))
        .collect();
    let start = fixed_now();
    QuizResults::calculate(
        &questions,
        &answers,
        start,
        start + chrono::Duration::seconds(secs),
    )
}

fn service(store: &InMemoryStore) -> LeaderboardService {
    LeaderboardService::new(Clock::fixed(fixed_now()), Arc::new(store.clone()))
}

#[tokio::test]
async fn saved_scores_are_ranked_and_filterable() {
    let store = InMemoryStore::new();
    let service = service(&store);

    service
        .save_score("Ada", Category::Math, DifficultyFilter::Hard, &results(7, 10, 80))
        .await
        .unwrap();
    let best = service
        .save_score("Grace", Category::Science, DifficultyFilter::Easy, &results(9, 10, 60))
        .await
        .unwrap();
    assert_eq!(best.rank, Some(1));

    let view = service
        .query(&LeaderboardFilter::default(), 1, 10)
        .await
        .unwrap();
    let LeaderboardView::Page(page) = view else {
        panic!("expected a page, got {view:?}");
    };
    assert_eq!(page.total_entries, 2);
    assert_eq!(page.entries[0].entry.player_name(), "Grace");
    assert_eq!(page.entries[1].rank, 2);

    let math_only = LeaderboardFilter::default()
        .with_category(Some(Category::Math))
        .with_window(TimeWindow::Today);
    let view = service.query(&math_only, 1, 10).await.unwrap();
    let LeaderboardView::Page(page) = view else {
        panic!("expected a page, got {view:?}");
    };
    assert_eq!(page.total_entries, 1);
    assert_eq!(page.entries[0].entry.player_name(), "Ada");

    let nobody = LeaderboardFilter::default().with_search("linus");
    assert_eq!(
        service.query(&nobody, 1, 10).await.unwrap(),
        LeaderboardView::Empty
    );

    let personal = service.personal_stats("ada").await.unwrap().unwrap();
    assert_eq!(personal.quizzes_taken, 1);
    assert_eq!(personal.best_rank, 2);
}

#[tokio::test]
async fn blank_player_name_is_rejected_without_saving() {
    let store = InMemoryStore::new();
    let service = service(&store);

    let err = service
        .save_score("   ", Category::General, DifficultyFilter::All, &results(5, 10, 30))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LeaderboardServiceError::ScoreEntry(ScoreEntryError::EmptyPlayerName)
    ));
    assert!(service.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn export_file_is_dated_and_lists_scores() {
    let store = InMemoryStore::new();
    let service = service(&store);
    service
        .save_score("Ada", Category::History, DifficultyFilter::Medium, &results(4, 5, 42))
        .await
        .unwrap();

    let file = service.export_file().await.unwrap();
    assert_eq!(file.file_name, "quizspark-leaderboard-2023-11-14.json");

    let json: serde_json::Value = serde_json::from_str(&file.contents).unwrap();
    assert_eq!(json["totalScores"], 1);
    assert_eq!(json["scores"][0]["playerName"], "Ada");
    assert_eq!(json["scores"][0]["score"], 80);
    assert_eq!(json["scores"][0]["category"], "history");
}

#[tokio::test]
async fn delete_all_clears_history_and_achievements() {
    let store = InMemoryStore::new();
    let service = service(&store);
    service
        .save_score("Ada", Category::Math, DifficultyFilter::Hard, &results(10, 10, 50))
        .await
        .unwrap();

    let unlocked: Vec<_> = service
        .achievements()
        .await
        .unwrap()
        .into_iter()
        .filter(|status| status.unlocked)
        .map(|status| status.id)
        .collect();
    assert!(unlocked.contains(&AchievementId::FirstQuiz));
    assert!(unlocked.contains(&AchievementId::PerfectScore));
    assert!(unlocked.contains(&AchievementId::SpeedDemon));

    service.delete_all().await.unwrap();
    assert!(service.load().await.unwrap().is_empty());
    assert_eq!(store.get(keys::LEADERBOARD).await.unwrap(), None);
    assert!(service.achievements().await.unwrap().iter().all(|s| !s.unlocked));
}

#[tokio::test]
async fn corrupt_history_loads_as_empty_board() {
    let store = InMemoryStore::new();
    store.set(keys::LEADERBOARD, "[{\"oops\": true}]").await.unwrap();
    let service = service(&store);
    assert!(service.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_saved_documents_do_not_block_saving() {
    let store = InMemoryStore::new();
    store.set(keys::PLAYER_NAME, "Ada").await.unwrap();
    store.set(keys::LEADERBOARD, r#"{"truncated": "#).await.unwrap();

    let services = AppServices::with_parts(
        Storage::from_store(store.clone(), StorageBackend::InMemory),
        Arc::new(OfflineSource),
        QuizTiming::default(),
        Clock::fixed(fixed_now()),
    );
    assert_eq!(services.settings().player_name().await.unwrap(), None);
    assert!(services.leaderboard().preview().await.unwrap().is_empty());

    let saved = services
        .leaderboard()
        .save_score("Ada", Category::Math, DifficultyFilter::All, &results(4, 5, 30))
        .await
        .unwrap();
    assert_eq!(saved.rank, Some(1));
    assert_eq!(service(&store).load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn player_name_round_trips_through_settings() {
    let services = AppServices::with_parts(
        Storage::in_memory(),
        Arc::new(OfflineSource),
        QuizTiming::default(),
        Clock::fixed(fixed_now()),
    );
    let settings = services.settings();
    assert_eq!(settings.player_name().await.unwrap(), None);
    assert_eq!(settings.set_player_name("  Ada  ").await.unwrap(), "Ada");
    assert_eq!(settings.player_name().await.unwrap().as_deref(), Some("Ada"));
    assert!(settings.set_player_name("").await.is_err());
}

#[tokio::test]
async fn unopenable_database_degrades_to_memory() {
    let mut config = AppConfig::from_lookup(|_| None).unwrap();
    config.db_url = "sqlite:///nonexistent-quiz-dir/nested/quiz.sqlite3".to_owned();

    let services = AppServices::from_config(&config, Clock::fixed(fixed_now()))
        .await
        .unwrap();
    assert_eq!(services.backend(), StorageBackend::InMemory);
    assert!(services.storage_warning().is_some());

    // the in-memory fallback still records scores
    let saved = services
        .leaderboard()
        .save_score("Ada", Category::General, DifficultyFilter::All, &results(3, 5, 20))
        .await
        .unwrap();
    assert_eq!(saved.rank, Some(1));
}
