use chrono::Duration;
use quiz_core::leaderboard::Leaderboard;
use quiz_core::model::{Category, DifficultyFilter, QuizSettings, ScoreEntry};
use quiz_core::time::fixed_now;
use storage::repository::{
    KeyValueStore, LeaderboardRepository, QuestionCacheRepository, SettingsRepository, Storage,
    StorageBackend, keys,
};
use storage::sqlite::SqliteRepository;

fn entry(name: &str, score: u8, minutes_ago: i64) -> ScoreEntry {
    ScoreEntry::from_persisted(
        name,
        Category::Programming,
        score,
        u32::from(score / 10),
        10,
        75,
        DifficultyFilter::Medium,
        fixed_now() - Duration::minutes(minutes_ago),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_kv_overwrites_and_removes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // migrations are re-runnable
    repo.migrate().await.expect("migrate twice");

    assert_eq!(repo.get("missing").await.unwrap(), None);
    repo.set("k", "1").await.unwrap();
    repo.set("k", "2").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("2"));
    repo.remove("k").await.unwrap();
    repo.remove("k").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_persists_leaderboard_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_scores?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut board = Leaderboard::new();
    board.add(entry("Ada", 70, 3));
    board.add(entry("Grace", 90, 2));
    board.add(entry("Linus", 70, 1));
    repo.save_scores(board.entries()).await.unwrap();

    let loaded = repo.load_scores().await.unwrap();
    let names: Vec<&str> = loaded.iter().map(ScoreEntry::player_name).collect();
    assert_eq!(names, vec!["Grace", "Ada", "Linus"]);
    assert_eq!(loaded[0].recorded_at(), fixed_now() - Duration::minutes(2));

    repo.clear_scores().await.unwrap();
    assert!(repo.load_scores().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_storage_wires_every_repository() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    assert_eq!(storage.backend(), StorageBackend::Sqlite);

    let settings = QuizSettings::from_persisted(5, true, DifficultyFilter::All, Category::History);
    storage.settings.save_settings(&settings).await.unwrap();
    storage.settings.save_player_name("Barbara").await.unwrap();
    storage
        .question_cache
        .cache_questions(Category::History, r#"{"history":[]}"#)
        .await
        .unwrap();

    assert_eq!(storage.settings.load_settings().await.unwrap(), Some(settings));
    assert_eq!(
        storage.settings.load_player_name().await.unwrap().as_deref(),
        Some("Barbara")
    );
    assert_eq!(
        storage
            .kv
            .get(&keys::question_cache(Category::History))
            .await
            .unwrap()
            .as_deref(),
        Some(r#"{"history":[]}"#)
    );

    let raw = storage.kv.get(keys::SETTINGS).await.unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["numQuestions"], "5");
    assert_eq!(json["lastCategory"], "history");
}
