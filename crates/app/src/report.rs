use std::error::Error;
use std::path::Path;

use quiz_core::leaderboard::{DEFAULT_PAGE_SIZE, LeaderboardFilter, LeaderboardView, RankedEntry};
use quiz_core::model::Category;
use quiz_core::results::format_duration;
use services::AppServices;
use storage::repository::StorageBackend;

use crate::args::BoardArgs;

fn print_ranked(ranked: &RankedEntry) {
    let entry = &ranked.entry;
    println!(
        "  #{:<3} {:<20} {:>3}%  {:<22} {}/{}  {:>7}  {}",
        ranked.rank,
        entry.player_name(),
        entry.score_percent(),
        entry.category().display_name(),
        entry.correct_answers(),
        entry.total_questions(),
        format_duration(entry.time_taken_secs()),
        entry.recorded_at().format("%Y-%m-%d")
    );
}

/// Categories, last used settings and the top of the leaderboard.
pub async fn home(services: &AppServices) -> Result<(), Box<dyn Error>> {
    let settings = services.settings().load().await;

    println!("Categories:");
    for category in Category::ALL {
        let marker = if category == settings.last_category() { '*' } else { ' ' };
        println!(" {marker} {:<12} {}", category.key(), category.display_name());
    }
    println!();
    println!(
        "Last quiz: {} questions, timer {}, difficulty {}",
        settings.question_count(),
        if settings.timer_enabled() { "on" } else { "off" },
        settings.difficulty().key()
    );
    if services.backend() == StorageBackend::InMemory {
        println!("Scores are kept in memory for this run only.");
    }

    println!();
    println!("Top scores:");
    let top = services.leaderboard().preview().await?;
    if top.is_empty() {
        println!("  none yet, start one with `play`");
    }
    for ranked in &top {
        print_ranked(ranked);
    }
    Ok(())
}

pub async fn leaderboard(services: &AppServices, args: &BoardArgs) -> Result<(), Box<dyn Error>> {
    let board = services.leaderboard();
    let filter = LeaderboardFilter::default()
        .with_category(args.category)
        .with_window(args.window)
        .with_search(&args.search);

    let stats = board.stats(&filter).await?;
    println!(
        "{} scores, average {}%",
        stats.entry_count, stats.average_score
    );

    let podium = board.podium(&filter).await?;
    if !podium.is_empty() {
        println!();
        println!("Podium:");
        for ranked in &podium {
            print_ranked(ranked);
        }
    }

    println!();
    match board.query(&filter, args.page, DEFAULT_PAGE_SIZE).await? {
        LeaderboardView::Empty => println!("No scores match these filters."),
        LeaderboardView::Page(page) => {
            println!("Page {} of {}:", page.page, page.total_pages);
            for ranked in &page.entries {
                print_ranked(ranked);
            }
        }
    }

    if let Some(player) = &args.player {
        println!();
        match board.personal_stats(player).await? {
            Some(mine) => println!(
                "{player}: best {}%, {} quizzes, average {}%, best rank #{}",
                mine.best_score, mine.quizzes_taken, mine.average_score, mine.best_rank
            ),
            None => println!("{player} has no saved scores yet."),
        }
    }
    Ok(())
}

pub async fn achievements(services: &AppServices) -> Result<(), Box<dyn Error>> {
    let statuses = services.leaderboard().achievements().await?;
    let unlocked = statuses.iter().filter(|s| s.unlocked).count();
    println!("Achievements {unlocked}/{}:", statuses.len());
    for status in &statuses {
        let mark = if status.unlocked { 'x' } else { ' ' };
        println!(
            "  [{mark}] {:<22} {}",
            status.id.name(),
            status.id.description()
        );
    }
    Ok(())
}

pub async fn export(services: &AppServices, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let file = services.leaderboard().export_file().await?;
    let path = out_dir.join(&file.file_name);
    tokio::fs::write(&path, file.contents).await?;
    println!("Exported leaderboard to {}", path.display());
    Ok(())
}

pub async fn reset(services: &AppServices, confirmed: bool) -> Result<(), Box<dyn Error>> {
    if !confirmed {
        println!("This deletes every saved score and cannot be undone. Re-run with --yes.");
        return Ok(());
    }
    services.leaderboard().delete_all().await?;
    println!("Leaderboard cleared.");
    Ok(())
}
