use std::fmt;

use chrono::{DateTime, Duration, Utc};
use quiz_core::leaderboard::Leaderboard;
use quiz_core::model::{Category, DifficultyFilter, ScoreEntry};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    scores: u32,
    player: String,
    now: Option<DateTime<Utc>>,
    replace: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidScores { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidScores { raw } => write!(f, "invalid --scores value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite://quiz.sqlite3".into());
        let mut scores = std::env::var("QUIZ_SEED_SCORES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(25);
        let mut player = std::env::var("QUIZ_SEED_PLAYER").unwrap_or_else(|_| "Demo".into());
        let mut now: Option<DateTime<Utc>> = None;
        let mut replace = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--scores" => {
                    let value = require_value(&mut args, "--scores")?;
                    scores = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidScores { raw: value.clone() })?;
                }
                "--player" => {
                    player = require_value(&mut args, "--player")?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--replace" => replace = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            scores,
            player,
            now,
            replace,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://quiz.sqlite3)");
    eprintln!("  --scores <n>              Number of demo scores to add (default: 25)");
    eprintln!("  --player <name>           Name used for every other entry (default: Demo)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  --replace                 Clear the leaderboard before seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_SEED_SCORES, QUIZ_SEED_PLAYER");
}

const RIVALS: [&str; 4] = ["Ada", "Grace", "Linus", "Barbara"];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut board = if args.replace {
        Leaderboard::new()
    } else {
        Leaderboard::from_entries(storage.leaderboard.load_scores().await?)
    };

    for i in 0..args.scores {
        let idx = i as usize;
        let name = if i % 2 == 0 {
            args.player.as_str()
        } else {
            RIVALS[idx % RIVALS.len()]
        };
        let total = 10;
        let correct = (i * 7 + 3) % (total + 1);
        let score = u8::try_from(correct * 10)?;
        let entry = ScoreEntry::from_persisted(
            name,
            Category::ALL[idx % Category::ALL.len()],
            score,
            correct,
            total,
            u64::from(60 + (i * 37) % 400),
            DifficultyFilter::Medium,
            now - Duration::hours(i64::from(i) * 13),
        )?;
        board.add(entry);
    }

    storage.leaderboard.save_scores(board.entries()).await?;

    println!(
        "Seeded {} scores ({} kept) into {}",
        args.scores,
        board.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
