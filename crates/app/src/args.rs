use std::fmt;
use std::path::PathBuf;

use quiz_core::leaderboard::TimeWindow;
use quiz_core::model::Category;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidSeed { raw: String },
    InvalidPage { raw: String },
    InvalidCategory { raw: String },
    InvalidWindow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidPage { raw } => {
                write!(f, "invalid --page value (expected 1 or more): {raw}")
            }
            ArgsError::InvalidCategory { raw } => write!(f, "invalid --category value: {raw}"),
            ArgsError::InvalidWindow { raw } => {
                write!(f, "invalid --window value (today, week, month, all): {raw}")
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

/// Quiz choices as typed. Invalid values are replaced later, with a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayArgs {
    pub category: Option<String>,
    pub questions: Option<String>,
    pub timer: Option<bool>,
    pub difficulty: Option<String>,
    pub seed: Option<u64>,
    pub player: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardArgs {
    pub category: Option<Category>,
    pub window: TimeWindow,
    pub search: String,
    pub page: usize,
    pub player: Option<String>,
}

impl Default for BoardArgs {
    fn default() -> Self {
        Self {
            category: None,
            window: TimeWindow::All,
            search: String::new(),
            page: 1,
            player: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Home,
    Play(PlayArgs),
    Leaderboard(BoardArgs),
    Achievements,
    Export { out_dir: PathBuf },
    Reset { confirmed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Home,
    Play,
    Leaderboard,
    Achievements,
    Export,
    Reset,
}

impl CommandKind {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "home" => Some(Self::Home),
            "play" => Some(Self::Play),
            "leaderboard" => Some(Self::Leaderboard),
            "achievements" => Some(Self::Achievements),
            "export" => Some(Self::Export),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub db_url: Option<String>,
    pub data_url: Option<String>,
    pub command: Command,
}

impl Args {
    /// Parse everything after the program name. `Ok(None)` means help was requested.
    pub fn parse(argv: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut args = argv.into_iter().peekable();

        let kind = match args.peek().map(String::as_str) {
            None => CommandKind::Home,
            Some(first) if first.starts_with('-') => CommandKind::Home,
            Some(first) => {
                let kind = CommandKind::from_arg(first)
                    .ok_or_else(|| ArgsError::UnknownCommand(first.to_owned()))?;
                args.next();
                kind
            }
        };

        let mut db_url = None;
        let mut data_url = None;
        let mut play = PlayArgs::default();
        let mut board = BoardArgs::default();
        let mut out_dir = PathBuf::from(".");
        let mut confirmed = false;

        while let Some(arg) = args.next() {
            match (kind, arg.as_str()) {
                (_, "--help" | "-h") => return Ok(None),
                (_, "--db") => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(value);
                }
                (_, "--data-url") => data_url = Some(require_value(&mut args, "--data-url")?),
                (CommandKind::Play, "--category") => {
                    play.category = Some(require_value(&mut args, "--category")?);
                }
                (CommandKind::Play, "--questions") => {
                    play.questions = Some(require_value(&mut args, "--questions")?);
                }
                (CommandKind::Play, "--difficulty") => {
                    play.difficulty = Some(require_value(&mut args, "--difficulty")?);
                }
                (CommandKind::Play, "--timer") => play.timer = Some(true),
                (CommandKind::Play, "--no-timer") => play.timer = Some(false),
                (CommandKind::Play, "--seed") => {
                    let value = require_value(&mut args, "--seed")?;
                    let seed = value
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    play.seed = Some(seed);
                }
                (CommandKind::Play, "--player") => {
                    play.player = Some(require_value(&mut args, "--player")?);
                }
                (CommandKind::Leaderboard, "--category") => {
                    let value = require_value(&mut args, "--category")?;
                    board.category = match value.as_str() {
                        "all" => None,
                        key => Some(
                            Category::from_key(key)
                                .ok_or_else(|| ArgsError::InvalidCategory { raw: value.clone() })?,
                        ),
                    };
                }
                (CommandKind::Leaderboard, "--window") => {
                    let value = require_value(&mut args, "--window")?;
                    board.window = TimeWindow::from_key(&value)
                        .ok_or_else(|| ArgsError::InvalidWindow { raw: value.clone() })?;
                }
                (CommandKind::Leaderboard, "--search") => {
                    board.search = require_value(&mut args, "--search")?;
                }
                (CommandKind::Leaderboard, "--page") => {
                    let value = require_value(&mut args, "--page")?;
                    board.page = value
                        .parse::<usize>()
                        .ok()
                        .filter(|page| *page >= 1)
                        .ok_or_else(|| ArgsError::InvalidPage { raw: value.clone() })?;
                }
                (CommandKind::Leaderboard, "--player") => {
                    board.player = Some(require_value(&mut args, "--player")?);
                }
                (CommandKind::Export, "--out") => {
                    out_dir = PathBuf::from(require_value(&mut args, "--out")?);
                }
                (CommandKind::Reset, "--yes") => confirmed = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match kind {
            CommandKind::Home => Command::Home,
            CommandKind::Play => Command::Play(play),
            CommandKind::Leaderboard => Command::Leaderboard(board),
            CommandKind::Achievements => Command::Achievements,
            CommandKind::Export => Command::Export { out_dir },
            CommandKind::Reset => Command::Reset { confirmed },
        };

        Ok(Some(Self {
            db_url,
            data_url,
            command,
        }))
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [home]        [global options]");
    eprintln!("  cargo run -p app -- play          [--category <key>] [--questions <n>]");
    eprintln!("                                    [--timer | --no-timer] [--difficulty <level>]");
    eprintln!("                                    [--seed <n>] [--player <name>]");
    eprintln!("  cargo run -p app -- leaderboard   [--category <key|all>] [--window <w>]");
    eprintln!("                                    [--search <text>] [--page <n>] [--player <name>]");
    eprintln!("  cargo run -p app -- achievements");
    eprintln!("  cargo run -p app -- export        [--out <dir>]");
    eprintln!("  cargo run -p app -- reset         --yes");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --db <sqlite_url>      SQLite URL (default: sqlite://quiz.sqlite3)");
    eprintln!("  --data-url <url>       Base URL of the question documents");
    eprintln!();
    eprintln!("Categories: general, science, programming, history, math");
    eprintln!("Difficulty: easy, medium, hard, all    Window: today, week, month, all");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_DATA_BASE_URL, QUIZ_FETCH_TIMEOUT_MS, QUIZ_TIMER_SECS,");
    eprintln!("  QUIZ_EXPIRY_DELAY_MS, QUIZ_LOG");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn no_arguments_shows_home() {
        let args = parse(&[]).unwrap().unwrap();
        assert_eq!(args.command, Command::Home);
        assert_eq!(args.db_url, None);
    }

    #[test]
    fn global_flags_work_without_command() {
        let args = parse(&["--db", "sqlite::memory:"]).unwrap().unwrap();
        assert_eq!(args.command, Command::Home);
        assert_eq!(args.db_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn play_keeps_raw_values_for_later_validation() {
        let args = parse(&[
            "play",
            "--category",
            "cooking",
            "--questions",
            "99",
            "--timer",
            "--seed",
            "7",
        ])
        .unwrap()
        .unwrap();
        let Command::Play(play) = args.command else {
            panic!("expected play");
        };
        assert_eq!(play.category.as_deref(), Some("cooking"));
        assert_eq!(play.questions.as_deref(), Some("99"));
        assert_eq!(play.timer, Some(true));
        assert_eq!(play.seed, Some(7));
    }

    #[test]
    fn leaderboard_flags_are_validated() {
        let args = parse(&["leaderboard", "--category", "math", "--window", "week", "--page", "2"])
            .unwrap()
            .unwrap();
        assert_eq!(
            args.command,
            Command::Leaderboard(BoardArgs {
                category: Some(Category::Math),
                window: TimeWindow::Week,
                page: 2,
                ..BoardArgs::default()
            })
        );

        assert_eq!(
            parse(&["leaderboard", "--page", "0"]).unwrap_err(),
            ArgsError::InvalidPage { raw: "0".into() }
        );
        assert_eq!(
            parse(&["leaderboard", "--window", "year"]).unwrap_err(),
            ArgsError::InvalidWindow { raw: "year".into() }
        );
    }

    #[test]
    fn flags_are_scoped_to_their_command() {
        assert_eq!(
            parse(&["achievements", "--seed", "1"]).unwrap_err(),
            ArgsError::UnknownArg("--seed".into())
        );
        assert_eq!(
            parse(&["play", "--db"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        );
        assert_eq!(
            parse(&["serve"]).unwrap_err(),
            ArgsError::UnknownCommand("serve".into())
        );
    }

    #[test]
    fn reset_requires_explicit_confirmation() {
        let args = parse(&["reset"]).unwrap().unwrap();
        assert_eq!(args.command, Command::Reset { confirmed: false });
        let args = parse(&["reset", "--yes"]).unwrap().unwrap();
        assert_eq!(args.command, Command::Reset { confirmed: true });
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["play", "--help"]).unwrap(), None);
    }
}
