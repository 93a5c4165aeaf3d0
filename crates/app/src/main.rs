mod args;
mod play;
mod report;

use quiz_core::Clock;
use services::{AppConfig, AppServices};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Args, ArgsError, Command, print_usage};

/// Parse the command line, showing usage on `--help` or a bad argument.
/// The error itself is left for `main` to report.
fn command_line(argv: impl IntoIterator<Item = String>) -> Result<Option<Args>, ArgsError> {
    let parsed = Args::parse(argv);
    if !matches!(parsed, Ok(Some(_))) {
        print_usage();
    }
    parsed
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = command_line(std::env::args().skip(1))? else {
        return Ok(());
    };

    let mut config = AppConfig::from_env()?;
    if let Some(db_url) = args.db_url {
        config.db_url = db_url;
    }
    if let Some(data_url) = args.data_url.as_deref() {
        config.set_data_base_url(data_url)?;
    }

    // logs go to stderr so they never interleave with quiz output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let services = AppServices::from_config(&config, Clock::system()).await?;
    if let Some(warning) = services.storage_warning() {
        eprintln!("warning: {warning}; scores will be lost when the program exits");
    }
    info!(backend = ?services.backend(), data = %config.data_base_url, "services ready");

    match args.command {
        Command::Home => report::home(&services).await,
        Command::Play(play) => play::run(&services, play).await,
        Command::Leaderboard(board) => report::leaderboard(&services, &board).await,
        Command::Achievements => report::achievements(&services).await,
        Command::Export { out_dir } => report::export(&services, &out_dir).await,
        Command::Reset { confirmed } => report::reset(&services, confirmed).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
