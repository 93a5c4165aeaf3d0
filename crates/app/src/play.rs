//! Interactive terminal quiz. Reads one command per line and races it
//! against the question timer.

use std::error::Error;

use quiz_core::leaderboard::LEADERBOARD_CAPACITY;
use quiz_core::model::{QuizParams, RawQuizParams, option_letter};
use quiz_core::results::{QuizResults, format_duration};
use quiz_core::session::{Answer, Direction, Progress};
use quiz_core::timer::WARNING_SECS;
use services::{AppServices, QuestionOrigin, QuizError, QuizRunner, TimerEvent, TimerOutcome};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use crate::args::PlayArgs;

type Input = Lines<BufReader<Stdin>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Select(u8),
    Submit,
    Move(Direction),
    Finish,
    Help,
    Unknown(String),
}

fn parse_action(line: &str) -> Action {
    let lower = line.trim().to_ascii_lowercase();
    match lower.as_str() {
        "1" | "a" => Action::Select(0),
        "2" | "b" => Action::Select(1),
        "3" | "c" => Action::Select(2),
        "4" | "d" => Action::Select(3),
        "" | "s" | "submit" => Action::Submit,
        "n" | "next" => Action::Move(Direction::Forward),
        "p" | "prev" | "back" => Action::Move(Direction::Backward),
        "q" | "quit" | "finish" => Action::Finish,
        "h" | "?" | "help" => Action::Help,
        _ => Action::Unknown(lower),
    }
}

enum Step {
    Line(Option<String>),
    Timer(TimerEvent),
}

/// Resolve the quiz parameters, saved settings filling whatever was not given.
async fn resolve_params(services: &AppServices, args: &PlayArgs) -> QuizParams {
    let settings = services.settings().load().await;
    let questions = args
        .questions
        .clone()
        .unwrap_or_else(|| settings.question_count().to_string());
    let timer = args.timer.unwrap_or(settings.timer_enabled()).to_string();

    let parsed = QuizParams::parse(&RawQuizParams {
        category: Some(
            args.category
                .as_deref()
                .unwrap_or(settings.last_category().key()),
        ),
        questions: Some(questions.as_str()),
        timer: Some(timer.as_str()),
        difficulty: Some(
            args.difficulty
                .as_deref()
                .unwrap_or(settings.difficulty().key()),
        ),
    });
    for rejected in &parsed.rejected {
        warn!(%rejected, "quiz parameter replaced");
        println!("note: {rejected}");
    }
    parsed.params
}

pub async fn run(services: &AppServices, args: PlayArgs) -> Result<(), Box<dyn Error>> {
    let params = resolve_params(services, &args).await;
    let mut runner = match args.seed {
        Some(seed) => services.start_quiz_seeded(&params, seed).await?,
        None => services.start_quiz(&params).await?,
    };

    println!(
        "{}: {} questions, difficulty {}, timer {}",
        params.category.display_name(),
        runner.session().total(),
        params.difficulty.key(),
        if params.timer_enabled { "on" } else { "off" }
    );
    if runner.origin() == QuestionOrigin::Fallback {
        println!("Question data unavailable, playing with the built-in sample questions.");
    }
    print_controls();

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let results = take_quiz(&mut runner, &mut input).await?;
        print_results(&results);
        print_review(&runner);
        save_score(services, &runner, &results, args.player.as_deref(), &mut input).await?;

        if !ask_yes_no("Try again with the same questions?", &mut input).await? {
            return Ok(());
        }
        runner.retry()?;
    }
}

async fn take_quiz(runner: &mut QuizRunner, input: &mut Input) -> Result<QuizResults, Box<dyn Error>> {
    show_question(runner);
    loop {
        if let Some(results) = runner.session().results() {
            return Ok(*results);
        }

        let step = tokio::select! {
            line = input.next_line() => Step::Line(line?),
            event = runner.next_timer_event() => Step::Timer(event),
        };

        match step {
            // stdin closed: end the attempt with what we have
            Step::Line(None) => return Ok(runner.finish()?),
            Step::Line(Some(line)) => handle_line(runner, &line).await?,
            Step::Timer(event) => match runner.handle_timer_event(event).await? {
                TimerOutcome::Ticked { remaining } => {
                    if remaining <= WARNING_SECS {
                        println!("  {remaining}s left");
                    }
                }
                TimerOutcome::TimeUp(progress) => {
                    println!("Time's up! The question was skipped.");
                    if matches!(progress, Progress::Moved { .. }) {
                        show_question(runner);
                    }
                }
            },
        }
    }
}

async fn handle_line(runner: &mut QuizRunner, line: &str) -> Result<(), QuizError> {
    match parse_action(line) {
        Action::Select(option) => match runner.select_answer(option) {
            Ok(correct) => print_feedback(runner, correct),
            Err(err) => println!("{err}"),
        },
        Action::Submit => match runner.submit().await {
            Ok(Progress::Moved { .. }) => show_question(runner),
            Ok(Progress::Finished(_)) => {}
            Err(err) => println!("{err}"),
        },
        Action::Move(direction) => match runner.navigate(direction) {
            Ok(_) => show_question(runner),
            Err(err) => println!("{err}"),
        },
        Action::Finish => {
            runner.finish()?;
        }
        Action::Help => print_controls(),
        Action::Unknown(other) => println!("unknown input `{other}`, type h for help"),
    }
    Ok(())
}

fn print_controls() {
    println!("Answer with 1-4 (or a-d), Enter to submit, n/p to move, q to finish, h for help.");
}

fn show_question(runner: &QuizRunner) {
    let session = runner.session();
    let Some(question) = session.current_question() else {
        return;
    };
    let position = session.position();
    let stats = session.live_stats();

    println!();
    println!(
        "Question {}/{}   score {}  correct {}  incorrect {}  skipped {}",
        position.number,
        position.total,
        session.score(),
        stats.correct,
        stats.incorrect,
        stats.skipped
    );
    println!("{}", question.text());
    for (index, option) in (0u8..).zip(question.options()) {
        println!("  {}) {option}", option_letter(index));
    }
    match session.current_answer() {
        Some(Answer::Chosen(option)) => println!("  answered {}", option_letter(option)),
        Some(Answer::Skipped) => println!("  skipped, time ran out"),
        _ => {}
    }
    if runner.timer_running() {
        if let Some(secs) = runner.remaining_secs() {
            println!("  {secs}s on the clock");
        }
    }
}

fn print_feedback(runner: &QuizRunner, correct: bool) {
    let Some(question) = runner.session().current_question() else {
        return;
    };
    if correct {
        println!("Correct!");
    } else {
        println!(
            "Incorrect. The answer is {}) {}",
            option_letter(question.correct_index()),
            question.correct_option()
        );
    }
    if !question.explanation().is_empty() {
        println!("  {}", question.explanation());
    }
}

fn print_results(results: &QuizResults) {
    let tier = results.feedback();
    println!();
    println!("{} {}", tier.headline(), tier.message());
    println!(
        "Score {}% ({} of {} correct), accuracy {}%",
        results.score_percent(),
        results.correct(),
        results.total(),
        results.accuracy()
    );
    println!(
        "Incorrect {}, skipped {}, time {}",
        results.incorrect(),
        results.skipped(),
        format_duration(results.time_taken_secs())
    );
}

fn print_review(runner: &QuizRunner) {
    let session = runner.session();
    println!();
    println!("Review:");
    for index in 0..session.total() {
        let Some(review) = session.review(index) else {
            continue;
        };
        let mark = if review.is_correct { "+" } else { "-" };
        let given = match review.answer {
            Answer::Chosen(option) => option_letter(option).to_string(),
            Answer::Skipped => "skipped".to_owned(),
            Answer::Unanswered => "no answer".to_owned(),
        };
        println!(
            "{mark} {}. {} (yours: {given}, correct: {})",
            review.index + 1,
            review.question.text(),
            option_letter(review.question.correct_index())
        );
    }
}

async fn save_score(
    services: &AppServices,
    runner: &QuizRunner,
    results: &QuizResults,
    player: Option<&str>,
    input: &mut Input,
) -> Result<(), Box<dyn Error>> {
    let settings = services.settings();
    let known = match player {
        Some(name) => Some(name.to_owned()),
        None => settings.player_name().await.unwrap_or_else(|err| {
            warn!(error = %err, "saved player name unavailable");
            None
        }),
    };
    let raw = match known {
        Some(name) => name,
        None => {
            println!("Enter your name to save the score (blank to skip):");
            match input.next_line().await? {
                Some(line) if !line.trim().is_empty() => line,
                _ => return Ok(()),
            }
        }
    };

    let name = match settings.set_player_name(&raw).await {
        Ok(name) => name,
        Err(err) => {
            println!("score not saved: {err}");
            return Ok(());
        }
    };

    let params = runner.params();
    let saved = match services
        .leaderboard()
        .save_score(&name, params.category, params.difficulty, results)
        .await
    {
        Ok(saved) => saved,
        Err(err) => {
            warn!(error = %err, "score save failed");
            println!("score not saved: {err}");
            return Ok(());
        }
    };
    match saved.rank {
        Some(rank) => println!("Saved. {name} is #{rank} on the leaderboard."),
        None => println!("Saved, but outside the top {LEADERBOARD_CAPACITY}."),
    }
    Ok(())
}

async fn ask_yes_no(prompt: &str, input: &mut Input) -> Result<bool, std::io::Error> {
    println!("{prompt} [y/N]");
    let answer = input.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
