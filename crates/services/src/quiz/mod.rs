mod runner;

pub use runner::{QuizRunner, TimerOutcome};
