use chrono::{DateTime, Utc};

use crate::model::Question;
use crate::session::Answer;
use crate::time::whole_seconds_between;

/// Final statistics for a completed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResults {
    total: u32,
    correct: u32,
    incorrect: u32,
    skipped: u32,
    score_percent: u8,
    accuracy: u8,
    time_taken_secs: u64,
}

impl QuizResults {
    /// Derive results from the frozen questions and answers of a session.
    ///
    /// Unanswered slots (quiz ended early) count as incorrect, not skipped.
    /// Accuracy is measured over every question that was not skipped.
    #[must_use]
    pub fn calculate(
        questions: &[Question],
        answers: &[Answer],
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let total = saturating_u32(questions.len());
        let correct = saturating_u32(
            questions
                .iter()
                .zip(answers)
                .filter(|(q, a)| a.chosen().is_some_and(|opt| q.is_correct(opt)))
                .count(),
        );
        let skipped = saturating_u32(answers.iter().filter(|a| a.is_skipped()).count());
        let incorrect = total.saturating_sub(correct).saturating_sub(skipped);
        let answered = total.saturating_sub(skipped);

        Self {
            total,
            correct,
            incorrect,
            skipped,
            score_percent: round_percent(correct, total),
            accuracy: round_percent(correct, answered),
            time_taken_secs: whole_seconds_between(started_at, completed_at),
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    #[must_use]
    pub fn score_percent(&self) -> u8 {
        self.score_percent
    }

    #[must_use]
    pub fn accuracy(&self) -> u8 {
        self.accuracy
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u64 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn feedback(&self) -> FeedbackTier {
        FeedbackTier::for_score(self.score_percent)
    }
}

/// Encouragement band shown with the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTier {
    Outstanding,
    GreatJob,
    GoodEffort,
    KeepLearning,
}

impl FeedbackTier {
    #[must_use]
    pub fn for_score(score_percent: u8) -> Self {
        match score_percent {
            90.. => Self::Outstanding,
            70..=89 => Self::GreatJob,
            50..=69 => Self::GoodEffort,
            _ => Self::KeepLearning,
        }
    }

    #[must_use]
    pub fn headline(self) -> &'static str {
        match self {
            FeedbackTier::Outstanding => "Outstanding!",
            FeedbackTier::GreatJob => "Great Job!",
            FeedbackTier::GoodEffort => "Good Effort!",
            FeedbackTier::KeepLearning => "Keep Learning!",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::Outstanding => "You've mastered this category!",
            FeedbackTier::GreatJob => "You have a solid understanding of this topic.",
            FeedbackTier::GoodEffort => "You're on the right track. Try reviewing the questions you missed.",
            FeedbackTier::KeepLearning => "Every expert was once a beginner. Review the material and try again.",
        }
    }
}

/// `part / whole` as a percentage rounded half-up; zero when `whole` is zero.
#[must_use]
pub fn round_percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part.min(whole));
    let whole = u64::from(whole);
    let pct = (part * 200 + whole) / (whole * 2);
    u8::try_from(pct).unwrap_or(100)
}

/// Compact duration used in result and leaderboard listings: `45s`, `2m 5s`.
#[must_use]
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
