use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{OPTION_COUNT, Question};
use crate::results::QuizResults;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Illegal transitions of the quiz session state machine.
///
/// A rejected call never changes the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a quiz needs at least one question")]
    EmptyQuestions,

    #[error("session has already been started")]
    AlreadyStarted,

    #[error("session is not in progress")]
    NotInProgress,

    #[error("session is not completed")]
    NotCompleted,

    #[error("option {0} does not exist")]
    OptionOutOfRange(u8),

    #[error("question {index} already has an answer")]
    AlreadyAnswered { index: usize },

    #[error("select an answer before submitting")]
    NoAnswerSelected,

    #[error("already at the first question")]
    AtFirstQuestion,

    #[error("already at the last question")]
    AtLastQuestion,
}

//
// ─── ANSWER SLOTS ──────────────────────────────────────────────────────────────
//

/// Recorded state of one question's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Answer {
    /// The user has not acted and time has not run out.
    #[default]
    Unanswered,
    /// Time ran out before an option was chosen.
    Skipped,
    /// Index of the chosen option.
    Chosen(u8),
}

impl Answer {
    #[must_use]
    pub fn chosen(self) -> Option<u8> {
        match self {
            Answer::Chosen(opt) => Some(opt),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unanswered(self) -> bool {
        matches!(self, Answer::Unanswered)
    }

    #[must_use]
    pub fn is_skipped(self) -> bool {
        matches!(self, Answer::Skipped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Where a session went after `proceed` or a time-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Moved { index: usize },
    Finished(QuizResults),
}

/// What should follow a time-up once the display delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryFollowUp {
    AdvanceToNext,
    FinishQuiz,
}

/// Counts shown while a quiz is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiveStats {
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    pub skipped: u32,
}

/// Position indicator, 1-based for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub number: usize,
    pub total: usize,
}

/// Read-only view of a question after completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionReview<'a> {
    pub index: usize,
    pub question: &'a Question,
    pub answer: Answer,
    pub is_correct: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a fixed, ordered set of questions.
///
/// `answers.len() == questions.len()` holds in every state. Once an answer slot
/// leaves `Unanswered` it never changes again until `retry`.
#[derive(Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: Vec<Answer>,
    current: usize,
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    results: Option<QuizResults>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// A session that has not been started.
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            answers: Vec::new(),
            current: 0,
            state: SessionState::NotStarted,
            started_at: None,
            completed_at: None,
            results: None,
        }
    }

    /// Create and start a session in one step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuestions` if `questions` is empty.
    pub fn started(questions: Vec<Question>, now: DateTime<Utc>) -> Result<Self, SessionError> {
        let mut session = Self::new();
        session.start(questions, now)?;
        Ok(session)
    }

    /// Begin the quiz at the first question with every answer unanswered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuestions` for an empty set, or
    /// `SessionError::AlreadyStarted` if the session left `NotStarted`.
    pub fn start(&mut self, questions: Vec<Question>, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestions);
        }

        self.answers = vec![Answer::Unanswered; questions.len()];
        self.questions = questions;
        self.begin(now);
        Ok(())
    }

    fn begin(&mut self, now: DateTime<Utc>) {
        self.current = 0;
        self.state = SessionState::InProgress;
        self.started_at = Some(now);
        self.completed_at = None;
        self.results = None;
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Record `option` for the current question and return whether it is correct.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside a running quiz,
    /// `SessionError::OptionOutOfRange` for an invalid option, and
    /// `SessionError::AlreadyAnswered` if the slot is answered or skipped.
    pub fn select_answer(&mut self, option: u8) -> Result<bool, SessionError> {
        self.ensure_in_progress()?;
        if usize::from(option) >= OPTION_COUNT {
            return Err(SessionError::OptionOutOfRange(option));
        }
        if !self.answers[self.current].is_unanswered() {
            return Err(SessionError::AlreadyAnswered {
                index: self.current,
            });
        }

        self.answers[self.current] = Answer::Chosen(option);
        Ok(self.questions[self.current].is_correct(option))
    }

    /// Move the cursor one question. Allowed while running and, for review, after completion.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AtFirstQuestion` / `AtLastQuestion` at the bounds and
    /// `SessionError::NotInProgress` before the quiz starts.
    pub fn advance(&mut self, direction: Direction) -> Result<usize, SessionError> {
        if self.state == SessionState::NotStarted {
            return Err(SessionError::NotInProgress);
        }
        match direction {
            Direction::Forward => {
                if self.is_last() {
                    return Err(SessionError::AtLastQuestion);
                }
                self.current += 1;
            }
            Direction::Backward => {
                if self.current == 0 {
                    return Err(SessionError::AtFirstQuestion);
                }
                self.current -= 1;
            }
        }
        Ok(self.current)
    }

    /// Mark the current, still unanswered question as skipped because time ran out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside a running quiz and
    /// `SessionError::AlreadyAnswered` if the slot already has a value.
    pub fn time_expire(&mut self) -> Result<ExpiryFollowUp, SessionError> {
        self.ensure_in_progress()?;
        if !self.answers[self.current].is_unanswered() {
            return Err(SessionError::AlreadyAnswered {
                index: self.current,
            });
        }

        self.answers[self.current] = Answer::Skipped;
        Ok(if self.is_last() {
            ExpiryFollowUp::FinishQuiz
        } else {
            ExpiryFollowUp::AdvanceToNext
        })
    }

    /// Check that the current question can be submitted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoAnswerSelected` if nothing was chosen yet.
    pub fn ensure_answered(&self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.answers[self.current].is_unanswered() {
            return Err(SessionError::NoAnswerSelected);
        }
        Ok(())
    }

    /// Step forward, or finish when already on the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside a running quiz.
    pub fn proceed(&mut self, now: DateTime<Utc>) -> Result<Progress, SessionError> {
        self.ensure_in_progress()?;
        if self.is_last() {
            return self.finish(now).map(Progress::Finished);
        }
        self.current += 1;
        Ok(Progress::Moved {
            index: self.current,
        })
    }

    /// End the quiz and compute the final results.
    ///
    /// Calling this on a completed session returns the existing results unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` if the quiz never started.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<QuizResults, SessionError> {
        match self.state {
            SessionState::NotStarted => Err(SessionError::NotInProgress),
            SessionState::Completed => self.results.ok_or(SessionError::NotCompleted),
            SessionState::InProgress => {
                let started_at = self.started_at.unwrap_or(now);
                let results =
                    QuizResults::calculate(&self.questions, &self.answers, started_at, now);
                self.state = SessionState::Completed;
                self.completed_at = Some(now);
                self.results = Some(results);
                Ok(results)
            }
        }
    }

    /// Restart a completed quiz with the same questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` unless the session is completed.
    pub fn retry(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.state != SessionState::Completed {
            return Err(SessionError::NotCompleted);
        }
        self.answers = vec![Answer::Unanswered; self.questions.len()];
        self.begin(now);
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.state == SessionState::InProgress {
            Ok(())
        } else {
            Err(SessionError::NotInProgress)
        }
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<Answer> {
        self.answers.get(self.current).copied()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn position(&self) -> Position {
        Position {
            number: self.current + 1,
            total: self.questions.len(),
        }
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn results(&self) -> Option<&QuizResults> {
        self.results.as_ref()
    }

    /// Running score: answers matching the correct option.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.live_stats().correct
    }

    #[must_use]
    pub fn live_stats(&self) -> LiveStats {
        let mut stats = LiveStats::default();
        for (question, answer) in self.questions.iter().zip(&self.answers) {
            match answer {
                Answer::Unanswered => stats.unanswered += 1,
                Answer::Skipped => stats.skipped += 1,
                Answer::Chosen(opt) if question.is_correct(*opt) => stats.correct += 1,
                Answer::Chosen(_) => stats.incorrect += 1,
            }
        }
        stats
    }

    /// Inspect a question after completion. Never mutates the recorded answers.
    #[must_use]
    pub fn review(&self, index: usize) -> Option<QuestionReview<'_>> {
        if !self.is_completed() {
            return None;
        }
        let question = self.questions.get(index)?;
        let answer = self.answers[index];
        Some(QuestionReview {
            index,
            question,
            answer,
            is_correct: answer.chosen().is_some_and(|opt| question.is_correct(opt)),
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("state", &self.state)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
