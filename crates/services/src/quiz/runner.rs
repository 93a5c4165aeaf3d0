use quiz_core::Clock;
use quiz_core::model::QuizParams;
use quiz_core::results::QuizResults;
use quiz_core::session::{Direction, Progress, QuizSession};
use tracing::{debug, info};

use crate::config::QuizTiming;
use crate::error::QuizError;
use crate::question_bank::{LoadedQuestions, QuestionOrigin};
use crate::timer::{QuestionTimer, TimerEvent};

/// What a timer event did to the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Ticked { remaining: u32 },
    /// Time ran out; the question was skipped and the quiz moved on.
    TimeUp(Progress),
}

/// Drives one quiz: the session state machine plus its per-question timer.
///
/// The timer only runs on unanswered questions of an in-progress quiz.
pub struct QuizRunner {
    clock: Clock,
    params: QuizParams,
    origin: QuestionOrigin,
    timing: QuizTiming,
    session: QuizSession,
    timer: Option<QuestionTimer>,
}

impl QuizRunner {
    /// Start a quiz over freshly loaded questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` if the question set is empty.
    pub fn start(
        params: QuizParams,
        loaded: LoadedQuestions,
        timing: QuizTiming,
        clock: Clock,
    ) -> Result<Self, QuizError> {
        let session = QuizSession::started(loaded.questions, clock.now())?;
        let timer = params
            .timer_enabled
            .then(|| QuestionTimer::new(timing.question_secs));

        info!(
            category = %params.category,
            questions = session.total(),
            timer = params.timer_enabled,
            "quiz started"
        );

        let mut runner = Self {
            clock,
            params,
            origin: loaded.origin,
            timing,
            session,
            timer,
        };
        runner.sync_timer();
        Ok(runner)
    }

    /// Restart the timer for an unanswered question, stop it otherwise.
    fn sync_timer(&mut self) {
        let wants_timer = !self.session.is_completed()
            && self
                .session
                .current_answer()
                .is_some_and(|a| a.is_unanswered());
        if let Some(timer) = self.timer.as_mut() {
            if wants_timer {
                timer.reset();
            } else {
                timer.stop();
            }
        }
    }

    /// Record an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` if the question already has an answer or the quiz is over.
    pub fn select_answer(&mut self, option: u8) -> Result<bool, QuizError> {
        let correct = self.session.select_answer(option)?;
        debug!(index = self.session.current_index(), option, correct, "answer selected");
        self.sync_timer();
        Ok(correct)
    }

    /// Move between questions. Works during the quiz and for review afterwards.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` at either end of the question list.
    pub fn navigate(&mut self, direction: Direction) -> Result<usize, QuizError> {
        let index = self.session.advance(direction)?;
        self.sync_timer();
        Ok(index)
    }

    /// Confirm the current answer, wait the feedback delay, then advance or finish.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` if no answer has been selected.
    pub async fn submit(&mut self) -> Result<Progress, QuizError> {
        self.session.ensure_answered()?;
        self.stop_timer();

        let delay = if self.session.is_last() {
            self.timing.finish_delay
        } else {
            self.timing.submit_delay
        };
        tokio::time::sleep(delay).await;

        self.proceed()
    }

    fn proceed(&mut self) -> Result<Progress, QuizError> {
        let progress = self.session.proceed(self.clock.now())?;
        match progress {
            Progress::Moved { .. } => self.sync_timer(),
            Progress::Finished(results) => self.log_finished(&results),
        }
        Ok(progress)
    }

    /// Wait for the next event of the active timer. Pends forever without one.
    pub async fn next_timer_event(&mut self) -> TimerEvent {
        match self.timer.as_mut() {
            Some(timer) => timer.next_event().await,
            None => std::future::pending().await,
        }
    }

    /// Apply a timer event. On expiry the question is skipped and, after the
    /// display delay, the quiz advances or finishes.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` if the current question can no longer expire.
    pub async fn handle_timer_event(&mut self, event: TimerEvent) -> Result<TimerOutcome, QuizError> {
        match event {
            TimerEvent::Tick(remaining) => Ok(TimerOutcome::Ticked { remaining }),
            TimerEvent::Expired => {
                let follow_up = self.session.time_expire()?;
                info!(
                    index = self.session.current_index(),
                    ?follow_up,
                    "time is up, question skipped"
                );
                tokio::time::sleep(self.timing.expiry_delay).await;
                Ok(TimerOutcome::TimeUp(self.proceed()?))
            }
        }
    }

    /// End the quiz now. Unanswered questions count as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` if the quiz never started.
    pub fn finish(&mut self) -> Result<QuizResults, QuizError> {
        let was_completed = self.session.is_completed();
        self.stop_timer();
        let results = self.session.finish(self.clock.now())?;
        if !was_completed {
            self.log_finished(&results);
        }
        Ok(results)
    }

    /// Take the same questions again.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` unless the quiz is completed.
    pub fn retry(&mut self) -> Result<(), QuizError> {
        self.session.retry(self.clock.now())?;
        info!(category = %self.params.category, "quiz restarted");
        self.sync_timer();
        Ok(())
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.stop();
        }
    }

    fn log_finished(&self, results: &QuizResults) {
        info!(
            category = %self.params.category,
            score = results.score_percent(),
            correct = results.correct(),
            total = results.total(),
            secs = results.time_taken_secs(),
            "quiz finished"
        );
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn params(&self) -> &QuizParams {
        &self.params
    }

    #[must_use]
    pub fn origin(&self) -> QuestionOrigin {
        self.origin
    }

    /// Seconds left on the current question, if timing is enabled.
    #[must_use]
    pub fn remaining_secs(&self) -> Option<u32> {
        self.timer.as_ref().map(QuestionTimer::remaining)
    }

    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(QuestionTimer::is_running)
    }

    /// Move the injected clock forward. Only affects a fixed clock.
    pub fn advance_clock(&mut self, delta: chrono::Duration) {
        self.clock.advance(delta);
    }
}
