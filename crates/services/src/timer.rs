//! Per-question countdown driven by a tokio task.

use std::time::Duration;

use quiz_core::timer::{Countdown, Tick};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second passed; carries the seconds left.
    Tick(u32),
    /// The countdown reached zero. Sent once per start.
    Expired,
}

#[derive(Debug, Clone, Copy)]
struct Stamped {
    generation: u64,
    event: TimerEvent,
}

/// Cancellable countdown owned by the active question.
///
/// Every `start` bumps a generation counter and events from earlier
/// generations are dropped, so a cancelled countdown can never fire.
pub struct QuestionTimer {
    duration_secs: u32,
    generation: u64,
    remaining: u32,
    running: bool,
    task: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Stamped>,
    rx: mpsc::UnboundedReceiver<Stamped>,
}

impl QuestionTimer {
    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            duration_secs,
            generation: 0,
            remaining: duration_secs,
            running: false,
            task: None,
            tx,
            rx,
        }
    }

    /// Start counting down from the full duration, cancelling any running countdown.
    pub fn start(&mut self) {
        self.cancel_task();
        self.generation += 1;
        self.remaining = self.duration_secs;
        self.running = true;

        let generation = self.generation;
        let secs = self.duration_secs;
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let mut countdown = Countdown::new();
            countdown.start(secs);
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let event = match countdown.tick() {
                    Tick::Running(left) => TimerEvent::Tick(left),
                    Tick::Expired => TimerEvent::Expired,
                    Tick::Idle => break,
                };
                if tx.send(Stamped { generation, event }).is_err() || event == TimerEvent::Expired {
                    break;
                }
            }
        }));
    }

    pub fn reset(&mut self) {
        self.start();
    }

    /// Cancel without firing. Repeated calls are no-ops.
    pub fn stop(&mut self) {
        if self.running {
            self.generation += 1;
            self.running = false;
        }
        self.cancel_task();
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Wait for the next event of the current countdown.
    ///
    /// Pends forever while stopped, which makes it safe to race in `tokio::select!`.
    pub async fn next_event(&mut self) -> TimerEvent {
        loop {
            let Some(stamped) = self.rx.recv().await else {
                // the sender lives in `self`, so the channel never closes
                return std::future::pending().await;
            };
            if !self.running || stamped.generation != self.generation {
                continue;
            }
            match stamped.event {
                TimerEvent::Tick(left) => self.remaining = left,
                TimerEvent::Expired => {
                    self.remaining = 0;
                    self.running = false;
                    self.task = None;
                }
            }
            return stamped.event;
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.cancel_task();
    }
}
