use std::fmt;

/// Seconds each question gets when timing is enabled.
pub const DEFAULT_QUESTION_SECS: u32 = 30;

/// At or below this many seconds the countdown is shown as urgent.
pub const WARNING_SECS: u32 = 10;

/// Result of one one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Countdown is stopped; nothing happened.
    Idle,
    /// Still counting; carries the seconds left.
    Running(u32),
    /// Reached zero on this tick. Reported exactly once.
    Expired,
}

/// Per-question countdown, advanced by an external one-second driver.
///
/// The countdown owns no scheduling; services drive `tick` from a tokio interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    remaining: u32,
    active: bool,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, secs: u32) {
        self.remaining = secs;
        self.active = true;
    }

    /// Cancel the running countdown and start again from `secs`.
    pub fn reset(&mut self, secs: u32) {
        self.stop();
        self.start(secs);
    }

    /// Cancel without expiring. Repeated calls are no-ops.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.active {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Low-time warning threshold used by the terminal driver.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.active && self.remaining <= WARNING_SECS
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
