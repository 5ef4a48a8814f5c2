use super::*;
use std::time::Duration;
use tokio::time::Instant;

/// Round deadline tracking. Owned by the dealer.
///
/// The deadline moves to `now + turn_timeout` whenever the board is freshly
/// dealt or a claim is accepted.
#[derive(Debug)]
pub struct Timer {
    timeout: Duration,
    warning: Duration,
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new(config: &Config) -> Self {
        Self {
            timeout: config.turn_timeout,
            warning: config.turn_warning,
            deadline: None,
        }
    }
    pub fn reset(&mut self) {
        self.deadline = Some(Instant::now() + self.timeout);
    }
    pub fn clear(&mut self) {
        self.deadline = None;
    }
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
    pub fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
    /// Time left in the round; zero once expired or when no round runs.
    pub fn remaining(&self) -> Duration {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }
    /// True when the countdown should be shown as a warning.
    pub fn warning(&self) -> bool {
        self.deadline.is_some() && self.remaining() <= self.warning
    }
}
