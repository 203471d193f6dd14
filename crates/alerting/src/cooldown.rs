//! Dispatch cooldown tracking.

use std::time::{Duration, Instant};

/// Tracks when the last alert went out and gates the next one.
///
/// The gate reopens once the time since the last dispatch reaches the
/// cooldown. A fresh state is ready immediately.
#[derive(Debug)]
pub struct CooldownState {
    cooldown: Duration,
    last_dispatch: Option<Instant>,
}

impl CooldownState {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_dispatch: None,
        }
    }

    /// Whether a dispatch at `now` is allowed.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_dispatch {
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
            None => true,
        }
    }

    /// Records a dispatch at `now`, restarting the window.
    pub fn record_dispatch(&mut self, now: Instant) {
        self.last_dispatch = Some(now);
    }

    /// Time left until the gate reopens. Zero when ready.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_dispatch {
            Some(last) => self
                .cooldown
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}
