use std::time::{Duration, Instant};

use serde::Serialize;

use crate::runtime::TickSchedule;
use crate::session::TypingSession;
use crate::time_series::WpmSample;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Floor for elapsed minutes so the first tick never divides by zero.
const MIN_ELAPSED_MINUTES: f64 = 0.001;

/// Standard word length for wpm.
const CHARS_PER_WORD: f64 = 5.0;

/// Live figures exposed for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiveStats {
    pub wpm: u32,
    pub accuracy: u32,
    /// Whole seconds left, rounded up, on timed sessions.
    pub seconds_remaining: Option<u32>,
}

impl Default for LiveStats {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
            seconds_remaining: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    NotDue,
    Updated,
    /// The time limit ran out on this tick.
    Expired,
}

pub fn words_per_minute(chars_typed: u32, elapsed: Duration) -> u32 {
    let minutes = (elapsed.as_secs_f64() / 60.0).max(MIN_ELAPSED_MINUTES);
    ((chars_typed as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

pub fn accuracy(chars_typed: u32, error_count: u32) -> u32 {
    if chars_typed == 0 {
        return 100;
    }
    let pct = (chars_typed as f64 - error_count as f64) / chars_typed as f64 * 100.0;
    pct.round().max(0.0) as u32
}

/// Periodic derivation of speed and accuracy for one session.
#[derive(Debug, Clone)]
pub struct StatsEngine {
    schedule: TickSchedule,
    time_limit: Option<Duration>,
    live: LiveStats,
    history: Vec<WpmSample>,
}

impl StatsEngine {
    pub fn new(interval: Duration, time_limit_secs: Option<u32>) -> Self {
        Self {
            schedule: TickSchedule::new(interval),
            time_limit: time_limit_secs.map(|s| Duration::from_secs(s as u64)),
            live: LiveStats {
                seconds_remaining: time_limit_secs,
                ..LiveStats::default()
            },
            history: Vec::new(),
        }
    }

    pub fn live(&self) -> LiveStats {
        self.live
    }

    pub fn history(&self) -> &[WpmSample] {
        &self.history
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_armed()
    }

    pub fn is_cancelled(&self) -> bool {
        self.schedule.is_cancelled()
    }

    /// Begin the periodic clock at the session's start time.
    pub fn start(&mut self, started_at: Instant) {
        self.schedule.arm(started_at);
    }

    pub fn on_tick(&mut self, session: &TypingSession, now: Instant) -> TickOutcome {
        if !session.is_active() || !self.schedule.poll(now) {
            return TickOutcome::NotDue;
        }

        let expired = self.recompute(session, now);
        if expired {
            self.schedule.cancel();
            TickOutcome::Expired
        } else {
            TickOutcome::Updated
        }
    }

    /// Stop ticking for good. Live figures keep the last tick's values.
    pub fn freeze(&mut self) {
        self.schedule.cancel();
    }

    pub fn cancel(&mut self) {
        self.schedule.cancel();
    }

    fn recompute(&mut self, session: &TypingSession, now: Instant) -> bool {
        let Some(started_at) = session.started_at() else {
            return false;
        };
        let elapsed = now.saturating_duration_since(started_at);

        self.live.wpm = words_per_minute(session.chars_typed(), elapsed);
        self.live.accuracy = accuracy(session.chars_typed(), session.error_count());
        self.history
            .push(WpmSample::new(elapsed.as_secs_f64(), self.live.wpm));

        match self.time_limit {
            Some(limit) => {
                let left = limit.saturating_sub(elapsed);
                self.live.seconds_remaining = Some(left.as_secs_f64().ceil() as u32);
                left.is_zero()
            }
            None => false,
        }
    }
}
