use std::time::{Duration, Instant};

use tracing::info;

use crate::compose::{RawEvent, Reconciler};
use crate::criteria::{Criteria, Mode};
use crate::evaluate::{evaluate, FinalStats, SessionResult};
use crate::normalize::normalize;
use crate::platform::{Platform, Script, Strategy};
use crate::session::{FinishReason, Phase, TypingSession};
use crate::stats::{LiveStats, StatsEngine, TickOutcome, DEFAULT_TICK_INTERVAL};
use crate::time_series::WpmSample;
use crate::typing_policy::{apply, Outcome};

#[derive(Debug, Clone, Copy)]
pub struct RoundConfig {
    pub script: Script,
    /// `None` when detection failed.
    pub platform: Option<Platform>,
    pub tick_interval: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            script: Script::English,
            platform: Some(Platform::detect()),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Read-only view for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub wpm: u32,
    pub accuracy: u32,
    pub cursor: usize,
    pub combo_current: u32,
    pub seconds_remaining: Option<u32>,
    pub phase: Phase,
}

/// What one raw event did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    pub outcomes: Vec<Outcome>,
    pub clear_surface: bool,
}

/// One attempt at one text: owns every buffer and timer that must not
/// outlive it.
#[derive(Debug)]
pub struct Round {
    mode: Mode,
    criteria: Criteria,
    reconciler: Reconciler,
    session: TypingSession,
    stats: StatsEngine,
    result: Option<SessionResult>,
    cancelled: bool,
}

impl Round {
    pub fn new(text: &str, mode: Mode, criteria: Criteria, config: RoundConfig) -> Self {
        let strategy = Strategy::select(config.platform, config.script);
        let target = normalize(text);
        info!(
            len = target.len(),
            ?mode,
            ?strategy,
            "round loaded"
        );
        Self {
            mode,
            criteria,
            reconciler: Reconciler::new(config.script, strategy),
            session: TypingSession::new(target),
            stats: StatsEngine::new(config.tick_interval, criteria.time_limit_secs),
            result: None,
            cancelled: false,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn session(&self) -> &TypingSession {
        &self.session
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn history(&self) -> &[WpmSample] {
        self.stats.history()
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_ticking(&self) -> bool {
        self.stats.is_running() && !self.stats.is_cancelled()
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn live(&self) -> LiveStats {
        self.stats.live()
    }

    pub fn snapshot(&self) -> Snapshot {
        let live = self.stats.live();
        Snapshot {
            wpm: live.wpm,
            accuracy: live.accuracy,
            cursor: self.session.cursor(),
            combo_current: self.session.combo_current(),
            seconds_remaining: live.seconds_remaining,
            phase: self.session.phase(),
        }
    }

    pub fn handle(&mut self, raw: RawEvent, now: Instant) -> Step {
        if self.cancelled {
            return Step::default();
        }

        let reconciled = self.reconciler.handle(raw);
        let mut outcomes = Vec::with_capacity(reconciled.events.len());

        for event in reconciled.events {
            if self.session.is_finished() {
                break;
            }
            outcomes.push(apply(&mut self.session, event, &self.criteria, now));

            if let Some(started_at) = self.session.started_at() {
                self.stats.start(started_at);
            }
            if self.session.is_finished() {
                self.finalize();
            }
        }

        Step {
            outcomes,
            clear_surface: reconciled.clear_surface,
        }
    }

    /// Drive the stats clock. Returns fresh stats when a tick was due.
    pub fn on_tick(&mut self, now: Instant) -> Option<LiveStats> {
        if self.cancelled {
            return None;
        }
        match self.stats.on_tick(&self.session, now) {
            TickOutcome::NotDue => None,
            TickOutcome::Updated => Some(self.stats.live()),
            TickOutcome::Expired => {
                self.session.finish(FinishReason::TimeExpired);
                self.finalize();
                Some(self.stats.live())
            }
        }
    }

    /// Abandon the round. Pending composition is discarded so it cannot leak
    /// into whatever is typed next.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            info!(cursor = self.session.cursor(), "round cancelled");
        }
        self.cancelled = true;
        self.stats.cancel();
        self.reconciler.reset();
    }

    fn finalize(&mut self) {
        if self.result.is_some() {
            return;
        }
        self.stats.freeze();
        self.reconciler.reset();

        let live = self.stats.live();
        let reason = self.session.finish_reason();
        let final_stats = FinalStats {
            wpm: live.wpm,
            accuracy: live.accuracy,
            chars_typed: self.session.chars_typed(),
            error_count: self.session.error_count(),
            max_combo: self.session.combo_max(),
            forced_failure: reason == Some(FinishReason::ForcedFailure),
        };
        let result = evaluate(&final_stats, &self.mode, &self.criteria);
        info!(
            reason = ?reason,
            success = result.success,
            wpm = result.wpm,
            accuracy = result.accuracy,
            xp = result.xp,
            "round finished"
        );
        self.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::SpecialKey;
    use crate::evaluate::Threshold;

    fn english() -> RoundConfig {
        RoundConfig {
            script: Script::English,
            platform: Some(Platform::MacOs),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    fn type_into(round: &mut Round, surface: &mut String, text: &str, now: Instant) {
        for c in text.chars() {
            surface.push(c);
            let step = round.handle(
                RawEvent::Input {
                    value: surface.clone(),
                },
                now,
            );
            if step.clear_surface {
                surface.clear();
            }
        }
    }

    #[test]
    fn natural_completion_produces_result() {
        let start = Instant::now();
        let mut round = Round::new("cat", Mode::Practice, Criteria::none(), english());
        let mut surface = String::new();

        type_into(&mut round, &mut surface, "ca", start);
        assert!(round.is_ticking());
        assert!(round.on_tick(start + Duration::from_secs(2)).is_some());
        type_into(
            &mut round,
            &mut surface,
            "t",
            start + Duration::from_secs(3),
        );

        assert!(round.is_finished());
        assert!(!round.is_ticking());
        let result = round.result().unwrap();
        assert!(result.success);
        assert_eq!(result.accuracy, 100);
        // last tick: 2 chars in 2 seconds, 0.4 words / 0.0333 min
        assert_eq!(result.wpm, 12);
        assert_eq!(round.snapshot().cursor, 3);
    }

    #[test]
    fn finish_before_first_tick_keeps_initial_stats() {
        let start = Instant::now();
        let mode = Mode::Level { level: 0 };
        let criteria = mode.default_criteria().unwrap();
        let mut round = Round::new("ab", mode, criteria, english());

        round.handle(
            RawEvent::Input {
                value: "ab".to_string(),
            },
            start,
        );

        assert!(round.is_finished());
        assert!(round.history().is_empty());
        let result = round.result().unwrap();
        assert_eq!(result.wpm, 0);
        assert_eq!(result.accuracy, 100);
        assert!(!result.success);
        assert_eq!(result.stars, None);
        assert_eq!(result.reasons[0].threshold, Threshold::Wpm);
    }

    #[test]
    fn no_stat_mutation_after_finish() {
        let start = Instant::now();
        let mut round = Round::new("ab", Mode::Practice, Criteria::none(), english());
        let mut surface = String::new();
        type_into(&mut round, &mut surface, "ab", start + Duration::from_secs(1));

        let frozen = round.snapshot();
        let samples = round.history().len();
        for secs in 2..20 {
            assert_eq!(round.on_tick(start + Duration::from_secs(secs)), None);
        }
        assert_eq!(round.snapshot(), frozen);
        assert_eq!(round.history().len(), samples);
    }

    #[test]
    fn time_limit_finishes_round() {
        let start = Instant::now();
        let criteria = Criteria {
            time_limit_secs: Some(1),
            ..Criteria::none()
        };
        let mut round = Round::new(
            "a long text",
            Mode::Challenge {
                id: "custom".into(),
            },
            criteria,
            english(),
        );
        let mut surface = String::new();
        type_into(&mut round, &mut surface, "a", start);

        assert!(round.on_tick(start + Duration::from_millis(500)).is_some());
        assert!(!round.is_finished());
        let live = round.on_tick(start + Duration::from_millis(1000)).unwrap();
        assert_eq!(live.seconds_remaining, Some(0));
        assert_eq!(
            round.session().phase(),
            Phase::Finished(FinishReason::TimeExpired)
        );
        assert!(round.result().is_some());

        // input after expiry is not accepted
        let step = round.handle(
            RawEvent::Key {
                key: SpecialKey::Space,
                modifier: false,
            },
            start + Duration::from_millis(1100),
        );
        assert!(step.outcomes.is_empty());
        assert_eq!(round.session().cursor(), 1);
    }

    #[test]
    fn forced_failure_fails_the_challenge() {
        let start = Instant::now();
        let criteria = Criteria {
            min_accuracy: Some(100),
            ..Criteria::none()
        };
        let mut round = Round::new(
            "cat",
            Mode::Challenge {
                id: "c_precision_master".into(),
            },
            criteria,
            english(),
        );
        let mut surface = String::new();
        type_into(&mut round, &mut surface, "cxat", start);

        assert_eq!(
            round.session().phase(),
            Phase::Finished(FinishReason::ForcedFailure)
        );
        assert_eq!(round.session().cursor(), 1);
        let result = round.result().unwrap();
        assert!(!result.success);
        assert!(!result.reasons.is_empty());
    }

    #[test]
    fn events_after_finish_within_one_step_are_dropped() {
        let start = Instant::now();
        let mut round = Round::new("ab", Mode::Practice, Criteria::none(), english());

        let step = round.handle(
            RawEvent::Input {
                value: "abcd".to_string(),
            },
            start,
        );
        assert_eq!(step.outcomes.len(), 2);
        assert!(round.is_finished());
    }

    #[test]
    fn cancel_clears_composition() {
        let start = Instant::now();
        let config = RoundConfig {
            script: Script::Khmer,
            platform: Some(Platform::Linux),
            tick_interval: DEFAULT_TICK_INTERVAL,
        };
        let mut round = Round::new("ក", Mode::Practice, Criteria::none(), config);
        round.handle(RawEvent::CompositionStart, start);
        round.handle(
            RawEvent::Input {
                value: "ក".to_string(),
            },
            start,
        );
        assert!(round.reconciler().is_composing());

        round.cancel();
        assert!(!round.reconciler().is_composing());
        assert!(round.reconciler().buffer().is_empty());
        assert!(round
            .handle(RawEvent::CompositionEnd { data: None }, start)
            .outcomes
            .is_empty());
    }
}
