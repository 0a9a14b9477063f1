//! Pass/fail verdicts, star ratings and experience rewards.

use std::fmt;

use serde::Serialize;

use crate::criteria::{Criteria, Mode};

const STAR_ACCURACY: u32 = 98;
const STAR_MIN_WPM: f64 = 40.0;
const STAR_WPM_FACTOR: f64 = 1.2;
const MAX_STARS: u8 = 3;

const XP_PER_CHAR: f64 = 0.5;
const XP_ACCURACY_BONUS_AT: u32 = 95;
const XP_SPEED_BONUS_AT: u32 = 40;
const XP_BONUS: u32 = 50;

/// Frozen figures of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalStats {
    pub wpm: u32,
    pub accuracy: u32,
    pub chars_typed: u32,
    pub error_count: u32,
    pub max_combo: u32,
    /// Ended by a mismatch under an error-free requirement.
    pub forced_failure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    Accuracy,
    Wpm,
    ErrorFree,
}

/// One threshold the session did not meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Unmet {
    pub threshold: Threshold,
    pub required: u32,
    pub actual: u32,
}

impl fmt::Display for Unmet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.threshold {
            Threshold::Accuracy => write!(
                f,
                "accuracy {}% is below the required {}%",
                self.actual, self.required
            ),
            Threshold::Wpm => write!(
                f,
                "speed {} wpm is below the required {} wpm",
                self.actual, self.required
            ),
            Threshold::ErrorFree => write!(f, "{} error(s) where none are allowed", self.actual),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    pub success: bool,
    pub wpm: u32,
    pub accuracy: u32,
    pub max_combo: u32,
    pub reasons: Vec<Unmet>,
    /// Level mode only, and only on success.
    pub stars: Option<u8>,
    pub xp: u32,
}

pub fn evaluate(stats: &FinalStats, mode: &Mode, criteria: &Criteria) -> SessionResult {
    let reasons = match mode {
        Mode::Practice => Vec::new(),
        Mode::Level { .. } | Mode::Challenge { .. } => unmet_thresholds(stats, criteria),
    };
    let success = reasons.is_empty();

    let stars = match mode {
        Mode::Level { .. } if success => Some(star_rating(stats, criteria)),
        _ => None,
    };

    SessionResult {
        success,
        wpm: stats.wpm,
        accuracy: stats.accuracy,
        max_combo: stats.max_combo,
        reasons,
        stars,
        xp: experience(stats),
    }
}

fn unmet_thresholds(stats: &FinalStats, criteria: &Criteria) -> Vec<Unmet> {
    let mut reasons = Vec::new();

    if let Some(required) = criteria.min_accuracy {
        if stats.accuracy < required {
            reasons.push(Unmet {
                threshold: Threshold::Accuracy,
                required,
                actual: stats.accuracy,
            });
        }
    }
    if let Some(required) = criteria.min_wpm {
        if stats.wpm < required {
            reasons.push(Unmet {
                threshold: Threshold::Wpm,
                required,
                actual: stats.wpm,
            });
        }
    }
    // rounding can report 100% with a mistake on record
    if stats.forced_failure && !reasons.iter().any(|r| r.threshold == Threshold::Accuracy) {
        reasons.push(Unmet {
            threshold: Threshold::ErrorFree,
            required: 0,
            actual: stats.error_count,
        });
    }

    reasons
}

fn star_rating(stats: &FinalStats, criteria: &Criteria) -> u8 {
    let mut stars = 1;
    if stats.accuracy >= STAR_ACCURACY {
        stars += 1;
    }
    let speed_bar = STAR_MIN_WPM.max(criteria.min_wpm.unwrap_or(0) as f64 * STAR_WPM_FACTOR);
    if stats.wpm as f64 >= speed_bar {
        stars += 1;
    }
    stars.min(MAX_STARS)
}

/// Experience earned in any mode.
pub fn experience(stats: &FinalStats) -> u32 {
    let mut xp = (stats.chars_typed as f64 * XP_PER_CHAR).floor() as u32;
    if stats.accuracy >= XP_ACCURACY_BONUS_AT {
        xp += XP_BONUS;
    }
    if stats.wpm >= XP_SPEED_BONUS_AT {
        xp += XP_BONUS;
    }
    xp
}
