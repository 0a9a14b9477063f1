//! Session modes, pass/fail thresholds, and the built-in challenge and level
//! definitions.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Pass/fail thresholds attached to a non-practice session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    pub min_accuracy: Option<u32>,
    pub min_wpm: Option<u32>,
    pub time_limit_secs: Option<u32>,
}

impl Criteria {
    pub const fn none() -> Self {
        Self {
            min_accuracy: None,
            min_wpm: None,
            time_limit_secs: None,
        }
    }

    /// A single mismatch ends the session when perfection is required.
    pub fn instant_fail_on_error(&self) -> bool {
        self.min_accuracy == Some(100)
    }

    pub fn is_empty(&self) -> bool {
        self.min_accuracy.is_none() && self.min_wpm.is_none() && self.time_limit_secs.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Mode {
    Practice,
    Level { level: u32 },
    Challenge { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Speed,
    Accuracy,
    Endurance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub kind: ChallengeKind,
    pub difficulty: Difficulty,
    pub criteria: Criteria,
}

pub const CHALLENGES: &[Challenge] = &[
    Challenge {
        id: "c_beginner_speed",
        title: "Novice Sprinter",
        description: "Type a simple text maintaining at least 30 WPM.",
        kind: ChallengeKind::Speed,
        difficulty: Difficulty::Easy,
        criteria: Criteria {
            min_accuracy: Some(90),
            min_wpm: Some(30),
            time_limit_secs: None,
        },
    },
    Challenge {
        id: "c_precision_master",
        title: "Precision Master",
        description: "Complete a complex text with 100% accuracy.",
        kind: ChallengeKind::Accuracy,
        difficulty: Difficulty::Hard,
        criteria: Criteria {
            min_accuracy: Some(100),
            min_wpm: None,
            time_limit_secs: None,
        },
    },
    Challenge {
        id: "c_minute_madness",
        title: "Minute Madness",
        description: "Type as much as you can in 60 seconds.",
        kind: ChallengeKind::Endurance,
        difficulty: Difficulty::Medium,
        criteria: Criteria {
            min_accuracy: None,
            min_wpm: Some(40),
            time_limit_secs: Some(60),
        },
    },
    Challenge {
        id: "c_khmer_scholar",
        title: "Khmer Scholar",
        description: "Type a formal Khmer text with high accuracy.",
        kind: ChallengeKind::Accuracy,
        difficulty: Difficulty::Hard,
        criteria: Criteria {
            min_accuracy: Some(98),
            min_wpm: Some(25),
            time_limit_secs: None,
        },
    },
];

impl Challenge {
    pub fn find(id: &str) -> Result<&'static Challenge> {
        CHALLENGES
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::UnknownChallenge(id.to_string()))
    }
}

/// Thresholds for an adventure level. The first unit is keyboard drills.
pub fn level_criteria(level: u32) -> Criteria {
    let (min_accuracy, min_wpm) = if level < 10 {
        (90, 10 + level)
    } else {
        (85, 15 + level / 5)
    };
    Criteria {
        min_accuracy: Some(min_accuracy),
        min_wpm: Some(min_wpm),
        time_limit_secs: None,
    }
}

/// Every tenth level closes a unit.
pub fn is_boss_level(level: u32) -> bool {
    (level + 1) % 10 == 0
}

impl Mode {
    /// Criteria implied by the mode alone.
    pub fn default_criteria(&self) -> Result<Criteria> {
        match self {
            Mode::Practice => Ok(Criteria::none()),
            Mode::Level { level } => Ok(level_criteria(*level)),
            Mode::Challenge { id } => Challenge::find(id).map(|c| c.criteria),
        }
    }
}
