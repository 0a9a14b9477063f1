use std::time::Instant;

use tracing::debug;

use crate::compose::InputEvent;
use crate::criteria::Criteria;
use crate::session::{FinishReason, TypingSession};

/// What a single input event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct { position: usize, expected: char },
    Incorrect {
        position: usize,
        expected: char,
        actual: char,
    },
    Retreated { cursor: usize },
    /// The session was finished or the target had nothing left to match.
    Ignored,
}

impl Outcome {
    /// Per-character correctness for adaptive key tracking.
    pub fn key_signal(&self) -> Option<(char, bool)> {
        match *self {
            Outcome::Correct { expected, .. } => Some((expected, true)),
            Outcome::Incorrect { expected, .. } => Some((expected, false)),
            Outcome::Retreated { .. } | Outcome::Ignored => None,
        }
    }
}

/// Apply one event to `session`, stamping a session start with `now`.
pub fn apply(
    session: &mut TypingSession,
    event: InputEvent,
    criteria: &Criteria,
    now: Instant,
) -> Outcome {
    if session.is_finished() {
        return Outcome::Ignored;
    }

    match event {
        InputEvent::Character(c) => write(session, c, criteria, now),
        InputEvent::Backspace => {
            session.retreat();
            Outcome::Retreated {
                cursor: session.cursor(),
            }
        }
    }
}

fn write(session: &mut TypingSession, c: char, criteria: &Criteria, now: Instant) -> Outcome {
    let position = session.cursor();
    let Some(expected) = session.expected_char() else {
        debug!(position, "no expected character at cursor");
        return Outcome::Ignored;
    };

    if c == expected {
        session.advance(now);
        if session.cursor() == session.target().len() {
            session.finish(FinishReason::Completed);
        }
        Outcome::Correct { position, expected }
    } else {
        session.record_error();
        if criteria.instant_fail_on_error() {
            session.finish(FinishReason::ForcedFailure);
        }
        Outcome::Incorrect {
            position,
            expected,
            actual: c,
        }
    }
}
