use std::time::Instant;

use crate::normalize::NormalizedText;

/// Why a session stopped accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum FinishReason {
    Completed,
    ForcedFailure,
    TimeExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Active,
    Finished(FinishReason),
}

/// Progress of one attempt at one target text.
#[derive(Debug, Clone)]
pub struct TypingSession {
    target: NormalizedText,
    cursor: usize,
    error_count: u32,
    combo_current: u32,
    combo_max: u32,
    chars_typed: u32,
    started_at: Option<Instant>,
    phase: Phase,
}

impl TypingSession {
    pub fn new(target: NormalizedText) -> Self {
        Self {
            target,
            cursor: 0,
            error_count: 0,
            combo_current: 0,
            combo_max: 0,
            chars_typed: 0,
            started_at: None,
            phase: Phase::NotStarted,
        }
    }

    pub fn target(&self) -> &NormalizedText {
        &self.target
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn combo_current(&self) -> u32 {
        self.combo_current
    }

    pub fn combo_max(&self) -> u32 {
        self.combo_max
    }

    pub fn chars_typed(&self) -> u32 {
        self.chars_typed
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        match self.phase {
            Phase::Finished(reason) => Some(reason),
            _ => None,
        }
    }

    /// Character the cursor is waiting for, if any.
    pub fn expected_char(&self) -> Option<char> {
        self.target.get(self.cursor)
    }

    /// Move to `Finished`. The first reason wins.
    pub fn finish(&mut self, reason: FinishReason) {
        if !self.is_finished() {
            self.phase = Phase::Finished(reason);
        }
    }

    pub(crate) fn advance(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
            self.phase = Phase::Active;
        }
        self.cursor += 1;
        self.chars_typed += 1;
        self.combo_current += 1;
        self.combo_max = self.combo_max.max(self.combo_current);
    }

    pub(crate) fn record_error(&mut self) {
        self.error_count += 1;
        self.combo_current = 0;
    }

    pub(crate) fn retreat(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.combo_current = 0;
    }
}
