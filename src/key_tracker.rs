use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Physical keys currently held, for on-screen keyboard highlighting.
///
/// Fed from raw key signals alongside, never through, the reconciler.
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    pressed: HashSet<KeyCode>,
    shift: bool,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: KeyCode) {
        self.pressed.insert(code);
    }

    pub fn key_up(&mut self, code: KeyCode) {
        self.pressed.remove(&code);
    }

    pub fn set_shift(&mut self, held: bool) {
        self.shift = held;
    }

    /// Route a terminal key event by its kind.
    pub fn observe(&mut self, key: &KeyEvent) {
        self.set_shift(key.modifiers.contains(KeyModifiers::SHIFT));
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.key_down(key.code),
            KeyEventKind::Release => self.key_up(key.code),
        }
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    pub fn shift_active(&self) -> bool {
        self.shift
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
        self.shift = false;
    }
}
