//! Turns platform input notifications into one ordered stream of
//! [`InputEvent`]s.
//!
//! Two delivery paths reach us. Direct input reports the full value of the
//! host's input surface after every change, so new characters are the suffix
//! past what we have already emitted. Input-method composition wraps a burst
//! of raw changes between a start and an end event; nothing may be emitted
//! until the end event, at which point the committed text is flushed once.

use tracing::debug;

use crate::normalize::{normalize_fragment, ZERO_WIDTH_SPACE};
use crate::platform::{Script, Strategy};

/// Above this many buffered characters the surface is drained without
/// emitting, so a host that never clears cannot grow the buffer forever.
pub const SAFETY_FLUSH_LEN: usize = 100;

/// Atomic unit consumed by the typing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Character(char),
    Backspace,
}

/// Keys translated without going through composition diffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKey {
    Backspace,
    Space,
    Enter,
}

/// A notification from the host's input capture element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    CompositionStart,
    /// The surface now holds `value`.
    Input { value: String },
    /// `data` is the committed text when the platform provides it.
    CompositionEnd { data: Option<String> },
    /// `modifier` is true while Shift (or an equivalent) is held.
    Key { key: SpecialKey, modifier: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionState {
    Idle,
    Composing,
}

/// Output of one reconciliation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub events: Vec<InputEvent>,
    /// The host must empty its input surface before the next notification.
    pub clear_surface: bool,
}

impl Reconciled {
    fn none() -> Self {
        Self::default()
    }

    fn cleared(events: Vec<InputEvent>) -> Self {
        Self {
            events,
            clear_surface: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    script: Script,
    strategy: Strategy,
    state: CompositionState,
    buffer: String,
    committed_len: usize,
}

impl Reconciler {
    pub fn new(script: Script, strategy: Strategy) -> Self {
        Self {
            script,
            strategy,
            state: CompositionState::Idle,
            buffer: String::new(),
            committed_len: 0,
        }
    }

    pub fn state(&self) -> CompositionState {
        self.state
    }

    pub fn is_composing(&self) -> bool {
        self.state == CompositionState::Composing
    }

    /// Current pending text as last reported by the host.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Number of buffered code points already emitted as events.
    pub fn committed_len(&self) -> usize {
        self.committed_len
    }

    pub fn script(&self) -> Script {
        self.script
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn handle(&mut self, event: RawEvent) -> Reconciled {
        match event {
            RawEvent::CompositionStart => {
                self.composition_start();
                Reconciled::none()
            }
            RawEvent::Input { value } => self.input(value),
            RawEvent::CompositionEnd { data } => self.composition_end(data),
            RawEvent::Key { key, modifier } => self.key(key, modifier),
        }
    }

    /// Drop all pending text and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = CompositionState::Idle;
        self.buffer.clear();
        self.committed_len = 0;
    }

    fn composition_start(&mut self) {
        if self.is_composing() {
            debug!("composition start while already composing");
            return;
        }
        self.state = CompositionState::Composing;
    }

    fn input(&mut self, value: String) -> Reconciled {
        if self.is_composing() {
            self.buffer = value;
            return Reconciled::none();
        }

        let new_len = value.chars().count();
        let events: Vec<InputEvent> = if new_len > self.committed_len {
            value
                .chars()
                .skip(self.committed_len)
                .map(InputEvent::Character)
                .collect()
        } else {
            Vec::new()
        };

        self.committed_len = new_len;
        self.buffer = value;

        if new_len > SAFETY_FLUSH_LEN {
            debug!(len = new_len, "input buffer over safety bound, draining");
            self.buffer.clear();
            self.committed_len = 0;
            return Reconciled::cleared(events);
        }

        Reconciled {
            events,
            clear_surface: false,
        }
    }

    fn composition_end(&mut self, data: Option<String>) -> Reconciled {
        if !self.is_composing() {
            debug!("composition end without start, ignoring");
            return Reconciled::none();
        }
        self.state = CompositionState::Idle;

        let committed = match data.filter(|d| !d.is_empty()) {
            Some(data) => data,
            None => self.buffer.chars().skip(self.committed_len).collect(),
        };
        let committed = normalize_fragment(&committed);

        self.buffer.clear();
        self.committed_len = 0;

        Reconciled::cleared(committed.chars().map(InputEvent::Character).collect())
    }

    fn key(&mut self, key: SpecialKey, modifier: bool) -> Reconciled {
        if self.is_composing() {
            // the input method owns editing keys until it commits
            return Reconciled::none();
        }

        let event = match key {
            SpecialKey::Backspace => InputEvent::Backspace,
            SpecialKey::Space => InputEvent::Character(self.space_char(modifier)),
            SpecialKey::Enter => InputEvent::Character('\n'),
        };

        self.buffer.clear();
        self.committed_len = 0;
        Reconciled::cleared(vec![event])
    }

    fn space_char(&self, modifier: bool) -> char {
        if self.script.has_visible_word_separators() || modifier {
            ' '
        } else {
            ZERO_WIDTH_SPACE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn chars(events: &[InputEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Character(c) => Some(*c),
                InputEvent::Backspace => None,
            })
            .collect()
    }

    fn input(value: &str) -> RawEvent {
        RawEvent::Input {
            value: value.to_string(),
        }
    }

    fn khmer_linux() -> Reconciler {
        Reconciler::new(
            Script::Khmer,
            Strategy::select(Some(Platform::Linux), Script::Khmer),
        )
    }

    #[test]
    fn direct_input_emits_suffix() {
        let mut r = Reconciler::new(Script::English, Strategy::Direct);

        let step = r.handle(input("c"));
        assert_eq!(step.events, vec![InputEvent::Character('c')]);
        assert!(!step.clear_surface);

        let step = r.handle(input("cat"));
        assert_eq!(chars(&step.events), "at");
        assert_eq!(r.committed_len(), 3);
    }

    #[test]
    fn unchanged_or_shorter_value_emits_nothing() {
        let mut r = Reconciler::new(Script::English, Strategy::Direct);
        r.handle(input("ab"));

        assert!(r.handle(input("ab")).events.is_empty());
        assert!(r.handle(input("a")).events.is_empty());
        assert_eq!(r.committed_len(), 1);

        assert_eq!(chars(&r.handle(input("ax")).events), "x");
    }

    #[test]
    fn composing_suppresses_emission_until_end() {
        let mut r = khmer_linux();

        r.handle(RawEvent::CompositionStart);
        assert!(r.is_composing());
        assert!(r.handle(input("ក")).events.is_empty());
        assert!(r.handle(input("កា")).events.is_empty());

        let step = r.handle(RawEvent::CompositionEnd {
            data: Some("កា".to_string()),
        });
        assert_eq!(chars(&step.events), "កា");
        assert!(step.clear_surface);
        assert_eq!(r.state(), CompositionState::Idle);
        assert_eq!(r.committed_len(), 0);
        assert!(r.buffer().is_empty());
    }

    #[test]
    fn empty_end_payload_falls_back_to_buffer() {
        let mut r = khmer_linux();

        r.handle(RawEvent::CompositionStart);
        r.handle(input("a"));
        r.handle(input("ab"));
        let step = r.handle(RawEvent::CompositionEnd {
            data: Some(String::new()),
        });

        assert_eq!(
            step.events,
            vec![InputEvent::Character('a'), InputEvent::Character('b')]
        );
        assert_eq!(r.committed_len(), 0);
    }

    #[test]
    fn fallback_skips_text_committed_before_composition() {
        let mut r = khmer_linux();

        assert_eq!(chars(&r.handle(input("x")).events), "x");
        r.handle(RawEvent::CompositionStart);
        r.handle(input("xក"));
        let step = r.handle(RawEvent::CompositionEnd { data: None });

        assert_eq!(chars(&step.events), "ក");
    }

    #[test]
    fn composed_text_is_canonicalized() {
        let mut r = Reconciler::new(Script::English, Strategy::Direct);
        r.handle(RawEvent::CompositionStart);
        let step = r.handle(RawEvent::CompositionEnd {
            data: Some("e\u{0301}\u{200B}".to_string()),
        });
        assert_eq!(step.events, vec![InputEvent::Character('\u{00E9}')]);
    }

    #[test]
    fn end_without_start_is_ignored() {
        let mut r = khmer_linux();
        r.handle(input("ab"));

        let step = r.handle(RawEvent::CompositionEnd {
            data: Some("zz".to_string()),
        });
        assert_eq!(step, Reconciled::default());
        assert_eq!(r.committed_len(), 2);
    }

    #[test]
    fn double_end_emits_once() {
        let mut r = khmer_linux();
        r.handle(RawEvent::CompositionStart);
        let first = r.handle(RawEvent::CompositionEnd {
            data: Some("ក".to_string()),
        });
        let second = r.handle(RawEvent::CompositionEnd {
            data: Some("ក".to_string()),
        });

        assert_eq!(first.events.len(), 1);
        assert!(second.events.is_empty());
    }

    #[test]
    fn same_character_typed_after_composition_is_kept() {
        for strategy in [Strategy::CompositionAware, Strategy::Direct] {
            let mut r = Reconciler::new(Script::Khmer, strategy);
            r.handle(RawEvent::CompositionStart);
            let commit = r.handle(RawEvent::CompositionEnd {
                data: Some("ក".to_string()),
            });
            assert!(commit.clear_surface);

            // surface was cleared, so the direct keystroke reports just "ក"
            assert_eq!(chars(&r.handle(input("ក")).events), "ក", "{strategy:?}");
        }
    }

    #[test]
    fn emitted_characters_match_committed_text() {
        use crate::compose::RawEvent::{CompositionEnd, CompositionStart};

        fn end(data: &str) -> RawEvent {
            CompositionEnd {
                data: Some(data.to_string()),
            }
        }

        // (events, text the user committed); the host clears its surface
        // whenever a step asks it to, so inputs restart from empty then
        let cases: Vec<(Vec<RawEvent>, &str)> = vec![
            (
                vec![CompositionStart, input("ក"), end("ក"), input("ក")],
                "កក",
            ),
            (
                vec![
                    input("ក"),
                    CompositionStart,
                    input("កក"),
                    end("ក"),
                    input("ក"),
                    input("កក"),
                ],
                "កកកក",
            ),
            (
                vec![
                    CompositionStart,
                    input("ក"),
                    end("ក"),
                    CompositionStart,
                    input("ក"),
                    end("ក"),
                ],
                "កក",
            ),
            (
                vec![
                    input("a"),
                    input("ab"),
                    CompositionStart,
                    input("abc"),
                    CompositionEnd { data: None },
                    input("c"),
                ],
                "abcc",
            ),
            (
                vec![
                    CompositionStart,
                    input("x"),
                    input("xy"),
                    CompositionEnd {
                        data: Some(String::new()),
                    },
                    input("x"),
                    input("xy"),
                ],
                "xyxy",
            ),
            (
                vec![CompositionEnd { data: None }, input("a"), input("aa")],
                "aa",
            ),
        ];

        for strategy in [Strategy::CompositionAware, Strategy::Direct] {
            for (events, committed) in &cases {
                let mut r = Reconciler::new(Script::Khmer, strategy);
                let mut emitted = Vec::new();
                for event in events {
                    emitted.extend(r.handle(event.clone()).events);
                }
                assert_eq!(chars(&emitted), *committed, "{strategy:?} {events:?}");
                assert_eq!(
                    emitted.len(),
                    committed.chars().count(),
                    "{strategy:?} {events:?}"
                );
            }
        }
    }

    #[test]
    fn backspace_resets_buffer() {
        let mut r = Reconciler::new(Script::English, Strategy::Direct);
        r.handle(input("abc"));

        let step = r.handle(RawEvent::Key {
            key: SpecialKey::Backspace,
            modifier: false,
        });
        assert_eq!(step.events, vec![InputEvent::Backspace]);
        assert!(step.clear_surface);
        assert_eq!(r.committed_len(), 0);
        assert!(r.buffer().is_empty());
    }

    #[test]
    fn space_depends_on_script_and_modifier() {
        let space = RawEvent::Key {
            key: SpecialKey::Space,
            modifier: false,
        };
        let shift_space = RawEvent::Key {
            key: SpecialKey::Space,
            modifier: true,
        };

        let mut en = Reconciler::new(Script::English, Strategy::Direct);
        assert_eq!(en.handle(space.clone()).events, vec![InputEvent::Character(' ')]);

        let mut km = khmer_linux();
        assert_eq!(
            km.handle(space).events,
            vec![InputEvent::Character(ZERO_WIDTH_SPACE)]
        );
        assert_eq!(
            km.handle(shift_space).events,
            vec![InputEvent::Character(' ')]
        );
    }

    #[test]
    fn enter_emits_newline() {
        let mut r = Reconciler::new(Script::English, Strategy::Direct);
        let step = r.handle(RawEvent::Key {
            key: SpecialKey::Enter,
            modifier: false,
        });
        assert_eq!(step.events, vec![InputEvent::Character('\n')]);
    }

    #[test]
    fn special_keys_are_left_to_the_input_method_while_composing() {
        let mut r = khmer_linux();
        r.handle(RawEvent::CompositionStart);
        r.handle(input("ក"));

        let step = r.handle(RawEvent::Key {
            key: SpecialKey::Backspace,
            modifier: false,
        });
        assert!(step.events.is_empty());
        assert!(r.is_composing());
        assert_eq!(r.buffer(), "ក");
    }

    #[test]
    fn safety_flush_drains_long_buffer() {
        let mut r = Reconciler::new(Script::English, Strategy::Direct);
        let long = "a".repeat(SAFETY_FLUSH_LEN);
        assert_eq!(r.handle(input(&long)).events.len(), SAFETY_FLUSH_LEN);
        assert_eq!(r.committed_len(), SAFETY_FLUSH_LEN);

        let longer = format!("{long}b");
        let step = r.handle(input(&longer));
        assert_eq!(step.events, vec![InputEvent::Character('b')]);
        assert!(step.clear_surface);
        assert_eq!(r.committed_len(), 0);
        assert!(r.buffer().is_empty());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut r = khmer_linux();
        r.handle(RawEvent::CompositionStart);
        r.handle(input("កា"));

        r.reset();
        assert_eq!(r.state(), CompositionState::Idle);
        assert!(r.buffer().is_empty());
        assert_eq!(r.committed_len(), 0);

        // a stale end after reset emits nothing
        assert!(r
            .handle(RawEvent::CompositionEnd { data: None })
            .events
            .is_empty());
    }
}
