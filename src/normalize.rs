//! Canonical form for target text and committed input.
//!
//! Both sides of a comparison go through here so that a base letter followed
//! by a separately typed combining mark compares equal to its precomposed
//! form, and so that invisible line-break hints in authored text are never
//! expected from the typist.

use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// Zero width space, used by authors of scripts without visible word
/// separators to mark line-break opportunities.
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// An immutable sequence of code points in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText {
    chars: Vec<char>,
}

impl NormalizedText {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl From<&str> for NormalizedText {
    fn from(text: &str) -> Self {
        normalize(text)
    }
}

/// Strip zero width spaces, apply NFC, and collapse whitespace runs to a
/// single ASCII space.
pub fn normalize(text: &str) -> NormalizedText {
    let mut chars = Vec::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in normalize_fragment(text).chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                chars.push(' ');
            }
            in_whitespace = true;
        } else {
            chars.push(c);
            in_whitespace = false;
        }
    }

    NormalizedText { chars }
}

/// Canonicalize a piece of committed input without touching whitespace.
///
/// Whitespace is left alone because a fragment may legitimately be a single
/// newline or space that the target expects verbatim.
pub fn normalize_fragment(text: &str) -> String {
    text.chars()
        .filter(|&c| c != ZERO_WIDTH_SPACE)
        .nfc()
        .collect()
}
