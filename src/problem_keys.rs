use std::collections::HashMap;

use itertools::Itertools;

const MISS_WEIGHT: f64 = 1.0;
const HIT_DECAY: f64 = 0.8;
const FORGET_BELOW: f64 = 0.05;

/// Decaying error score per expected character.
///
/// Misses push a character's score up, hits let it fade, so the top of the
/// list tracks what the typist is currently struggling with rather than
/// lifetime miss counts.
#[derive(Debug, Clone, Default)]
pub struct ProblemKeys {
    scores: HashMap<char, f64>,
}

impl ProblemKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, expected: char, correct: bool) {
        if expected.is_whitespace() {
            return;
        }
        if correct {
            if let Some(score) = self.scores.get_mut(&expected) {
                *score *= HIT_DECAY;
                if *score < FORGET_BELOW {
                    self.scores.remove(&expected);
                }
            }
        } else {
            *self.scores.entry(expected).or_insert(0.0) += MISS_WEIGHT;
        }
    }

    pub fn score(&self, c: char) -> f64 {
        self.scores.get(&c).copied().unwrap_or(0.0)
    }

    /// Up to `n` characters, worst first.
    pub fn top(&self, n: usize) -> Vec<(char, f64)> {
        self.scores
            .iter()
            .map(|(&c, &s)| (c, s))
            .sorted_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)))
            .take(n)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
