use serde::Serialize;

/// Live wpm sampled on a stats tick, `t` seconds into the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WpmSample {
    pub t: f64,
    pub wpm: u32,
}

impl WpmSample {
    pub fn new(t: f64, wpm: u32) -> Self {
        Self { t, wpm }
    }
}

impl From<WpmSample> for (f64, f64) {
    fn from(p: WpmSample) -> Self {
        (p.t, p.wpm as f64)
    }
}
