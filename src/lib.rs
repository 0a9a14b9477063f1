// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod compose;
pub mod config;
pub mod criteria;
pub mod error;
pub mod evaluate;
pub mod key_tracker;
pub mod normalize;
pub mod platform;
pub mod problem_keys;
pub mod round;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod time_series;
pub mod typing_policy;

pub use error::{Error, Result};
