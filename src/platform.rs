use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Writing system of the text being practiced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    English,
    Khmer,
}

impl Script {
    /// Whether words are separated by a visible space character.
    pub fn has_visible_word_separators(&self) -> bool {
        match self {
            Script::English => true,
            Script::Khmer => false,
        }
    }
}

/// Operating system family delivering the raw input events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Web,
}

impl Platform {
    /// Platform of the running binary. Unknown targets report `Web`.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" | "freebsd" | "openbsd" | "netbsd" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Web,
        }
    }
}

/// Which input path the platform is expected to use for a script.
///
/// The reconciler honours composition boundaries under either strategy, so
/// a wrong guess never loses or duplicates text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Keystrokes arrive as committed text.
    Direct,
    /// An input method composes characters before committing them.
    CompositionAware,
}

impl Strategy {
    pub fn select(platform: Option<Platform>, script: Script) -> Self {
        match (platform, script) {
            (None, _) => Strategy::CompositionAware,
            (Some(Platform::Linux | Platform::Web), Script::Khmer) => Strategy::CompositionAware,
            _ => Strategy::Direct,
        }
    }
}
