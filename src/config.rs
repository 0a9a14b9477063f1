use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::platform::{Platform, Script};
use crate::round::RoundConfig;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub script: Script,
    /// Overrides platform detection when set.
    pub platform: Option<Platform>,
    pub stats_tick_ms: u64,
    pub redraw_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script: Script::English,
            platform: None,
            stats_tick_ms: 500,
            redraw_ms: 100,
        }
    }
}

impl Config {
    pub fn round_config(&self) -> RoundConfig {
        RoundConfig {
            script: self.script,
            platform: Some(self.platform.unwrap_or_else(Platform::detect)),
            tick_interval: Duration::from_millis(self.stats_tick_ms.max(1)),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = crate::app_dirs::AppDirs::config_path()
            .unwrap_or_else(|| PathBuf::from("typemaster_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Where the project directories live, if the platform has them.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "typemaster")
}
