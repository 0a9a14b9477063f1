use std::path::PathBuf;

use crate::config::project_dirs;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|pd| pd.config_dir().join("config.json"))
    }

    /// Log file under `$HOME/.local/state/typemaster`, or the platform's
    /// local data dir when `HOME` is unset.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("typemaster");
            Some(state_dir.join("typemaster.log"))
        } else {
            project_dirs().map(|pd| pd.data_local_dir().join("typemaster.log"))
        }
    }
}
