use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "eyelab").map(|pd| pd.config_dir().join("config.json"))
    }

    /// Directory for the log file and the response archive
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("eyelab"))
        } else {
            ProjectDirs::from("", "", "eyelab").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn archive_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("responses.csv"))
    }
}
