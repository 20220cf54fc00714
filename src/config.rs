use std::path::PathBuf;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "ADHD_PLANNER_DIR";

const APP_DIR: &str = "adhd-planner";

pub struct Config {
    /// Directory holding one JSON file per storage key
    pub data_dir: PathBuf,
}

impl Config {
    /// An explicit directory wins; otherwise the platform data directory is used
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
        }
    }

    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
