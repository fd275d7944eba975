use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Report destinations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory receiving `results.csv` / `results.json`
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_true")]
    pub csv: bool,

    #[serde(default = "default_true")]
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            csv: true,
            json: true,
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("output")
}

fn default_true() -> bool {
    true
}
