use serde::{Deserialize, Serialize};

use crate::io::task_file::FileOptions;
use crate::model::task::{DEFAULT_COLUMN_GAP, DisplayContext};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Task file used when none is given on the command line
    #[serde(default = "default_file")]
    pub file: String,
    /// Task files start with a header line that must be skipped
    #[serde(default)]
    pub legacy_header: bool,
    /// Keep failed loads, failed saves and removed tasks in the recovery log
    #[serde(default = "default_true")]
    pub recovery_log: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            file: default_file(),
            legacy_header: false,
            recovery_log: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Spaces between display columns
    #[serde(default = "default_column_gap")]
    pub column_gap: usize,
    /// List the latest deadline first
    #[serde(default)]
    pub newest_first: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            column_gap: DEFAULT_COLUMN_GAP,
            newest_first: false,
        }
    }
}

fn default_file() -> String {
    "tasks.csv".to_string()
}

fn default_true() -> bool {
    true
}

fn default_column_gap() -> usize {
    DEFAULT_COLUMN_GAP
}

impl Config {
    pub fn file_options(&self) -> FileOptions {
        FileOptions {
            skip_header: self.storage.legacy_header,
            recovery_log: self.storage.recovery_log,
        }
    }

    pub fn display_context(&self) -> DisplayContext {
        DisplayContext::with_column_gap(self.display.column_gap)
    }
}
