// TaskaDeck platform paths for macOS
// Config and data: ~/Library/Application Support/TaskaDeck

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

fn application_support() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join("TaskaDeck")
}

/// `~/Library/Application Support/TaskaDeck`
pub fn get_config_dir() -> PathBuf {
    application_support()
}

/// `~/Library/Application Support/TaskaDeck`
pub fn get_data_dir() -> PathBuf {
    application_support()
}
