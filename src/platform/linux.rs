// TaskaDeck platform paths for Linux
// Config: ~/.config/taskadeck
// Data:   ~/.local/share/taskadeck

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the configuration directory for TaskaDeck on Linux.
/// Uses `$XDG_CONFIG_HOME/taskadeck` if set, otherwise `~/.config/taskadeck`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("taskadeck"),
        _ => home_dir().join(".config").join("taskadeck"),
    }
}

/// Returns the data directory for TaskaDeck on Linux.
/// Uses `$XDG_DATA_HOME/taskadeck` if set, otherwise `~/.local/share/taskadeck`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("taskadeck"),
        _ => home_dir().join(".local").join("share").join("taskadeck"),
    }
}
