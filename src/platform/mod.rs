// TaskaDeck platform abstraction
// Provides platform-specific paths for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable that relocates the data directory (cookie partitions).
pub const DATA_DIR_ENV: &str = "TASKADECK_DATA_DIR";

/// Returns the platform-specific configuration directory for TaskaDeck.
///
/// - **Linux**: `~/.config/taskadeck` (or `$XDG_CONFIG_HOME/taskadeck`)
/// - **macOS**: `~/Library/Application Support/TaskaDeck`
/// - **Windows**: `%APPDATA%/TaskaDeck`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the data directory for TaskaDeck.
///
/// `$TASKADECK_DATA_DIR` wins when set; otherwise:
/// - **Linux**: `~/.local/share/taskadeck` (or `$XDG_DATA_HOME/taskadeck`)
/// - **macOS**: `~/Library/Application Support/TaskaDeck`
/// - **Windows**: `%APPDATA%/TaskaDeck`
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Directory containing the running executable, if it can be determined.
pub fn executable_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
}
