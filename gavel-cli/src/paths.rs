//! XDG Base Directory paths for gavel.
//!
//! Follows XDG on every platform, like most CLI tools, rather than the
//! platform-native locations.

use std::path::PathBuf;

/// Get the gavel config directory.
///
/// Returns `$XDG_CONFIG_HOME/gavel` if set, otherwise `~/.config/gavel`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("gavel")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/gavel")
    } else {
        PathBuf::from(".config/gavel")
    }
}
