//! Configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/returns-smoke/`
//! - macOS: `~/Library/Application Support/returns-smoke/`
//! - Windows: `%APPDATA%\returns-smoke\`

use std::path::PathBuf;

/// Application name used for the config directory
const APP_NAME: &str = "returns-smoke";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config.toml"));
            assert!(path.to_string_lossy().contains(APP_NAME));
        }
    }
}
