//! Default on-disk locations for the config file and the history store.
//!
//! Everything lives under one per-user data directory
//! (`%APPDATA%\TextPin` on Windows, `~/.local/share/textpin` elsewhere,
//! falling back to `~/.textpin` when the platform dirs are unavailable).

use std::path::PathBuf;

/// Per-user data directory. Created on demand by the callers that write.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("textpin"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".textpin")))
        .unwrap_or_else(|| PathBuf::from(".textpin"))
}

pub fn default_config_path() -> PathBuf {
    data_dir().join("config.json")
}

pub fn default_history_path() -> PathBuf {
    data_dir().join("history.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_the_data_dir() {
        let dir = data_dir();
        assert_eq!(default_config_path().parent(), Some(dir.as_path()));
        assert_eq!(default_history_path().parent(), Some(dir.as_path()));
    }
}
