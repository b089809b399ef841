pub mod app;

pub use app::*;

use std::path::PathBuf;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CLIPWISE_CONFIG";

/// Returns the global config directory path: `~/.config/clipwise/`
pub fn dirs_global() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("clipwise")
}

/// Config file location: `$CLIPWISE_CONFIG`, else `~/.config/clipwise/config.yml`.
pub fn config_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => dirs_global().join("config.yml"),
    }
}
