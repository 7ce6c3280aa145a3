//! Centralized path utilities

use std::path::PathBuf;

const CONFIG_DIR_NAME: &str = ".sparq";

/// Get the sparq config directory (~/.sparq)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Get the config file (~/.sparq/config.toml)
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
