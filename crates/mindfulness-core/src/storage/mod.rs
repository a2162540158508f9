mod config;

pub use config::{BreathingConfig, Config, UiConfig};

use std::path::PathBuf;

/// Returns `~/.config/mindfulness[-dev]/` based on MINDFULNESS_ENV.
///
/// Set MINDFULNESS_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MINDFULNESS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mindfulness-dev")
    } else {
        base_dir.join("mindfulness")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
