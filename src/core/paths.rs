use std::path::PathBuf;
use std::sync::OnceLock;

static FABULA_HOME: OnceLock<PathBuf> = OnceLock::new();
static FABULA_CONFIG: OnceLock<PathBuf> = OnceLock::new();

/// Get the Fabula home directory
/// Checks FABULA_HOME environment variable, falls back to ~/.fabula
pub fn fabula_home() -> PathBuf {
    FABULA_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("FABULA_HOME") {
                PathBuf::from(path)
            } else {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".fabula")
            }
        })
        .clone()
}

/// Get the configuration file path
/// Checks FABULA_CONFIG environment variable, falls back to FABULA_HOME/config.toml
pub fn config_path() -> PathBuf {
    FABULA_CONFIG
        .get_or_init(|| {
            if let Ok(path) = std::env::var("FABULA_CONFIG") {
                PathBuf::from(path)
            } else {
                fabula_home().join("config.toml")
            }
        })
        .clone()
}

/// Default state directory for pipeline checkpoints
pub fn default_state_dir() -> PathBuf {
    fabula_home().join("state")
}
