//! Configuration file management.
//!
//! Handles loading and creating TOML configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Quote Generator Configuration
# Auto-generated - edit as needed

[sync]
# Interval between server syncs in seconds (default: 30)
interval_secs = 30

# Whether periodic sync runs during an interactive session
enabled = true

[remote]
# Endpoint listing server quotes (each record's title becomes a quote)
fetch_url = "https://jsonplaceholder.typicode.com/posts?_limit=3"

# Endpoint new quotes are posted to
post_url = "https://jsonplaceholder.typicode.com/posts"

# Maximum number of server records to keep per fetch
max_items = 3

# Post each newly added quote to the server
publish_on_add = true

[export]
# Default export file name
file_name = "quotes.json"

[paths]
# Custom data directory (optional, defaults to ~/.quote-generator)
# data_dir = "/custom/path"
"#;

/// Load configuration from the given data directory or the default one.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config(data_dir: Option<&Path>) -> Result<AppConfig> {
    let dir = data_dir.map_or_else(AppConfig::default_data_dir, Path::to_path_buf);
    let config_path = dir.join("config.toml");

    let mut config = if config_path.exists() {
        load_config_from_file(&config_path)?
    } else {
        AppConfig::default()
    };

    // An explicit directory wins over whatever the file says.
    if let Some(dir) = data_dir {
        config.paths.data_dir = Some(dir.to_path_buf());
    }

    Ok(config)
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read, parsed, or holds out-of-range values.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })?;
    config.validate()?;

    Ok(config)
}

/// Create default configuration file if it doesn't exist.
///
/// Returns the config file path and whether it was newly created.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(config: &AppConfig) -> Result<(PathBuf, bool)> {
    let config_path = config.config_file_path();

    if config_path.exists() {
        return Ok((config_path, false));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok((config_path, true))
}
