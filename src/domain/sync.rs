//! Sync-related domain models and configuration.
//!
//! Contains the conflict decision for server sync, the report handed to
//! the user after each sync cycle, and the application configuration.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};
use super::models::Quote;

/// Longest accepted sync interval (one day).
pub const MAX_SYNC_INTERVAL_SECS: u64 = 86_400;

/// Result of comparing the local collection with a server snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Counts matched; local data kept as is.
    Unchanged,
    /// Counts differed; the server snapshot replaces local data.
    Replaced(Vec<Quote>),
}

/// Length-only conflict resolution.
///
/// The server wins whenever the counts differ. Equal counts are treated as
/// "in sync" even if the contents differ, and local additions are dropped on
/// replacement.
#[must_use]
pub fn reconcile(local: &[Quote], remote: Vec<Quote>) -> SyncOutcome {
    if remote.len() == local.len() {
        SyncOutcome::Unchanged
    } else {
        SyncOutcome::Replaced(remote)
    }
}

/// Summary of one sync cycle.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// When the cycle finished.
    pub at: DateTime<Utc>,
    /// Number of quotes now held locally, if local data was replaced.
    pub replaced: Option<usize>,
    /// Fetch error message, if the server could not be reached.
    pub error: Option<String>,
    /// Quote picked for display after a replacement.
    pub displayed: Option<Quote>,
}

impl SyncReport {
    /// Report for a completed cycle.
    #[must_use]
    pub fn from_outcome(outcome: &SyncOutcome, displayed: Option<Quote>) -> Self {
        Self {
            at: Utc::now(),
            replaced: match outcome {
                SyncOutcome::Unchanged => None,
                SyncOutcome::Replaced(quotes) => Some(quotes.len()),
            },
            error: None,
            displayed,
        }
    }

    /// Report for a cycle that failed to reach the server.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            replaced: None,
            error: Some(error.into()),
            displayed: None,
        }
    }

    /// User-facing notification text.
    #[must_use]
    pub fn message(&self) -> String {
        match (&self.error, self.replaced) {
            (Some(err), _) => format!("Error fetching quotes from server: {err}"),
            (None, Some(_)) => "Local quotes updated from server (conflict resolved).".to_string(),
            (None, None) => "No new updates from server.".to_string(),
        }
    }
}

/// Configuration for periodic server sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval between sync cycles in seconds.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Whether periodic sync runs during an interactive session.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            enabled: default_enabled(),
        }
    }
}

const fn default_interval() -> u64 {
    30
}

const fn default_enabled() -> bool {
    true
}

/// Remote endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Collection listing endpoint (GET).
    #[serde(default = "default_fetch_url")]
    pub fetch_url: String,

    /// Endpoint new quotes are posted to (POST).
    #[serde(default = "default_post_url")]
    pub post_url: String,

    /// Maximum number of server records turned into quotes.
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Whether `add` also posts the new quote to the server.
    #[serde(default = "default_enabled")]
    pub publish_on_add: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            fetch_url: default_fetch_url(),
            post_url: default_post_url(),
            max_items: default_max_items(),
            publish_on_add: default_enabled(),
        }
    }
}

fn default_fetch_url() -> String {
    "https://jsonplaceholder.typicode.com/posts?_limit=3".to_string()
}

fn default_post_url() -> String {
    "https://jsonplaceholder.typicode.com/posts".to_string()
}

const fn default_max_items() -> usize {
    3
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name used when no output path is given.
    #[serde(default = "default_export_file")]
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file(),
        }
    }
}

fn default_export_file() -> String {
    "quotes.json".to_string()
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Periodic sync configuration.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Remote endpoint configuration.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Export configuration.
    #[serde(default)]
    pub export: ExportConfig,

    /// Path configuration.
    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quote-generator")
    }

    /// Get the durable storage database path.
    #[must_use]
    pub fn storage_db_path(&self) -> PathBuf {
        self.data_dir().join("quotes.db")
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }

    /// Check values serde cannot bound on its own.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the sync interval exceeds one day.
    pub fn validate(&self) -> Result<()> {
        if self.sync.interval_secs > MAX_SYNC_INTERVAL_SECS {
            return Err(AppError::Config {
                message: format!(
                    "sync.interval_secs must be at most {MAX_SYNC_INTERVAL_SECS}, got {}",
                    self.sync.interval_secs
                ),
            });
        }
        Ok(())
    }

    /// Sync interval as a duration.
    #[must_use]
    pub const fn sync_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sync.interval_secs)
    }
}
