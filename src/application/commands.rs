//! User-facing quote operations.
//!
//! Each operation returns the text to show, so the one-shot CLI and the
//! interactive session render the same output.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use tokio::sync::Mutex;

use crate::domain::{AppConfig, AppError, Result};
use crate::infrastructure::{HttpQuoteSource, LocalStorage, MemoryStore, QuoteSource};

use super::formatter::{
    format_categories, format_last_viewed, format_notification, format_quote, format_quotes,
    format_sync_report, OutputFormat, NO_QUOTES, NO_QUOTES_IN_CATEGORY,
};
use super::quote_store::QuoteStore;
use super::sync_service::SyncService;

/// Quote operations bound to one store, server and output format.
pub struct QuoteApp {
    service: Arc<SyncService>,
    config: AppConfig,
    format: OutputFormat,
}

impl QuoteApp {
    /// Open durable storage, start a fresh session and connect to the server.
    ///
    /// # Errors
    /// Returns error if local storage cannot be opened or read.
    pub fn open(config: AppConfig, format: OutputFormat) -> Result<Self> {
        let durable = LocalStorage::open(&config.storage_db_path())?;
        let store = QuoteStore::load(Box::new(durable), Box::new(MemoryStore::new()))?;
        let remote = Arc::new(HttpQuoteSource::new(&config.remote));

        Ok(Self::new(store, remote, config, format))
    }

    /// Build from already constructed parts.
    #[must_use]
    pub fn new(
        store: QuoteStore,
        remote: Arc<dyn QuoteSource>,
        config: AppConfig,
        format: OutputFormat,
    ) -> Self {
        let service = SyncService::new(Arc::new(Mutex::new(store)), remote);
        Self {
            service: Arc::new(service),
            config,
            format,
        }
    }

    /// The sync service, for starting periodic sync.
    #[must_use]
    pub const fn service(&self) -> &Arc<SyncService> {
        &self.service
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Show a random quote.
    ///
    /// # Errors
    /// Returns error if session storage fails.
    pub async fn random(&self) -> Result<String> {
        let picked = self.service.store().lock().await.pick_random()?;
        Ok(picked.as_ref().map_or_else(|| NO_QUOTES.to_string(), format_quote))
    }

    /// The last viewed quote if the session has one, otherwise a random one.
    ///
    /// # Errors
    /// Returns error if session storage fails.
    pub async fn last_or_random(&self) -> Result<String> {
        let last = self.service.store().lock().await.last_displayed()?;
        match last {
            Some(quote) => Ok(format_last_viewed(&quote)),
            None => self.random().await,
        }
    }

    /// Show the last viewed quote.
    ///
    /// # Errors
    /// Returns error if session storage fails.
    pub async fn last(&self) -> Result<String> {
        let last = self.service.store().lock().await.last_displayed()?;
        Ok(last.map_or_else(
            || "No quote viewed yet in this session.".to_string(),
            |q| format_last_viewed(&q),
        ))
    }

    /// Add a quote and, if configured, post it to the server.
    ///
    /// A failed post is reported in the output; the quote stays added.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for blank input, or a storage error.
    pub async fn add(&self, text: &str, category: &str) -> Result<String> {
        let added = {
            let mut store = self.service.store().lock().await;
            let quotes = store.add_quote(text, category)?;
            quotes.last().cloned()
        };

        let mut out = format!("{} Quote added successfully!", "✓".green().bold());

        if let Some(quote) = added.filter(|_| self.config.remote.publish_on_add) {
            let notice = match self.service.publish(&quote).await {
                Ok(()) => "New quote synced with server.".to_string(),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to post quote");
                    format!("Error posting quote to server: {e}")
                }
            };
            let _ = write!(out, "\n{}", format_notification(&notice));
        }

        Ok(out)
    }

    /// List the whole collection.
    ///
    /// # Errors
    /// Returns error if JSON formatting fails.
    pub async fn list(&self) -> Result<String> {
        let store = self.service.store().lock().await;
        format_quotes(store.quotes(), self.format, NO_QUOTES).map_err(AppError::json_parse)
    }

    /// Filter by category (or `"all"`) and remember the selection.
    ///
    /// # Errors
    /// Returns error if the selection cannot be persisted.
    pub async fn filter(&self, category: &str) -> Result<String> {
        let matches = self
            .service
            .store()
            .lock()
            .await
            .filter_by_category(category)?;
        format_quotes(&matches, self.format, NO_QUOTES_IN_CATEGORY).map_err(AppError::json_parse)
    }

    /// List distinct categories with the current selection marked.
    ///
    /// # Errors
    /// Returns error if storage cannot be read.
    pub async fn categories(&self) -> Result<String> {
        let store = self.service.store().lock().await;
        let selected = store.selected_category()?;
        Ok(format_categories(&store.categories(), selected.as_ref()))
    }

    /// Write the collection to `path`, or the configured file name.
    ///
    /// # Errors
    /// Returns error if serialization or the file write fails.
    pub async fn export(&self, path: Option<&Path>) -> Result<String> {
        let path = path.map_or_else(
            || PathBuf::from(&self.config.export.file_name),
            Path::to_path_buf,
        );

        let (json, count) = {
            let store = self.service.store().lock().await;
            (store.export_json()?, store.len())
        };

        std::fs::write(&path, json)
            .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

        tracing::info!(path = %path.display(), count, "Exported quotes");

        Ok(format!(
            "{} Exported {count} quotes to {}",
            "✓".green().bold(),
            path.display()
        ))
    }

    /// Append quotes from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not a JSON array.
    pub async fn import(&self, path: &Path) -> Result<String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;

        let count = self.service.store().lock().await.import_json(&raw)?;

        Ok(format!(
            "{} Quotes imported successfully! ({count} added)",
            "✓".green().bold()
        ))
    }

    /// Run one sync cycle now.
    ///
    /// # Errors
    /// Returns error if applying server data to storage fails.
    pub async fn sync(&self) -> Result<String> {
        let report = self.service.sync_once().await?;
        Ok(format_sync_report(&report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::application::quote_store::QUOTES_KEY;
    use crate::domain::Quote;

    struct OfflineSource;

    #[async_trait]
    impl QuoteSource for OfflineSource {
        async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
            Err(AppError::Network {
                message: "offline".into(),
                source: None,
            })
        }

        async fn post_quote(&self, _quote: &Quote) -> Result<()> {
            Err(AppError::Network {
                message: "offline".into(),
                source: None,
            })
        }
    }

    fn app_with(quotes: &[Quote], format: OutputFormat) -> QuoteApp {
        let store = QuoteStore::load(
            Box::new(MemoryStore::with_entry(
                QUOTES_KEY,
                serde_json::to_string(quotes).unwrap(),
            )),
            Box::new(MemoryStore::new()),
        )
        .unwrap();
        QuoteApp::new(store, Arc::new(OfflineSource), AppConfig::default(), format)
    }

    fn scenario() -> Vec<Quote> {
        vec![
            Quote::new("Life is short", "Life").unwrap(),
            Quote::new("Stay hungry", "Motivation").unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_random_on_empty_collection() {
        let app = app_with(&[], OutputFormat::Text);
        assert_eq!(app.random().await.unwrap(), NO_QUOTES);
    }

    #[tokio::test]
    async fn test_last_or_random_prefers_session_quote() {
        let app = app_with(&scenario(), OutputFormat::Text);
        assert!(app.last().await.unwrap().starts_with("No quote viewed"));

        app.random().await.unwrap();
        assert!(app.last_or_random().await.unwrap().contains("(Last Viewed)"));
    }

    #[tokio::test]
    async fn test_add_reports_failed_post_but_keeps_quote() {
        let app = app_with(&scenario(), OutputFormat::Text);

        let out = app.add("New one", "Life").await.unwrap();

        assert!(out.contains("Quote added successfully!"));
        assert!(out.contains("Error posting quote to server"));
        assert_eq!(app.service().store().lock().await.len(), 3);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_input() {
        let app = app_with(&scenario(), OutputFormat::Text);
        let err = app.add("  ", "Life").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_filter_unknown_category_shows_message() {
        let app = app_with(&scenario(), OutputFormat::Text);
        assert_eq!(app.filter("Unknown").await.unwrap(), NO_QUOTES_IN_CATEGORY);
    }

    #[tokio::test]
    async fn test_filter_json_output() {
        let app = app_with(&scenario(), OutputFormat::Json);
        let out = app.filter("Motivation").await.unwrap();
        let parsed: Vec<Quote> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec![Quote::new("Stay hungry", "Motivation").unwrap()]);
    }

    #[tokio::test]
    async fn test_export_then_import_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quotes.json");

        let source = app_with(&scenario(), OutputFormat::Text);
        source.export(Some(&path)).await.unwrap();

        let target = app_with(&[], OutputFormat::Text);
        let out = target.import(&path).await.unwrap();

        assert!(out.contains("2 added"));
        assert_eq!(
            target.service().store().lock().await.quotes(),
            scenario().as_slice()
        );
    }

    #[tokio::test]
    async fn test_import_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let app = app_with(&scenario(), OutputFormat::Text);
        let err = app.import(&dir.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[tokio::test]
    async fn test_sync_offline_keeps_quotes() {
        let app = app_with(&scenario(), OutputFormat::Text);
        let out = app.sync().await.unwrap();
        assert!(out.contains("Error fetching quotes from server"));
        assert_eq!(app.service().store().lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_open_seeds_storage() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.paths.data_dir = Some(dir.path().to_path_buf());

        let app = QuoteApp::open(config, OutputFormat::Table).unwrap();

        assert_eq!(app.service().store().lock().await.len(), 3);
        assert!(dir.path().join("quotes.db").exists());
    }
}
