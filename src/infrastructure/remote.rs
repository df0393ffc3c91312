//! Remote quote endpoint.
//!
//! The server is a mock collection API: records carry a `title`, which
//! becomes the quote text, and every fetched quote lands in the
//! [`SERVER_CATEGORY`](crate::domain::SERVER_CATEGORY) category.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::sync::RemoteConfig;
use crate::domain::{AppError, Quote, Result};

/// Source of server-side quotes.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the server's current collection.
    async fn fetch_quotes(&self) -> Result<Vec<Quote>>;

    /// Send one new quote to the server.
    async fn post_quote(&self, quote: &Quote) -> Result<()>;
}

/// Raw record as returned by the listing endpoint.
#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    title: String,
}

/// HTTP implementation backed by `reqwest`.
pub struct HttpQuoteSource {
    client: reqwest::Client,
    fetch_url: String,
    post_url: String,
    max_items: usize,
}

impl HttpQuoteSource {
    /// Create a source from remote configuration.
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            fetch_url: config.fetch_url.clone(),
            post_url: config.post_url.clone(),
            max_items: config.max_items,
        }
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
        tracing::debug!(url = %self.fetch_url, "Fetching quotes from server");

        let response = self
            .client
            .get(&self.fetch_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AppError::network("Failed to fetch quotes", e))?;

        let posts: Vec<RawPost> = response
            .json()
            .await
            .map_err(|e| AppError::network("Failed to decode server quotes", e))?;

        let quotes: Vec<Quote> = posts
            .into_iter()
            .take(self.max_items)
            .map(|post| Quote::from_server(post.title))
            .collect();

        tracing::debug!(count = quotes.len(), "Fetched server quotes");

        Ok(quotes)
    }

    async fn post_quote(&self, quote: &Quote) -> Result<()> {
        let response = self
            .client
            .post(&self.post_url)
            .json(quote)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AppError::network("Failed to post quote", e))?;

        // Only completion matters; the echoed body is discarded.
        if let Err(e) = response.bytes().await {
            tracing::debug!(error = %e, "Ignoring unreadable post response body");
        }

        tracing::info!(category = %quote.category, "Quote posted to server");

        Ok(())
    }
}
