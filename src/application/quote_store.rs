//! The quote store.
//!
//! Owns the in-memory collection and mirrors it into durable storage on
//! every mutation. Selection state lives beside it: the selected category
//! in durable storage, the last displayed quote in session storage. Neither
//! is kept consistent with the collection.

use rand::Rng;

use crate::domain::{
    default_quotes, distinct_categories, reconcile, AppError, CategoryFilter, Quote, Result,
    SyncOutcome,
};
use crate::infrastructure::KeyValueStore;

/// Durable key holding the JSON array of quotes.
pub const QUOTES_KEY: &str = "quotes";

/// Durable key holding the last selected category (or `"all"`).
pub const SELECTED_CATEGORY_KEY: &str = "selectedCategory";

/// Session key holding the last displayed quote as JSON.
pub const LAST_QUOTE_KEY: &str = "lastQuote";

/// Quote collection plus its storage.
///
/// Only obtainable through [`QuoteStore::load`], so every value is ready
/// for use.
pub struct QuoteStore {
    quotes: Vec<Quote>,
    durable: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
}

impl QuoteStore {
    /// Restore the collection from durable storage.
    ///
    /// Seeds and persists the sample quotes when nothing is stored. A stored
    /// value that does not parse is logged and replaced in memory by the
    /// samples; it is left on disk until the next write.
    ///
    /// # Errors
    /// Returns error only if the storage itself cannot be read or written.
    pub fn load(
        durable: Box<dyn KeyValueStore>,
        session: Box<dyn KeyValueStore>,
    ) -> Result<Self> {
        let mut store = Self {
            quotes: Vec::new(),
            durable,
            session,
        };

        match store.durable.get(QUOTES_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<Quote>>(&raw) {
                Ok(quotes) => {
                    tracing::debug!(count = quotes.len(), "Loaded quotes from storage");
                    store.quotes = quotes;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Stored quotes are malformed, using sample quotes");
                    store.quotes = default_quotes();
                }
            },
            None => {
                tracing::info!("No stored quotes, seeding sample quotes");
                store.quotes = default_quotes();
                store.save()?;
            }
        }

        Ok(store)
    }

    /// Write the whole collection to durable storage.
    ///
    /// # Errors
    /// Returns error if serialization or the storage write fails.
    pub fn save(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.quotes).map_err(AppError::json_parse)?;
        self.durable.set(QUOTES_KEY, &raw)
    }

    /// Persist `candidate` and only then make it the current collection.
    fn commit(&mut self, candidate: Vec<Quote>) -> Result<()> {
        let raw = serde_json::to_string(&candidate).map_err(AppError::json_parse)?;
        self.durable.set(QUOTES_KEY, &raw)?;
        self.quotes = candidate;
        Ok(())
    }

    /// Current collection in insertion order.
    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Number of quotes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        distinct_categories(&self.quotes)
    }

    /// Validate, append and persist a new quote.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for blank input, or a storage error if
    /// persisting fails. Nothing changes in either case.
    pub fn add_quote(&mut self, text: &str, category: &str) -> Result<&[Quote]> {
        let quote = Quote::new(text, category)?;

        tracing::info!(category = %quote.category, "Adding quote");

        let mut candidate = self.quotes.clone();
        candidate.push(quote);
        self.commit(candidate)?;

        Ok(&self.quotes)
    }

    /// Quotes in `category`, or all of them for `"all"`.
    ///
    /// The selection is persisted whether or not anything matches.
    ///
    /// # Errors
    /// Returns error if the selection cannot be persisted.
    pub fn filter_by_category(&mut self, category: &str) -> Result<Vec<Quote>> {
        let filter = CategoryFilter::from(category);
        self.durable
            .set(SELECTED_CATEGORY_KEY, &filter.to_string())?;

        let matches = filter.apply(&self.quotes);
        tracing::debug!(%filter, matches = matches.len(), "Filtered quotes");

        Ok(matches)
    }

    /// The persisted category selection, if any.
    ///
    /// # Errors
    /// Returns error if storage cannot be read.
    pub fn selected_category(&self) -> Result<Option<CategoryFilter>> {
        Ok(self
            .durable
            .get(SELECTED_CATEGORY_KEY)?
            .map(|raw| CategoryFilter::from(raw.as_str())))
    }

    /// Pick a uniformly random quote and remember it for this session.
    ///
    /// Returns `None` when the collection is empty.
    ///
    /// # Errors
    /// Returns error if the pick cannot be stored in session storage.
    pub fn pick_random(&mut self) -> Result<Option<Quote>> {
        self.pick_random_with(&mut rand::rng())
    }

    /// [`pick_random`](Self::pick_random) with an explicit generator.
    ///
    /// # Errors
    /// Returns error if the pick cannot be stored in session storage.
    pub fn pick_random_with<R: Rng>(&mut self, rng: &mut R) -> Result<Option<Quote>> {
        if self.is_empty() {
            return Ok(None);
        }

        let index = rng.random_range(0..self.quotes.len());
        let quote = self.quotes[index].clone();

        let raw = serde_json::to_string(&quote).map_err(AppError::json_parse)?;
        self.session.set(LAST_QUOTE_KEY, &raw)?;

        Ok(Some(quote))
    }

    /// The quote last shown in this session.
    ///
    /// # Errors
    /// Returns error if session storage cannot be read.
    pub fn last_displayed(&self) -> Result<Option<Quote>> {
        let Some(raw) = self.session.get(LAST_QUOTE_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(quote) => Ok(Some(quote)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed last viewed quote");
                Ok(None)
            }
        }
    }

    /// Forget the last displayed quote.
    ///
    /// # Errors
    /// Returns error if session storage cannot be written.
    pub fn end_session(&mut self) -> Result<()> {
        self.session.remove(LAST_QUOTE_KEY)
    }

    /// Pretty-printed JSON array of the whole collection.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.quotes).map_err(AppError::json_parse)
    }

    /// Append every quote from a JSON array and persist.
    ///
    /// Entries are neither validated nor deduplicated. Returns how many were
    /// appended.
    ///
    /// # Errors
    /// Returns `AppError::JsonParse` for malformed JSON or array entries that
    /// are not objects, `AppError::InvalidFormat` when the document is not an
    /// array, or a storage error. The collection is untouched on any error.
    pub fn import_json(&mut self, raw: &str) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(AppError::json_parse)?;

        if !value.is_array() {
            return Err(AppError::InvalidFormat {
                message: "Expected an array of quotes.".to_string(),
            });
        }

        let imported: Vec<Quote> = serde_json::from_value(value).map_err(AppError::json_parse)?;
        let count = imported.len();

        let mut candidate = self.quotes.clone();
        candidate.extend(imported);
        self.commit(candidate)?;

        tracing::info!(count, total = self.quotes.len(), "Imported quotes");

        Ok(count)
    }

    /// Apply a server snapshot using the length-only rule.
    ///
    /// On replacement the snapshot is persisted and a fresh random quote is
    /// picked for display; that quote is returned alongside the outcome.
    ///
    /// # Errors
    /// Returns error if persisting the replacement fails, in which case the
    /// local collection is kept.
    pub fn sync_with_remote(
        &mut self,
        remote: Vec<Quote>,
    ) -> Result<(SyncOutcome, Option<Quote>)> {
        let outcome = reconcile(&self.quotes, remote);

        let displayed = if let SyncOutcome::Replaced(ref quotes) = outcome {
            tracing::info!(
                local = self.quotes.len(),
                remote = quotes.len(),
                "Server data differs, replacing local quotes"
            );
            self.commit(quotes.clone())?;
            self.pick_random()?
        } else {
            tracing::debug!(count = self.quotes.len(), "Local quotes match server count");
            None
        };

        Ok((outcome, displayed))
    }
}
