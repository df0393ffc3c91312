//! Domain models for quotes.
//!
//! A quote is a plain text/category pair. There is no identity field,
//! so duplicates are allowed everywhere.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};

/// Category assigned to every quote fetched from the server.
pub const SERVER_CATEGORY: &str = "Server";

/// Sentinel used by the category selector for "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// A single quote.
///
/// Fields default to empty strings so imported or server-provided records
/// with missing fields still deserialize; only [`Quote::new`] validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The quote itself.
    #[serde(default)]
    pub text: String,
    /// Free-form category name.
    #[serde(default)]
    pub category: String,
}

impl Quote {
    /// Create a validated quote from user input.
    ///
    /// Both fields are trimmed.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if either field is empty after trimming.
    pub fn new(text: &str, category: &str) -> Result<Self> {
        let text = text.trim();
        let category = category.trim();

        if text.is_empty() || category.is_empty() {
            return Err(AppError::validation(
                "Please enter both a quote and a category.",
            ));
        }

        Ok(Self {
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Build a quote from a server record title.
    #[must_use]
    pub fn from_server(title: impl Into<String>) -> Self {
        Self {
            text: title.into(),
            category: SERVER_CATEGORY.to_string(),
        }
    }
}

/// The three sample quotes used when storage holds no collection yet.
#[must_use]
pub fn default_quotes() -> Vec<Quote> {
    [
        (
            "The only limit to our realization of tomorrow is our doubts of today.",
            "Motivation",
        ),
        (
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
        (
            "To be yourself in a world that is constantly trying to make you something else is the greatest accomplishment.",
            "Individuality",
        ),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn distinct_categories(quotes: &[Quote]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for quote in quotes {
        if !categories.iter().any(|c| c == &quote.category) {
            categories.push(quote.category.clone());
        }
    }
    categories
}

/// Category selection: everything, or one exact category name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No filtering.
    #[default]
    All,
    /// Exact (case-sensitive) category match.
    Named(String),
}

impl CategoryFilter {
    /// Whether a quote passes this filter.
    #[must_use]
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Named(category) => quote.category == *category,
        }
    }

    /// Apply the filter, cloning matching quotes in order.
    #[must_use]
    pub fn apply(&self, quotes: &[Quote]) -> Vec<Quote> {
        quotes.iter().filter(|q| self.matches(q)).cloned().collect()
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_CATEGORIES}"),
            Self::Named(category) => write!(f, "{category}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(text: &str, category: &str) -> Quote {
        Quote {
            text: text.into(),
            category: category.into(),
        }
    }

    #[test]
    fn test_new_trims_fields() {
        let q = Quote::new("  Stay hungry ", "\tMotivation\n").unwrap();
        assert_eq!(q, quote("Stay hungry", "Motivation"));
    }

    #[test]
    fn test_new_rejects_blank_fields() {
        for (text, category) in [("", "Life"), ("Life is short", ""), ("   ", "Life"), ("x", " \t ")] {
            let err = Quote::new(text, category).unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let q: Quote = serde_json::from_str(r#"{"text":"only text"}"#).unwrap();
        assert_eq!(q.category, "");
    }

    #[test]
    fn test_default_quotes() {
        let seeds = default_quotes();
        assert_eq!(seeds.len(), 3);
        assert_eq!(
            distinct_categories(&seeds),
            vec!["Motivation", "Life", "Individuality"]
        );
    }

    #[test]
    fn test_distinct_categories_first_seen_order() {
        let quotes = vec![
            quote("a", "Life"),
            quote("b", "Motivation"),
            quote("c", "Life"),
        ];
        assert_eq!(distinct_categories(&quotes), vec!["Life", "Motivation"]);
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!(CategoryFilter::from("all"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from("All"),
            CategoryFilter::Named("All".into())
        );
        assert_eq!(CategoryFilter::Named("Life".into()).to_string(), "Life");
        assert_eq!(CategoryFilter::All.to_string(), "all");
    }

    #[test]
    fn test_filter_exact_match() {
        let quotes = vec![quote("Life is short", "Life"), quote("Stay hungry", "Motivation")];

        assert_eq!(CategoryFilter::All.apply(&quotes), quotes);
        assert_eq!(
            CategoryFilter::from("Motivation").apply(&quotes),
            vec![quote("Stay hungry", "Motivation")]
        );
        assert!(CategoryFilter::from("motivation").apply(&quotes).is_empty());
        assert!(CategoryFilter::from("Unknown").apply(&quotes).is_empty());
    }

    #[test]
    fn test_from_server() {
        let q = Quote::from_server("sunt aut facere");
        assert_eq!(q.category, SERVER_CATEGORY);
        assert_eq!(q.text, "sunt aut facere");
    }
}
