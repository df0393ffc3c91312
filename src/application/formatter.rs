//! Output formatting for quotes.
//!
//! Supports plain text, JSON and table views, plus the short messages shown
//! for empty results and sync notifications.

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{CategoryFilter, Quote, SyncReport};

/// Shown when the whole collection is empty.
pub const NO_QUOTES: &str = "No quotes available!";

/// Shown when a category filter matches nothing.
pub const NO_QUOTES_IN_CATEGORY: &str = "No quotes available for the selected category.";

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable quote blocks.
    #[default]
    Text,
    /// JSON format for programmatic use.
    Json,
    /// Compact table listing.
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            _ => Err(format!("Unknown format: {s}. Use: text, json, table")),
        }
    }
}

/// Formats a single quote as a block.
pub fn format_quote(quote: &Quote) -> String {
    format!(
        "{}\n  — Category: {}",
        format!("\"{}\"", quote.text).italic(),
        quote.category.cyan()
    )
}

/// Formats the quote restored from the session.
pub fn format_last_viewed(quote: &Quote) -> String {
    format!(
        "{}\n  — Category: {} {}",
        format!("\"{}\"", quote.text).italic(),
        quote.category.cyan(),
        "(Last Viewed)".dimmed()
    )
}

/// Formats a list of quotes in the requested format.
///
/// `empty_message` is returned for an empty list in text and table form.
///
/// # Errors
/// Returns error if JSON serialization fails.
pub fn format_quotes(
    quotes: &[Quote],
    format: OutputFormat,
    empty_message: &str,
) -> Result<String, serde_json::Error> {
    if quotes.is_empty() && !matches!(format, OutputFormat::Json) {
        return Ok(empty_message.to_string());
    }

    Ok(match format {
        OutputFormat::Text => quotes
            .iter()
            .map(format_quote)
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Json => serde_json::to_string_pretty(quotes)?,
        OutputFormat::Table => format_quotes_table(quotes),
    })
}

/// Formats a table listing of quotes.
pub fn format_quotes_table(quotes: &[Quote]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Category", "Quote"]);

    for (i, quote) in quotes.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            truncate(&quote.category, 18),
            truncate(&quote.text, 60),
        ]);
    }

    table.to_string()
}

/// Formats the category selector, marking the persisted selection.
pub fn format_categories(categories: &[String], selected: Option<&CategoryFilter>) -> String {
    let selected = selected.cloned().unwrap_or_default();
    let mut out = String::new();

    let mut push = |label: &str, filter: &CategoryFilter| {
        let marker = if *filter == selected { "●".green() } else { "○".dimmed() };
        out.push_str(&format!("  {marker} {label}\n"));
    };

    push("All Categories", &CategoryFilter::All);
    for category in categories {
        push(category, &CategoryFilter::Named(category.clone()));
    }

    out.trim_end().to_string()
}

/// Formats a sync report as a timestamped notification.
///
/// A quote picked after a replacement is shown below the notification.
pub fn format_sync_report(report: &SyncReport) -> String {
    let message = report.message();
    let message = if report.error.is_some() {
        message.yellow()
    } else if report.replaced.is_some() {
        message.green()
    } else {
        message.normal()
    };
    let notice = format!("{} {message}", timestamp(report.at));
    match &report.displayed {
        Some(quote) => format!("{notice}\n{}", format_quote(quote)),
        None => notice,
    }
}

/// Formats a one-off notification with the current time.
pub fn format_notification(message: &str) -> String {
    format!("{} {message}", timestamp(Utc::now()))
}

fn timestamp(at: DateTime<Utc>) -> String {
    format!("[{}]", at.with_timezone(&Local).format("%H:%M:%S"))
        .dimmed()
        .to_string()
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{cut}...")
    }
}
