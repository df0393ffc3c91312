//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// Quote Generator - keep, show, share and sync quotes.
#[derive(Parser, Debug)]
#[command(name = "quotes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format: text, json, or table.
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,

    /// Data directory (defaults to ~/.quote-generator).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a random quote.
    Random,

    /// Add a new quote.
    Add {
        /// The quote text.
        text: String,

        /// Category for the quote.
        #[arg(short, long)]
        category: String,
    },

    /// List all quotes.
    List,

    /// Show quotes in a category ("all" for every quote).
    Filter {
        /// Category name, matched exactly.
        category: String,
    },

    /// List categories, marking the last selected one.
    Categories,

    /// Export all quotes as a JSON file.
    Export {
        /// Output file path (configured file name if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import quotes from a JSON file containing an array.
    Import {
        /// Path of the JSON file.
        path: PathBuf,
    },

    /// Sync with the server once.
    Sync,

    /// Interactive session with periodic server sync.
    Session,

    /// Create the default configuration file.
    InitConfig,

    /// Show the data paths being used.
    Paths,
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}
