//! Interactive session.
//!
//! Reads commands from stdin until `quit` or EOF, with the periodic server
//! sync running in the background. Session storage lives exactly as long
//! as this loop.

use std::io::Write;
use std::path::PathBuf;

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::domain::{AppError, Result};

use super::commands::QuoteApp;
use super::formatter::format_sync_report;

const HELP: &str = "Commands:
  new                        Show a random quote
  add <category> | <text>    Add a quote
  filter <category|all>      Show quotes in a category
  categories                 List categories
  list                       List all quotes
  export [path]              Export quotes as JSON
  import <path>              Import quotes from a JSON file
  sync                       Sync with the server now
  last                       Show the last viewed quote
  help                       Show this help
  quit                       Leave the session";

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    New,
    Add { category: String, text: String },
    Filter(String),
    Categories,
    List,
    Export(Option<PathBuf>),
    Import(PathBuf),
    Sync,
    Last,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse one input line.
    ///
    /// # Errors
    /// Returns a usage message for unknown commands or missing arguments.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_lowercase().as_str() {
            "new" | "random" => Ok(Self::New),
            "add" => {
                let (category, text) = rest
                    .split_once('|')
                    .ok_or_else(|| "Usage: add <category> | <text>".to_string())?;
                Ok(Self::Add {
                    category: category.to_string(),
                    text: text.to_string(),
                })
            }
            "filter" if !rest.is_empty() => Ok(Self::Filter(rest.to_string())),
            "filter" => Err("Usage: filter <category|all>".to_string()),
            "categories" => Ok(Self::Categories),
            "list" => Ok(Self::List),
            "export" => Ok(Self::Export((!rest.is_empty()).then(|| PathBuf::from(rest)))),
            "import" if !rest.is_empty() => Ok(Self::Import(PathBuf::from(rest))),
            "import" => Err("Usage: import <path>".to_string()),
            "sync" => Ok(Self::Sync),
            "last" => Ok(Self::Last),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("Unknown command: {other}. Type 'help' for commands.")),
        }
    }
}

/// Interactive quote session.
pub struct Session {
    app: QuoteApp,
}

impl Session {
    /// Create a session around an opened app.
    #[must_use]
    pub const fn new(app: QuoteApp) -> Self {
        Self { app }
    }

    /// Run on stdin until `quit` or end of input.
    ///
    /// # Errors
    /// Returns error if stdin cannot be read or the first quote cannot be shown.
    pub async fn run(&self) -> Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// Run on `input` until `quit` or end of input.
    ///
    /// The periodic sync is stopped and session storage cleared however the
    /// loop ends.
    ///
    /// # Errors
    /// Returns error if `input` cannot be read or the first quote cannot be
    /// shown.
    pub async fn run_with<R>(&self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        println!("{}", self.app.last_or_random().await?);
        println!("{}", "Type 'help' for commands.".dimmed());

        let handle = self.app.config().sync.enabled.then(|| {
            self.app
                .service()
                .spawn_periodic(self.app.config().sync_interval(), |report| {
                    println!("\n{}", format_sync_report(&report));
                })
        });

        let read = self.read_commands(input).await;

        if let Some(handle) = handle {
            handle.stop().await;
        }

        let ended = self.app.service().store().lock().await.end_session();
        read.and(ended)
    }

    async fn read_commands<R>(&self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            print!("{} ", ">".cyan().bold());
            let _ = std::io::stdout().flush();

            let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| AppError::io("Failed to read input", e))?
            else {
                break;
            };

            if line.trim().is_empty() {
                continue;
            }

            match SessionCommand::parse(&line) {
                Ok(SessionCommand::Quit) => break,
                Ok(command) => match self.execute(command).await {
                    Ok(output) => println!("{output}"),
                    Err(e) => eprintln!("{} {e}", "Error:".red().bold()),
                },
                Err(usage) => eprintln!("{}", usage.yellow()),
            }
        }

        Ok(())
    }

    /// Run one command and return its output.
    ///
    /// # Errors
    /// Returns whatever error the underlying operation reports.
    pub async fn execute(&self, command: SessionCommand) -> Result<String> {
        match command {
            SessionCommand::New => self.app.random().await,
            SessionCommand::Add { category, text } => self.app.add(&text, &category).await,
            SessionCommand::Filter(category) => self.app.filter(&category).await,
            SessionCommand::Categories => self.app.categories().await,
            SessionCommand::List => self.app.list().await,
            SessionCommand::Export(path) => self.app.export(path.as_deref()).await,
            SessionCommand::Import(path) => self.app.import(&path).await,
            SessionCommand::Sync => self.app.sync().await,
            SessionCommand::Last => self.app.last().await,
            SessionCommand::Help => Ok(HELP.to_string()),
            SessionCommand::Quit => Ok(String::new()),
        }
    }
}
