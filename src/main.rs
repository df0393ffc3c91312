//! Quote Generator - a terminal quote keeper.
//!
//! Keeps a collection of quotes in local storage, shows random quotes,
//! filters by category, imports and exports JSON, and syncs with a server
//! whose data wins whenever the quote counts differ.
//!
//!   quotes random                        # Show a random quote
//!   quotes add "Stay hungry" -c Life     # Add a quote
//!   quotes filter Motivation             # Quotes in one category
//!   quotes export -o backup.json         # Save all quotes
//!   quotes session                       # Interactive mode with auto-sync

mod application;
mod cli;
mod domain;
mod infrastructure;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::quote_store::SELECTED_CATEGORY_KEY;
use application::{QuoteApp, Session};
use cli::{Cli, Commands};
use domain::AppConfig;
use infrastructure::{ensure_config_exists, load_config, KeyValueStore, LocalStorage};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .output_format()
        .map_err(|e| domain::AppError::Config { message: e })?;

    let config = load_config(cli.data_dir.as_deref())?;

    match cli.command {
        Commands::InitConfig => cmd_init_config(&config)?,
        Commands::Paths => cmd_paths(&config)?,
        command => {
            let app = QuoteApp::open(config, format)?;
            cmd_quotes(app, command).await?;
        }
    }

    Ok(())
}

/// Commands that operate on the quote store.
async fn cmd_quotes(app: QuoteApp, command: Commands) -> domain::Result<()> {
    let output = match command {
        Commands::Random => app.random().await?,
        Commands::Add { text, category } => app.add(&text, &category).await?,
        Commands::List => app.list().await?,
        Commands::Filter { category } => app.filter(&category).await?,
        Commands::Categories => app.categories().await?,
        Commands::Export { output } => app.export(output.as_deref()).await?,
        Commands::Import { path } => app.import(&path).await?,
        Commands::Sync => app.sync().await?,
        Commands::Session => {
            return Session::new(app).run().await;
        }
        Commands::InitConfig | Commands::Paths => return Ok(()),
    };

    println!("{output}");
    Ok(())
}

/// Create the default config file.
fn cmd_init_config(config: &AppConfig) -> domain::Result<()> {
    let (path, created) = ensure_config_exists(config)?;

    if created {
        println!("{} Created {}", "✓".green().bold(), path.display());
    } else {
        println!("Configuration already exists at {}", path.display());
    }

    Ok(())
}

/// Show data paths command.
fn cmd_paths(config: &AppConfig) -> domain::Result<()> {
    let db_path = config.storage_db_path();

    println!("{}", "📂 Quote Generator Paths".bold());
    println!();
    println!("  Data dir: {}", config.data_dir().display());
    println!("  Config:   {}", config.config_file_path().display());
    println!("  Storage:  {}", db_path.display());

    if db_path.exists() {
        let storage = LocalStorage::open(&db_path)?;
        let keys = storage.keys()?;
        println!();
        println!("  Stored keys: {}", keys.join(", ").cyan());
        if let Some(selected) = storage.get(SELECTED_CATEGORY_KEY)? {
            println!("  Selected category: {}", selected.green());
        }
    }

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
