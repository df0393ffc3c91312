//! Application layer - use cases and orchestration.
//!
//! This layer contains the quote store and the services that drive it:
//! server sync, output formatting and the interactive session.

pub mod commands;
pub mod formatter;
pub mod quote_store;
pub mod session;
pub mod sync_service;

pub use commands::QuoteApp;
pub use formatter::OutputFormat;
pub use session::Session;
