//! Domain layer - core business logic and types.
//!
//! This layer contains pure domain models and error types
//! without any external dependencies (DB, IO, etc.).

pub mod error;
pub mod models;
pub mod sync;

pub use error::{AppError, Result};
pub use models::{default_quotes, distinct_categories, CategoryFilter, Quote};
pub use sync::{reconcile, AppConfig, SyncOutcome, SyncReport, MAX_SYNC_INTERVAL_SECS};
