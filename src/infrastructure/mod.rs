//! Infrastructure layer - external adapters (storage, network, config files).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod kv_store;
pub mod local_storage;
pub mod remote;

pub use config::{ensure_config_exists, load_config};
pub use kv_store::{KeyValueStore, MemoryStore};
pub use local_storage::LocalStorage;
pub use remote::{HttpQuoteSource, QuoteSource};
