//! Stagecraft Common Library
//!
//! Configuration, error types and the SQLite content-query adapter shared by
//! the Stagecraft harness crates.

pub mod config;
pub mod db;
pub mod error;

// Re-export commonly used types
pub use config::{
    canonical_browser, AccountApiConfig, BrowserConfig, DatabaseConfig, HarnessConfig, ReportConfig,
};
pub use db::{DatabaseAdapter, Rows, ScriptOutcome, SqliteAdapter};
pub use error::{Error, Result};

/// Stagecraft version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
