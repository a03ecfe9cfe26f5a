//! # Orderly
//!
//! A file inventory engine that fingerprints directory trees, resolves
//! duplicate files, and applies rule-based organization.
//!
//! ## Core Philosophy
//! - **Catalog is the record** - every filesystem mutation is mirrored in the
//!   catalog, so a crash mid-batch never loses track of what was done
//! - **Fail per file, not per run** - unreadable files are skipped with a
//!   warning; the batch always finishes
//! - **One operation at a time** - a busy component rejects new work instead
//!   of queueing it
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation
//! layers:
//! - `core` - catalog, scanner, duplicate handling, organizer
//! - `config` - typed settings passed into components at construction
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - user-friendly error types

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrderlyError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
