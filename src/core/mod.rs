//! # Core Module
//!
//! The GUI-agnostic file inventory engine.
//!
//! ## Modules
//! - `catalog` - records, statistics, patterns, history, persistence
//! - `scanner` - directory walking, metadata, content fingerprints
//! - `dupes` - duplicate grouping and resolution strategies
//! - `organize` - pattern analysis and rule-based reorganization
//! - `task` - cancellation tokens and one-operation-at-a-time guards

pub mod catalog;
pub mod dupes;
mod fsutil;
pub mod organize;
pub mod scanner;
pub mod task;

// Re-export commonly used types
pub use catalog::{Catalog, Category, FileRecord};
pub use dupes::{CompareMethod, DuplicateGroup, DuplicateResolver, ResolutionMethod};
pub use organize::{NamingConvention, OrganizationRule, Organizer};
pub use scanner::{FileScanner, HashAlgorithm};
pub use task::{CancellationToken, OperationGuard};
