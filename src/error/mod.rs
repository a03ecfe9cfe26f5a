//! # Error Module
//!
//! User-friendly error types for the file organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Recover per item** - transient I/O failures are logged and skipped by
//!   the components themselves; only operation-level failures surface here

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrderlyError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Duplicate handling error: {0}")]
    Duplicate(#[from] DuplicateError),

    #[error("Organization error: {0}")]
    Organize(#[from] OrganizeError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors from the catalog and its persistent store
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog at {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write catalog to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog document at {path} is not valid JSON: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Imported document is missing required section '{section}'")]
    InvalidImport { section: &'static str },

    #[error("Imported document is malformed: {reason}")]
    MalformedImport { reason: String },
}

/// Errors that occur during directory scanning
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("A scan is already running")]
    Busy,
}

/// Errors from duplicate search and resolution
#[derive(Error, Debug)]
pub enum DuplicateError {
    #[error("A duplicate operation is already running")]
    Busy,
}

/// Errors from pattern analysis, suggestions, and rule application
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("An organization operation is already running")]
    Busy,

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Rule document must be a list of objects")]
    InvalidRuleDocument,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrderlyError>;
