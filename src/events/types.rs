//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the core engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory scan events
    Scan(ScanEvent),
    /// Duplicate search events
    Duplicate(DuplicateEvent),
    /// Duplicate resolution events
    Resolve(ResolveEvent),
    /// Organizer events (analysis, suggestions, moves, renames)
    Organize(OrganizeEvent),
}

/// Fraction of work done, clamped to [0, 1]
pub fn ratio(processed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (processed as f64 / total as f64).min(1.0)
    }
}

/// Events during a directory scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started; total is the number of eligible files
    Started { root: PathBuf, total: usize },
    /// Progress update, emitted once per processed file
    Progress(ScanProgress),
    /// A file could not be processed and was skipped
    Warning { path: PathBuf, message: String },
    /// Scanning finished; always the final scan event
    Completed {
        processed: usize,
        total: usize,
        cancelled: bool,
    },
}

/// Progress information during scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of files processed so far
    pub processed: usize,
    /// Total number of eligible files
    pub total: usize,
    /// Fraction complete, 0.0 - 1.0
    pub progress: f64,
    /// File currently being processed
    pub current_path: PathBuf,
}

impl ScanProgress {
    pub fn new(processed: usize, total: usize, current_path: PathBuf) -> Self {
        Self {
            processed,
            total,
            progress: ratio(processed, total),
            current_path,
        }
    }
}

/// Events during duplicate search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DuplicateEvent {
    /// Search started; total is the number of size partitions to examine
    Started { total_partitions: usize },
    /// Progress update, emitted once per size partition
    Progress(DuplicateProgress),
    /// Search finished; always the final search event
    Completed {
        groups: usize,
        duplicates: usize,
        wasted_bytes: u64,
        cancelled: bool,
    },
}

/// Progress information during duplicate search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateProgress {
    /// Size partitions examined so far
    pub processed: usize,
    /// Total size partitions
    pub total: usize,
    /// Fraction complete, 0.0 - 1.0
    pub progress: f64,
    /// Duplicate groups found so far
    pub groups_found: usize,
}

impl DuplicateProgress {
    pub fn new(processed: usize, total: usize, groups_found: usize) -> Self {
        Self {
            processed,
            total,
            progress: ratio(processed, total),
            groups_found,
        }
    }
}

/// Events during duplicate resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolveEvent {
    /// Resolution started
    Started { total_groups: usize },
    /// Progress update, emitted once per group
    Progress(ResolveProgress),
    /// A file could not be resolved and was skipped
    Error { path: PathBuf, message: String },
    /// Resolution finished; always the final resolve event
    Completed {
        groups_processed: usize,
        files_resolved: usize,
        cancelled: bool,
    },
}

/// Progress information during duplicate resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveProgress {
    /// Groups processed so far
    pub processed: usize,
    /// Total groups to process
    pub total: usize,
    /// Fraction complete, 0.0 - 1.0
    pub progress: f64,
}

impl ResolveProgress {
    pub fn new(processed: usize, total: usize) -> Self {
        Self {
            processed,
            total,
            progress: ratio(processed, total),
        }
    }
}

/// Which organizer operation is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizeOperation {
    Analyze,
    Suggest,
    AutoOrganize,
    AutoRename,
}

impl std::fmt::Display for OrganizeOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrganizeOperation::Analyze => write!(f, "analyze"),
            OrganizeOperation::Suggest => write!(f, "suggest"),
            OrganizeOperation::AutoOrganize => write!(f, "auto-organize"),
            OrganizeOperation::AutoRename => write!(f, "auto-rename"),
        }
    }
}

/// Events from the organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrganizeEvent {
    /// An organizer operation started
    Started {
        operation: OrganizeOperation,
        total: usize,
    },
    /// Progress update
    Progress(OrganizeProgress),
    /// A file was moved to a new location
    Moved { from: PathBuf, to: PathBuf },
    /// A file was renamed in place
    Renamed { from: PathBuf, to: PathBuf },
    /// A file could not be processed and was skipped
    Error { path: PathBuf, message: String },
    /// The operation finished; always the final organize event
    Completed {
        operation: OrganizeOperation,
        processed: usize,
        total: usize,
        cancelled: bool,
    },
}

/// Progress information for organizer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeProgress {
    /// Files processed so far
    pub processed: usize,
    /// Total files
    pub total: usize,
    /// Fraction complete, 0.0 - 1.0
    pub progress: f64,
    /// File currently being processed
    pub current_path: PathBuf,
}

impl OrganizeProgress {
    pub fn new(processed: usize, total: usize, current_path: PathBuf) -> Self {
        Self {
            processed,
            total,
            progress: ratio(processed, total),
            current_path,
        }
    }
}
