//! Record types stored in the catalog.

use super::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Everything the scanner knows about one file.
///
/// The absolute path is the primary key; a rescan overwrites the
/// record wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path (primary key within the catalog)
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Creation time, epoch seconds
    pub created: i64,
    /// Last modification time, epoch seconds
    pub modified: i64,
    /// Last access time, epoch seconds
    pub accessed: i64,
    /// Base file name
    pub name: String,
    /// Lowercased extension including the leading dot, or empty
    pub extension: String,
    /// Parent directory path
    pub parent: PathBuf,
    pub hidden: bool,
    /// Best-effort MIME type
    pub mime_type: String,
    pub category: Category,
    /// Hex content digest; absent when the file could not be read
    pub fingerprint: Option<String>,
    /// Short sample of text-typed files, for pattern work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_sample: Option<String>,
    /// When this record was produced, epoch seconds
    pub scanned_at: i64,
}

/// Lightweight aggregate metadata for a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub path: PathBuf,
    pub file_count: usize,
    pub total_size: u64,
    pub scanned_at: i64,
}

/// Which filesystem action a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Scan,
    DeleteDuplicate,
    MoveDuplicate,
    SymlinkDuplicate,
    HardlinkDuplicate,
    RenameDuplicate,
    Move,
    Rename,
    Import,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::DeleteDuplicate => "delete_duplicate",
            Self::MoveDuplicate => "move_duplicate",
            Self::SymlinkDuplicate => "symlink_duplicate",
            Self::HardlinkDuplicate => "hardlink_duplicate",
            Self::RenameDuplicate => "rename_duplicate",
            Self::Move => "move",
            Self::Rename => "rename",
            Self::Import => "import",
        }
    }
}

/// An immutable log record of one action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    /// Epoch seconds
    pub timestamp: i64,
    pub action: HistoryAction,
    pub details: BTreeMap<String, String>,
}

impl HistoryEntry {
    pub fn new(action: HistoryAction, details: BTreeMap<String, String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now().timestamp(),
            action,
            details,
        }
    }
}

/// Per-category running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub count: usize,
    pub size: u64,
}

/// Aggregate statistics, maintained incrementally on every
/// upsert/remove rather than recomputed by full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_size: u64,
    pub by_category: BTreeMap<Category, CategoryStats>,
}

impl CatalogStats {
    pub fn file_count(&self) -> usize {
        self.by_category.values().map(|s| s.count).sum()
    }
}

/// The two pattern families tracked by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Naming,
    Organization,
}
