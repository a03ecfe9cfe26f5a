//! Persistent catalog store backends.
//!
//! The catalog persists as a single JSON document. Backends only
//! load and save whole documents; the catalog itself owns all
//! in-memory mutation.

use super::types::{CatalogStats, DirectoryRecord, FileRecord, HistoryEntry};
use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Document header section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub version: String,
    /// RFC 3339 timestamp of the last save
    pub last_updated: String,
    pub file_count: usize,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            last_updated: chrono::Utc::now().to_rfc3339(),
            file_count: 0,
        }
    }
}

/// Pattern counter section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternCounters {
    pub naming: BTreeMap<String, u64>,
    pub organization: BTreeMap<String, u64>,
    pub extensions: BTreeMap<String, u64>,
}

/// The whole catalog as one serializable document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDocument {
    pub metadata: DocumentMetadata,
    pub files: BTreeMap<PathBuf, FileRecord>,
    pub directories: BTreeMap<PathBuf, DirectoryRecord>,
    pub patterns: PatternCounters,
    pub history: VecDeque<HistoryEntry>,
    pub stats: CatalogStats,
}

/// Trait for catalog store backends.
pub trait CatalogStore: Send + Sync {
    /// Load the persisted document, or None when nothing was saved yet.
    fn load(&self) -> Result<Option<CatalogDocument>, CatalogError>;

    /// Persist the whole document.
    fn save(&self, document: &CatalogDocument) -> Result<(), CatalogError>;
}

/// JSON file store.
///
/// Saves write to a sibling temp file first and rename into place, so
/// a crash mid-save never truncates the previous document.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's home directory.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".orderly")
            .join("catalog.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogStore for JsonFileStore {
    fn load(&self) -> Result<Option<CatalogDocument>, CatalogError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Load {
            path: self.path.clone(),
            source,
        })?;

        let document = serde_json::from_str(&text).map_err(|e| CatalogError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(Some(document))
    }

    fn save(&self, document: &CatalogDocument) -> Result<(), CatalogError> {
        let save_err = |source: std::io::Error| CatalogError::Save {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(save_err)?;
        }

        let text = serde_json::to_string_pretty(document).map_err(|e| CatalogError::Save {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(save_err)?;
        std::fs::rename(&tmp, &self.path).map_err(save_err)?;

        Ok(())
    }
}

/// In-memory store backend.
///
/// Useful for tests and scenarios where persistence isn't needed.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<CatalogDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self) -> Result<Option<CatalogDocument>, CatalogError> {
        Ok(self.slot.lock().ok().and_then(|s| s.clone()))
    }

    fn save(&self, document: &CatalogDocument) -> Result<(), CatalogError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(document.clone());
        }
        Ok(())
    }
}
