//! # Catalog Module
//!
//! The single ownership boundary for all shared mutable state: file
//! and directory records, running statistics, pattern counters, and
//! the bounded history log.
//!
//! ## Design
//! One `RwLock` covers the whole catalog, so a counter update is
//! always observed together with the record change that caused it.
//! Callers never mutate counters directly; `upsert`/`remove` apply
//! the deltas.
//!
//! Persistence goes through a [`CatalogStore`] backend. Save failures
//! are reported but never fatal - the catalog keeps operating in
//! memory and the next checkpoint retries.

mod category;
mod store;
mod types;

pub use category::Category;
pub use store::{
    CatalogDocument, CatalogStore, DocumentMetadata, JsonFileStore, MemoryStore, PatternCounters,
};
pub use types::{
    CatalogStats, CategoryStats, DirectoryRecord, FileRecord, HistoryAction, HistoryEntry,
    PatternKind,
};

use crate::error::CatalogError;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::warn;

/// History entries kept before the oldest are evicted.
const MAX_HISTORY: usize = 1000;

/// Bulk operations persist the catalog every this many processed items.
pub const CHECKPOINT_INTERVAL: usize = 100;

#[derive(Debug, Default)]
struct CatalogData {
    files: BTreeMap<PathBuf, FileRecord>,
    directories: BTreeMap<PathBuf, DirectoryRecord>,
    naming_patterns: BTreeMap<String, u64>,
    organization_patterns: BTreeMap<String, u64>,
    extension_counts: BTreeMap<String, u64>,
    history: VecDeque<HistoryEntry>,
    stats: CatalogStats,
}

impl CatalogData {
    fn add_contribution(&mut self, record: &FileRecord) {
        if !record.extension.is_empty() {
            *self
                .extension_counts
                .entry(record.extension.clone())
                .or_insert(0) += 1;
        }

        let entry = self.stats.by_category.entry(record.category).or_default();
        entry.count += 1;
        entry.size += record.size;
        self.stats.total_size += record.size;
    }

    fn remove_contribution(&mut self, record: &FileRecord) {
        if !record.extension.is_empty() {
            if let Some(count) = self.extension_counts.get_mut(&record.extension) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.extension_counts.remove(&record.extension);
                }
            }
        }

        if let Some(entry) = self.stats.by_category.get_mut(&record.category) {
            entry.count = entry.count.saturating_sub(1);
            entry.size = entry.size.saturating_sub(record.size);
            if entry.count == 0 {
                self.stats.by_category.remove(&record.category);
            }
        }
        self.stats.total_size = self.stats.total_size.saturating_sub(record.size);
    }
}

/// The catalog: records, statistics, patterns, history.
pub struct Catalog {
    store: Box<dyn CatalogStore>,
    inner: RwLock<CatalogData>,
}

impl Catalog {
    /// Open a catalog, loading any previously persisted document.
    pub fn open(store: Box<dyn CatalogStore>) -> Result<Self, CatalogError> {
        let data = match store.load()? {
            Some(document) => Self::data_from_document(document),
            None => CatalogData::default(),
        };

        Ok(Self {
            store,
            inner: RwLock::new(data),
        })
    }

    /// An empty catalog backed by an in-memory store.
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            inner: RwLock::new(CatalogData::default()),
        }
    }

    fn data_from_document(document: CatalogDocument) -> CatalogData {
        CatalogData {
            files: document.files,
            directories: document.directories,
            naming_patterns: document.patterns.naming,
            organization_patterns: document.patterns.organization,
            extension_counts: document.patterns.extensions,
            history: document.history,
            stats: document.stats,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CatalogData> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CatalogData> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace a record, updating counters by delta.
    pub fn upsert(&self, record: FileRecord) {
        let mut data = self.write();
        if let Some(old) = data.files.remove(&record.path) {
            data.remove_contribution(&old);
        }
        data.add_contribution(&record);
        data.files.insert(record.path.clone(), record);
    }

    /// Remove a record if present, applying inverse deltas.
    /// A missing path is a no-op, not an error.
    pub fn remove(&self, path: &Path) -> bool {
        let mut data = self.write();
        match data.files.remove(path) {
            Some(old) => {
                data.remove_contribution(&old);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, path: &Path) -> Option<FileRecord> {
        self.read().files.get(path).cloned()
    }

    /// Snapshot of all records. Mutations after the call are not
    /// reflected in the returned map.
    pub fn all(&self) -> BTreeMap<PathBuf, FileRecord> {
        self.read().files.clone()
    }

    /// Snapshot of the records living under a directory.
    pub fn records_under(&self, dir: &Path) -> Vec<FileRecord> {
        self.read()
            .files
            .values()
            .filter(|r| r.path.starts_with(dir))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().files.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        self.read().stats.clone()
    }

    pub fn upsert_directory(&self, record: DirectoryRecord) {
        self.write().directories.insert(record.path.clone(), record);
    }

    pub fn directory(&self, path: &Path) -> Option<DirectoryRecord> {
        self.read().directories.get(path).cloned()
    }

    /// Append a history entry, evicting the oldest past the cap.
    pub fn record_history(&self, action: HistoryAction, details: BTreeMap<String, String>) {
        let mut data = self.write();
        data.history.push_back(HistoryEntry::new(action, details));
        while data.history.len() > MAX_HISTORY {
            data.history.pop_front();
        }
    }

    /// Most recent history entries, newest first.
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        self.read()
            .history
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn bump_pattern(&self, kind: PatternKind, pattern: &str, delta: u64) {
        let mut data = self.write();
        let counters = match kind {
            PatternKind::Naming => &mut data.naming_patterns,
            PatternKind::Organization => &mut data.organization_patterns,
        };
        *counters.entry(pattern.to_string()).or_insert(0) += delta;
    }

    pub fn patterns(&self, kind: PatternKind) -> BTreeMap<String, u64> {
        let data = self.read();
        match kind {
            PatternKind::Naming => data.naming_patterns.clone(),
            PatternKind::Organization => data.organization_patterns.clone(),
        }
    }

    pub fn extension_counts(&self) -> BTreeMap<String, u64> {
        self.read().extension_counts.clone()
    }

    /// Export the catalog as one document, with refreshed metadata.
    pub fn export_document(&self) -> CatalogDocument {
        let data = self.read();
        CatalogDocument {
            metadata: store::DocumentMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                last_updated: chrono::Utc::now().to_rfc3339(),
                file_count: data.files.len(),
            },
            files: data.files.clone(),
            directories: data.directories.clone(),
            patterns: PatternCounters {
                naming: data.naming_patterns.clone(),
                organization: data.organization_patterns.clone(),
                extensions: data.extension_counts.clone(),
            },
            history: data.history.clone(),
            stats: data.stats.clone(),
        }
    }

    /// Replace the catalog wholesale from an exported document.
    ///
    /// The value must contain `metadata` and `files` sections; import
    /// never merges.
    pub fn import_document(&self, value: serde_json::Value) -> Result<(), CatalogError> {
        let object = value
            .as_object()
            .ok_or(CatalogError::InvalidImport { section: "metadata" })?;
        for section in ["metadata", "files"] {
            if !object.contains_key(section) {
                return Err(CatalogError::InvalidImport { section });
            }
        }

        let document: CatalogDocument = serde_json::from_value(value)
            .map_err(|e| CatalogError::MalformedImport { reason: e.to_string() })?;

        *self.write() = Self::data_from_document(document);
        Ok(())
    }

    /// Persist the current state through the store backend.
    pub fn save(&self) -> Result<(), CatalogError> {
        let document = self.export_document();
        self.store.save(&document)
    }

    /// Persist, downgrading failure to a warning.
    pub fn save_best_effort(&self) {
        if let Err(e) = self.save() {
            warn!("catalog save failed, continuing in memory: {e}");
        }
    }

    /// Periodic checkpoint during bulk operations.
    pub fn checkpoint(&self, processed: usize) {
        if processed > 0 && processed % CHECKPOINT_INTERVAL == 0 {
            self.save_best_effort();
        }
    }
}
