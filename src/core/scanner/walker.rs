//! Directory walking and scan orchestration.

use super::filter::EntryFilter;
use super::fingerprint::HashAlgorithm;
use super::metadata::MetadataReader;
use crate::config::ScanningSettings;
use crate::core::catalog::{Catalog, DirectoryRecord, HistoryAction, CHECKPOINT_INTERVAL};
use crate::core::task::{CancellationToken, OperationGuard};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent, ScanProgress};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    /// Eligible files found by the walk
    pub total: usize,
    /// Files attempted (processed counter at exit)
    pub processed: usize,
    /// Records upserted into the catalog
    pub cataloged: usize,
    /// Files skipped by filters, size limit, or per-file errors
    pub skipped: usize,
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// Walks a directory tree and populates the catalog.
///
/// Fails entry-wise, not run-wise: unreadable files are skipped with
/// a warning, only an invalid root aborts the scan.
pub struct FileScanner {
    settings: ScanningSettings,
    algorithm: HashAlgorithm,
    guard: OperationGuard,
}

impl FileScanner {
    pub fn new(settings: ScanningSettings, algorithm: HashAlgorithm) -> Self {
        Self {
            settings,
            algorithm,
            guard: OperationGuard::new(),
        }
    }

    /// Scan without progress reporting or cancellation.
    pub fn scan(&self, root: &Path, catalog: &Catalog) -> Result<ScanReport, ScanError> {
        self.scan_with_events(root, catalog, &null_sender(), &CancellationToken::new())
    }

    /// Scan with progress events and cooperative cancellation.
    ///
    /// Cancelling leaves the catalog in whatever partial state it
    /// reached; no rollback.
    pub fn scan_with_events(
        &self,
        root: &Path,
        catalog: &Catalog,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let _permit = self.guard.try_begin().ok_or(ScanError::Busy)?;

        // Root problems are fatal, and reported before any event fires
        if !root.exists() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let start = Instant::now();
        info!("starting scan of {}", root.display());

        let filter = EntryFilter::from_settings(&self.settings);
        let (files, dir_totals, mut skipped) = self.enumerate(root, &filter);
        let total = files.len();
        debug!("found {total} eligible files under {}", root.display());

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
            total,
        }));

        let reader = MetadataReader::new(self.algorithm, self.settings.chunk_size_bytes());
        let processed = AtomicUsize::new(0);
        let warnings = AtomicUsize::new(0);
        let mut cataloged = 0usize;

        // Records are built in parallel per batch, then upserted
        // sequentially so checkpoint saves always persist a prefix of
        // the processed files.
        for batch in files.chunks(CHECKPOINT_INTERVAL) {
            if cancel.is_cancelled() {
                break;
            }

            let records: Vec<_> = batch
                .par_iter()
                .filter_map(|path| {
                    if cancel.is_cancelled() {
                        return None;
                    }

                    let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    events.send(Event::Scan(ScanEvent::Progress(ScanProgress::new(
                        done,
                        total,
                        path.clone(),
                    ))));

                    match reader.read(path) {
                        Ok(record) => Some(record),
                        Err(e) => {
                            warn!("skipping {}: {e}", path.display());
                            warnings.fetch_add(1, Ordering::SeqCst);
                            events.send(Event::Scan(ScanEvent::Warning {
                                path: path.clone(),
                                message: e.to_string(),
                            }));
                            None
                        }
                    }
                })
                .collect();

            for record in records {
                catalog.upsert(record);
                cataloged += 1;
            }
            catalog.checkpoint(processed.load(Ordering::SeqCst));
        }

        let cancelled = cancel.is_cancelled();
        if !cancelled {
            let now = chrono::Utc::now().timestamp();
            for (path, (file_count, total_size)) in dir_totals {
                catalog.upsert_directory(DirectoryRecord {
                    path,
                    file_count,
                    total_size,
                    scanned_at: now,
                });
            }
        }

        let processed = processed.load(Ordering::SeqCst);
        skipped += warnings.load(Ordering::SeqCst);

        let mut details = BTreeMap::new();
        details.insert("directory".to_string(), root.display().to_string());
        details.insert("processed".to_string(), processed.to_string());
        details.insert("cataloged".to_string(), cataloged.to_string());
        catalog.record_history(HistoryAction::Scan, details);
        catalog.save_best_effort();

        let report = ScanReport {
            root: root.to_path_buf(),
            total,
            processed,
            cataloged,
            skipped,
            cancelled,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "scan of {} finished: {}/{} files in {}ms{}",
            root.display(),
            report.cataloged,
            report.total,
            report.duration_ms,
            if cancelled { " (cancelled)" } else { "" }
        );

        events.send(Event::Scan(ScanEvent::Completed {
            processed,
            total,
            cancelled,
        }));

        Ok(report)
    }

    /// Walk the tree, collecting eligible files and per-directory
    /// aggregates. Walk errors are warnings, never fatal.
    #[allow(clippy::type_complexity)]
    fn enumerate(
        &self,
        root: &Path,
        filter: &EntryFilter,
    ) -> (Vec<PathBuf>, BTreeMap<PathBuf, (usize, u64)>, usize) {
        let mut files = Vec::new();
        let mut dir_totals: BTreeMap<PathBuf, (usize, u64)> = BTreeMap::new();
        let mut skipped = 0usize;

        let walker = WalkDir::new(root).follow_links(false).into_iter();
        let entries = walker.filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            e.file_name()
                .to_str()
                .map(|name| filter.should_descend(name))
                .unwrap_or(true)
        });

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("walk error: {e}");
                    skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_str().unwrap_or_default();
            if !filter.should_include_file(name) {
                skipped += 1;
                continue;
            }

            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(e) => {
                    warn!("cannot stat {}: {e}", entry.path().display());
                    skipped += 1;
                    continue;
                }
            };

            if filter.exceeds_max_size(size) {
                debug!(
                    "skipping large file {} ({} bytes)",
                    entry.path().display(),
                    size
                );
                skipped += 1;
                continue;
            }

            if let Some(parent) = entry.path().parent() {
                let slot = dir_totals.entry(parent.to_path_buf()).or_insert((0, 0));
                slot.0 += 1;
                slot.1 += size;
            }
            files.push(entry.path().to_path_buf());
        }

        // Deterministic processing order regardless of walk order
        files.sort();

        (files, dir_totals, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    fn scanner() -> FileScanner {
        FileScanner::new(ScanningSettings::default(), HashAlgorithm::Sha256)
    }

    #[test]
    fn scan_catalogs_files_with_fingerprints() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.txt", b"alpha");
        write_file(dir.path(), "b.jpg", b"beta");

        let catalog = Catalog::in_memory();
        let report = scanner().scan(dir.path(), &catalog).unwrap();

        assert_eq!(report.cataloged, 2);
        assert_eq!(catalog.len(), 2);
        assert!(!report.cancelled);

        let record = catalog.get(&dir.path().join("a.txt")).unwrap();
        assert!(record.fingerprint.is_some());
    }

    #[test]
    fn scan_recurses_and_records_directories() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        write_file(dir.path(), "root.txt", b"root");
        write_file(&sub, "leaf.txt", b"leaf");

        let catalog = Catalog::in_memory();
        let report = scanner().scan(dir.path(), &catalog).unwrap();

        assert_eq!(report.cataloged, 2);
        let dir_record = catalog.directory(&sub).unwrap();
        assert_eq!(dir_record.file_count, 1);
        assert_eq!(dir_record.total_size, 4);
    }

    #[test]
    fn hidden_and_excluded_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "visible.txt", b"yes");
        write_file(dir.path(), ".hidden.txt", b"no");

        let excluded = dir.path().join("node_modules");
        fs::create_dir(&excluded).unwrap();
        write_file(&excluded, "dep.js", b"no");

        let catalog = Catalog::in_memory();
        let report = scanner().scan(dir.path(), &catalog).unwrap();

        assert_eq!(report.cataloged, 1);
        assert!(catalog.get(&dir.path().join("visible.txt")).is_some());
    }

    #[test]
    fn oversized_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "small.bin", b"ok");
        write_file(dir.path(), "big.bin", &vec![0u8; 2 * 1024 * 1024]);

        let settings = ScanningSettings {
            max_file_size_mb: 1,
            ..Default::default()
        };
        let catalog = Catalog::in_memory();
        let scanner = FileScanner::new(settings, HashAlgorithm::Sha256);
        let report = scanner.scan(dir.path(), &catalog).unwrap();

        assert_eq!(report.cataloged, 1);
        assert!(report.skipped >= 1);
        assert!(catalog.get(&dir.path().join("big.bin")).is_none());
    }

    #[test]
    fn missing_root_is_fatal_before_any_event() {
        let catalog = Catalog::in_memory();
        let (sender, receiver) = crate::events::EventChannel::new();

        let result = scanner().scan_with_events(
            Path::new("/nonexistent/root/xyz"),
            &catalog,
            &sender,
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn cancelled_token_stops_before_processing() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.txt", b"alpha");
        write_file(dir.path(), "b.txt", b"beta");

        let catalog = Catalog::in_memory();
        let (sender, receiver) = crate::events::EventChannel::new();
        let token = CancellationToken::new();
        token.cancel();

        let report = scanner()
            .scan_with_events(dir.path(), &catalog, &sender, &token)
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.processed, 0);
        assert_eq!(catalog.len(), 0);

        // Final event still reports completion, flagged cancelled
        let completed = receiver
            .iter()
            .find_map(|e| match e {
                Event::Scan(ScanEvent::Completed { cancelled, .. }) => Some(cancelled),
                _ => None,
            })
            .unwrap();
        assert!(completed);
    }

    #[test]
    fn unreadable_files_are_warnings_not_failures() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "ok.txt", b"fine");

        let catalog = Catalog::in_memory();
        let report = scanner().scan(dir.path(), &catalog).unwrap();
        assert_eq!(report.cataloged, 1);

        // History records the scan
        let history = catalog.history(10);
        assert_eq!(history[0].action, HistoryAction::Scan);
    }
}
