//! Duplicate search and resolution component.
//!
//! One instance runs one operation at a time: a search or a
//! resolution pass, never both. Requests while busy are rejected
//! immediately.

use super::finder::build_groups;
use super::{DuplicateGroup, ResolutionMethod};
use crate::config::DuplicateSettings;
use crate::core::catalog::{Catalog, HistoryAction};
use crate::core::fsutil::{unique_path, unique_path_with_tag};
use crate::core::scanner::MetadataReader;
use crate::core::task::{CancellationToken, OperationGuard};
use crate::error::DuplicateError;
use crate::events::{null_sender, Event, EventSender, ResolveEvent, ResolveProgress};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Caller-supplied keeper selection. Returning None, or a path that
/// is not a group member, falls back to the default selection.
pub type KeepSelector = dyn Fn(&[PathBuf]) -> Option<PathBuf> + Send + Sync;

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub groups_processed: usize,
    pub files_resolved: usize,
    pub failures: usize,
    pub cancelled: bool,
}

/// Finds duplicate groups in the catalog and resolves them.
pub struct DuplicateResolver {
    settings: DuplicateSettings,
    reader: MetadataReader,
    guard: OperationGuard,
}

impl DuplicateResolver {
    pub fn new(settings: DuplicateSettings, chunk_size_bytes: usize) -> Self {
        let reader = MetadataReader::new(settings.hash_algorithm, chunk_size_bytes);
        Self {
            settings,
            reader,
            guard: OperationGuard::new(),
        }
    }

    /// Search the catalog for duplicate groups.
    pub fn find(&self, catalog: &Catalog) -> Result<Vec<DuplicateGroup>, DuplicateError> {
        self.find_with_events(catalog, &null_sender(), &CancellationToken::new())
    }

    /// Search with progress events and cooperative cancellation.
    pub fn find_with_events(
        &self,
        catalog: &Catalog,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<Vec<DuplicateGroup>, DuplicateError> {
        let _permit = self.guard.try_begin().ok_or(DuplicateError::Busy)?;

        info!(
            "searching for duplicates ({} mode, min size {} bytes)",
            self.settings.compare_method,
            self.settings.min_size_bytes()
        );

        let records = catalog.all();
        let (groups, _cancelled) = build_groups(
            &records,
            self.settings.min_size_bytes(),
            self.settings.compare_method,
            events,
            cancel,
        );

        info!("found {} duplicate groups", groups.len());
        Ok(groups)
    }

    /// Resolve groups without progress reporting, using the default
    /// keeper selection.
    pub fn resolve(
        &self,
        groups: &[DuplicateGroup],
        method: ResolutionMethod,
        catalog: &Catalog,
    ) -> Result<ResolutionReport, DuplicateError> {
        self.resolve_with_events(
            groups,
            method,
            None,
            catalog,
            &null_sender(),
            &CancellationToken::new(),
        )
    }

    /// Apply a resolution method to every group.
    ///
    /// The keeper is never modified or removed by its own group's
    /// pass. Per-file failures are logged and skipped; the remaining
    /// groups are still processed.
    pub fn resolve_with_events(
        &self,
        groups: &[DuplicateGroup],
        method: ResolutionMethod,
        keep: Option<&KeepSelector>,
        catalog: &Catalog,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<ResolutionReport, DuplicateError> {
        let _permit = self.guard.try_begin().ok_or(DuplicateError::Busy)?;

        info!("resolving {} groups with method {method}", groups.len());
        events.send(Event::Resolve(ResolveEvent::Started {
            total_groups: groups.len(),
        }));

        let mut groups_processed = 0usize;
        let mut files_resolved = 0usize;
        let mut failures = 0usize;
        let mut cancelled = false;

        for group in groups {
            if cancel.is_cancelled() {
                info!("duplicate resolution cancelled");
                cancelled = true;
                break;
            }
            if group.paths.len() < 2 {
                continue;
            }

            let keeper = keep
                .and_then(|f| f(&group.paths))
                .filter(|k| group.paths.contains(k))
                .unwrap_or_else(|| default_keeper(&group.paths, catalog));

            for path in &group.paths {
                if *path == keeper {
                    continue;
                }

                let outcome = match method {
                    ResolutionMethod::Delete => self.delete_duplicate(path, catalog),
                    ResolutionMethod::Move => self.move_duplicate(path, catalog),
                    ResolutionMethod::Symlink => self.link_duplicate(path, &keeper, catalog, true),
                    ResolutionMethod::Hardlink => {
                        self.link_duplicate(path, &keeper, catalog, false)
                    }
                    ResolutionMethod::Rename => self.rename_duplicate(path, catalog),
                };

                match outcome {
                    Ok(()) => files_resolved += 1,
                    Err(e) => {
                        warn!("could not {method} {}: {e}", path.display());
                        failures += 1;
                        events.send(Event::Resolve(ResolveEvent::Error {
                            path: path.clone(),
                            message: e.to_string(),
                        }));
                    }
                }
            }

            groups_processed += 1;
            events.send(Event::Resolve(ResolveEvent::Progress(ResolveProgress::new(
                groups_processed,
                groups.len(),
            ))));
            catalog.checkpoint(files_resolved);
        }

        catalog.save_best_effort();
        events.send(Event::Resolve(ResolveEvent::Completed {
            groups_processed,
            files_resolved,
            cancelled,
        }));

        Ok(ResolutionReport {
            groups_processed,
            files_resolved,
            failures,
            cancelled,
        })
    }

    fn delete_duplicate(&self, path: &Path, catalog: &Catalog) -> io::Result<()> {
        fs::remove_file(path)?;
        catalog.remove(path);

        let mut details = BTreeMap::new();
        details.insert("file_path".to_string(), path.display().to_string());
        catalog.record_history(HistoryAction::DeleteDuplicate, details);

        info!("deleted duplicate {}", path.display());
        Ok(())
    }

    fn move_duplicate(&self, path: &Path, catalog: &Catalog) -> io::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| io::Error::other("path has no parent"))?;
        let duplicates_dir = parent.join("Duplicates");
        fs::create_dir_all(&duplicates_dir)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::other("path has no file name"))?;
        let destination = unique_path(&duplicates_dir.join(file_name));
        fs::rename(path, &destination)?;

        if let Some(mut record) = catalog.get(path) {
            catalog.remove(path);
            record.parent = duplicates_dir.clone();
            record.name = destination
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            record.path = destination.clone();
            catalog.upsert(record);
        }

        let mut details = BTreeMap::new();
        details.insert("original_path".to_string(), path.display().to_string());
        details.insert("new_path".to_string(), destination.display().to_string());
        catalog.record_history(HistoryAction::MoveDuplicate, details);

        info!(
            "moved duplicate {} -> {}",
            path.display(),
            destination.display()
        );
        Ok(())
    }

    /// Replace a duplicate with a link to the keeper. The link is not
    /// re-cataloged as a distinct file.
    fn link_duplicate(
        &self,
        path: &Path,
        keeper: &Path,
        catalog: &Catalog,
        symbolic: bool,
    ) -> io::Result<()> {
        fs::remove_file(path)?;

        if symbolic {
            #[cfg(unix)]
            std::os::unix::fs::symlink(keeper, path)?;
            #[cfg(windows)]
            std::os::windows::fs::symlink_file(keeper, path)?;
        } else {
            fs::hard_link(keeper, path)?;
        }

        catalog.remove(path);

        let action = if symbolic {
            HistoryAction::SymlinkDuplicate
        } else {
            HistoryAction::HardlinkDuplicate
        };
        let mut details = BTreeMap::new();
        details.insert("link_path".to_string(), path.display().to_string());
        details.insert("target_path".to_string(), keeper.display().to_string());
        catalog.record_history(action, details);

        info!(
            "linked duplicate {} -> {}",
            path.display(),
            keeper.display()
        );
        Ok(())
    }

    fn rename_duplicate(&self, path: &Path, catalog: &Catalog) -> io::Result<()> {
        let destination = unique_path_with_tag(path, "duplicate");
        fs::rename(path, &destination)?;
        catalog.remove(path);

        // Re-extract metadata for the renamed path
        match self.reader.read(&destination) {
            Ok(record) => catalog.upsert(record),
            Err(e) => warn!(
                "renamed {} but could not re-catalog it: {e}",
                destination.display()
            ),
        }

        let mut details = BTreeMap::new();
        details.insert("original_path".to_string(), path.display().to_string());
        details.insert("new_path".to_string(), destination.display().to_string());
        catalog.record_history(HistoryAction::RenameDuplicate, details);

        info!(
            "renamed duplicate {} -> {}",
            path.display(),
            destination.display()
        );
        Ok(())
    }
}

/// Default keeper: earliest creation time, ties broken by
/// lexicographically smallest path so selection is deterministic.
fn default_keeper(paths: &[PathBuf], catalog: &Catalog) -> PathBuf {
    paths
        .iter()
        .min_by_key(|p| {
            let created = catalog.get(p).map(|r| r.created).unwrap_or(i64::MAX);
            (created, (*p).clone())
        })
        .cloned()
        .unwrap_or_default()
}
