//! The organizer component: pattern analysis, suggestions, and
//! rule-driven moves and renames.

use super::patterns::{extract_dir_pattern, extract_name_pattern};
use super::rename::{suggest_name, RenameSuggestion};
use super::rules::{default_rules, evaluate, OrganizationRule};
use crate::config::OrganizationSettings;
use crate::core::catalog::{Catalog, FileRecord, HistoryAction, PatternKind};
use crate::core::fsutil::unique_path;
use crate::core::scanner::{HashAlgorithm, MetadataReader};
use crate::core::task::{CancellationToken, OperationGuard};
use crate::error::OrganizeError;
use crate::events::{
    null_sender, Event, EventSender, OrganizeEvent, OrganizeOperation, OrganizeProgress,
};
use chrono::{Local, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Grouping counts offered for user review before organizing.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizeSuggestions {
    pub by_category: BTreeMap<String, usize>,
    pub by_extension: BTreeMap<String, usize>,
    pub by_month: BTreeMap<String, usize>,
    pub by_name_pattern: BTreeMap<String, usize>,
    pub total_files: usize,
}

/// Outcome of a pattern analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    pub naming: BTreeMap<String, u64>,
    pub organization: BTreeMap<String, u64>,
    pub files_analyzed: usize,
    pub cancelled: bool,
}

/// One applied relocation or rename.
#[derive(Debug, Clone, Serialize)]
pub struct MoveRecord {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of an auto-organize pass.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizeRunReport {
    pub processed: usize,
    pub total: usize,
    pub moved: Vec<MoveRecord>,
    pub failures: usize,
    pub cancelled: bool,
}

/// Outcome of an auto-rename pass.
#[derive(Debug, Clone, Serialize)]
pub struct RenameRunReport {
    pub processed: usize,
    pub total: usize,
    pub renamed: Vec<MoveRecord>,
    /// Files skipped because the target name already existed
    pub skipped: usize,
    pub failures: usize,
    pub cancelled: bool,
}

/// Derives organization patterns and applies rule-based moves and
/// renames. One operation at a time; requests while busy are
/// rejected immediately.
pub struct Organizer {
    settings: OrganizationSettings,
    reader: MetadataReader,
    guard: OperationGuard,
}

impl Organizer {
    pub fn new(
        settings: OrganizationSettings,
        algorithm: HashAlgorithm,
        chunk_size_bytes: usize,
    ) -> Self {
        Self {
            settings,
            reader: MetadataReader::new(algorithm, chunk_size_bytes),
            guard: OperationGuard::new(),
        }
    }

    /// Analyze naming and directory patterns across the whole catalog.
    pub fn analyze(&self, catalog: &Catalog) -> Result<PatternReport, OrganizeError> {
        self.analyze_with_events(catalog, &null_sender(), &CancellationToken::new())
    }

    pub fn analyze_with_events(
        &self,
        catalog: &Catalog,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<PatternReport, OrganizeError> {
        let _permit = self.guard.try_begin().ok_or(OrganizeError::Busy)?;

        let records = catalog.all();
        let total = records.len();
        info!("analyzing organization patterns across {total} files");
        events.send(Event::Organize(OrganizeEvent::Started {
            operation: OrganizeOperation::Analyze,
            total,
        }));

        let mut naming: BTreeMap<String, u64> = BTreeMap::new();
        let mut processed = 0usize;
        let mut cancelled = false;

        for record in records.values() {
            if cancel.is_cancelled() {
                info!("pattern analysis cancelled");
                cancelled = true;
                break;
            }

            if let Some(pattern) = extract_name_pattern(&record.name) {
                *naming.entry(pattern).or_insert(0) += 1;
            }
            processed += 1;

            if processed % 100 == 0 {
                events.send(Event::Organize(OrganizeEvent::Progress(
                    OrganizeProgress::new(processed, total, record.path.clone()),
                )));
            }
        }

        let mut organization: BTreeMap<String, u64> = BTreeMap::new();
        if !cancelled {
            for record in records.values() {
                if let Some(pattern) = extract_dir_pattern(&record.parent) {
                    *organization.entry(pattern.to_string()).or_insert(0) += 1;
                }
            }
        }

        for (pattern, count) in &naming {
            catalog.bump_pattern(PatternKind::Naming, pattern, *count);
        }
        for (pattern, count) in &organization {
            catalog.bump_pattern(PatternKind::Organization, pattern, *count);
        }
        catalog.save_best_effort();

        events.send(Event::Organize(OrganizeEvent::Completed {
            operation: OrganizeOperation::Analyze,
            processed,
            total,
            cancelled,
        }));

        Ok(PatternReport {
            naming,
            organization,
            files_analyzed: processed,
            cancelled,
        })
    }

    /// Group a directory's cataloged files for user review.
    pub fn suggest(
        &self,
        directory: &Path,
        catalog: &Catalog,
    ) -> Result<OrganizeSuggestions, OrganizeError> {
        self.suggest_with_events(directory, catalog, &null_sender())
    }

    pub fn suggest_with_events(
        &self,
        directory: &Path,
        catalog: &Catalog,
        events: &EventSender,
    ) -> Result<OrganizeSuggestions, OrganizeError> {
        let _permit = self.guard.try_begin().ok_or(OrganizeError::Busy)?;

        let records = catalog.records_under(directory);
        let total = records.len();
        events.send(Event::Organize(OrganizeEvent::Started {
            operation: OrganizeOperation::Suggest,
            total,
        }));

        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_extension: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_month: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_name_pattern: BTreeMap<String, usize> = BTreeMap::new();

        for record in &records {
            *by_category
                .entry(record.category.as_str().to_string())
                .or_insert(0) += 1;

            if !record.extension.is_empty() {
                *by_extension.entry(record.extension.clone()).or_insert(0) += 1;
            }

            if record.created > 0 {
                if let Some(date) = Local.timestamp_opt(record.created, 0).single() {
                    *by_month
                        .entry(date.format("%Y-%m").to_string())
                        .or_insert(0) += 1;
                }
            }

            if let Some(pattern) = extract_name_pattern(&record.name) {
                *by_name_pattern.entry(pattern).or_insert(0) += 1;
            }
        }

        events.send(Event::Organize(OrganizeEvent::Completed {
            operation: OrganizeOperation::Suggest,
            processed: total,
            total,
            cancelled: false,
        }));

        Ok(OrganizeSuggestions {
            by_category,
            by_extension,
            by_month,
            by_name_pattern,
            total_files: total,
        })
    }

    /// Rename suggestions for a set of cataloged files. Files without
    /// a catalog record are passed over.
    pub fn suggest_renames(&self, files: &[PathBuf], catalog: &Catalog) -> Vec<RenameSuggestion> {
        files
            .iter()
            .filter_map(|path| catalog.get(path))
            .filter_map(|record| {
                suggest_name(
                    &record,
                    self.settings.naming_convention,
                    !self.settings.preserve_original,
                )
            })
            .collect()
    }

    /// Move files under `directory` to rule-derived destinations.
    pub fn auto_organize(
        &self,
        directory: &Path,
        rules: Option<Vec<OrganizationRule>>,
        catalog: &Catalog,
    ) -> Result<OrganizeRunReport, OrganizeError> {
        self.auto_organize_with_events(
            directory,
            rules,
            catalog,
            &null_sender(),
            &CancellationToken::new(),
        )
    }

    pub fn auto_organize_with_events(
        &self,
        directory: &Path,
        rules: Option<Vec<OrganizationRule>>,
        catalog: &Catalog,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<OrganizeRunReport, OrganizeError> {
        let _permit = self.guard.try_begin().ok_or(OrganizeError::Busy)?;

        if !directory.is_dir() {
            return Err(OrganizeError::DirectoryNotFound {
                path: directory.to_path_buf(),
            });
        }

        let rules = rules.unwrap_or_else(default_rules);
        let files = enumerate_files(directory);
        let total = files.len();
        info!("auto-organizing {total} files under {}", directory.display());
        events.send(Event::Organize(OrganizeEvent::Started {
            operation: OrganizeOperation::AutoOrganize,
            total,
        }));

        let mut processed = 0usize;
        let mut moved = Vec::new();
        let mut failures = 0usize;
        let mut cancelled = false;

        for path in files {
            if cancel.is_cancelled() {
                info!("auto-organize cancelled");
                cancelled = true;
                break;
            }

            events.send(Event::Organize(OrganizeEvent::Progress(
                OrganizeProgress::new(processed + 1, total, path.clone()),
            )));

            // Files not yet cataloged are scanned on the fly
            let record = match catalog.get(&path) {
                Some(record) => record,
                None => match self.reader.read(&path) {
                    Ok(record) => {
                        catalog.upsert(record.clone());
                        record
                    }
                    Err(e) => {
                        warn!("cannot read {}: {e}", path.display());
                        failures += 1;
                        events.send(Event::Organize(OrganizeEvent::Error {
                            path,
                            message: e.to_string(),
                        }));
                        processed += 1;
                        continue;
                    }
                },
            };

            if let Some(destination) = evaluate(&rules, &record) {
                if destination != record.parent {
                    match move_to(&record, &destination, catalog) {
                        Ok(new_path) => {
                            events.send(Event::Organize(OrganizeEvent::Moved {
                                from: record.path.clone(),
                                to: new_path.clone(),
                            }));
                            moved.push(MoveRecord {
                                from: record.path.clone(),
                                to: new_path,
                            });
                        }
                        Err(e) => {
                            warn!("cannot move {}: {e}", record.path.display());
                            failures += 1;
                            events.send(Event::Organize(OrganizeEvent::Error {
                                path: record.path.clone(),
                                message: e.to_string(),
                            }));
                        }
                    }
                }
            }

            processed += 1;
            catalog.checkpoint(processed);
        }

        catalog.save_best_effort();
        info!("auto-organize moved {} of {total} files", moved.len());

        events.send(Event::Organize(OrganizeEvent::Completed {
            operation: OrganizeOperation::AutoOrganize,
            processed,
            total,
            cancelled,
        }));

        Ok(OrganizeRunReport {
            processed,
            total,
            moved,
            failures,
            cancelled,
        })
    }

    /// Rename files in place, from a supplied mapping or generated
    /// suggestions. Existing target names skip the file.
    pub fn auto_rename(
        &self,
        files: &[PathBuf],
        mapping: Option<BTreeMap<PathBuf, String>>,
        catalog: &Catalog,
    ) -> Result<RenameRunReport, OrganizeError> {
        self.auto_rename_with_events(
            files,
            mapping,
            catalog,
            &null_sender(),
            &CancellationToken::new(),
        )
    }

    pub fn auto_rename_with_events(
        &self,
        files: &[PathBuf],
        mapping: Option<BTreeMap<PathBuf, String>>,
        catalog: &Catalog,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<RenameRunReport, OrganizeError> {
        let mapping = mapping.unwrap_or_else(|| {
            self.suggest_renames(files, catalog)
                .into_iter()
                .map(|s| (s.path, s.suggested_name))
                .collect()
        });

        let _permit = self.guard.try_begin().ok_or(OrganizeError::Busy)?;

        let total = files.len();
        info!("auto-renaming {total} files");
        events.send(Event::Organize(OrganizeEvent::Started {
            operation: OrganizeOperation::AutoRename,
            total,
        }));

        let mut processed = 0usize;
        let mut renamed = Vec::new();
        let mut skipped = 0usize;
        let mut failures = 0usize;
        let mut cancelled = false;

        for path in files {
            if cancel.is_cancelled() {
                info!("auto-rename cancelled");
                cancelled = true;
                break;
            }

            events.send(Event::Organize(OrganizeEvent::Progress(
                OrganizeProgress::new(processed + 1, total, path.clone()),
            )));

            let Some(new_name) = mapping.get(path) else {
                processed += 1;
                continue;
            };

            let target = path
                .parent()
                .unwrap_or(Path::new(""))
                .join(new_name);

            if target.exists() {
                warn!(
                    "cannot rename {}: {} already exists",
                    path.display(),
                    target.display()
                );
                skipped += 1;
                processed += 1;
                continue;
            }

            match rename_to(path, &target, new_name, catalog) {
                Ok(()) => {
                    events.send(Event::Organize(OrganizeEvent::Renamed {
                        from: path.clone(),
                        to: target.clone(),
                    }));
                    renamed.push(MoveRecord {
                        from: path.clone(),
                        to: target,
                    });
                }
                Err(e) => {
                    warn!("cannot rename {}: {e}", path.display());
                    failures += 1;
                    events.send(Event::Organize(OrganizeEvent::Error {
                        path: path.clone(),
                        message: e.to_string(),
                    }));
                }
            }

            processed += 1;
            catalog.checkpoint(processed);
        }

        catalog.save_best_effort();

        events.send(Event::Organize(OrganizeEvent::Completed {
            operation: OrganizeOperation::AutoRename,
            processed,
            total,
            cancelled,
        }));

        Ok(RenameRunReport {
            processed,
            total,
            renamed,
            skipped,
            failures,
            cancelled,
        })
    }
}

/// Every file under the directory, in deterministic order. The
/// organizer works on whatever is present; scan-time filters do not
/// apply here.
fn enumerate_files(directory: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    files.sort();
    files
}

fn move_to(record: &FileRecord, destination: &Path, catalog: &Catalog) -> io::Result<PathBuf> {
    fs::create_dir_all(destination)?;
    let target = unique_path(&destination.join(&record.name));
    fs::rename(&record.path, &target)?;

    catalog.remove(&record.path);
    let mut new_record = record.clone();
    new_record.parent = destination.to_path_buf();
    new_record.name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    new_record.path = target.clone();
    catalog.upsert(new_record);

    let mut details = BTreeMap::new();
    details.insert(
        "original_path".to_string(),
        record.path.display().to_string(),
    );
    details.insert("new_path".to_string(), target.display().to_string());
    catalog.record_history(HistoryAction::Move, details);

    info!("moved {} -> {}", record.path.display(), target.display());
    Ok(target)
}

fn rename_to(path: &Path, target: &Path, new_name: &str, catalog: &Catalog) -> io::Result<()> {
    fs::rename(path, target)?;

    if let Some(mut record) = catalog.get(path) {
        catalog.remove(path);
        record.name = new_name.to_string();
        record.path = target.to_path_buf();
        record.extension = crate::core::scanner::normalized_extension(target);
        catalog.upsert(record);
    }

    let mut details = BTreeMap::new();
    details.insert("original_path".to_string(), path.display().to_string());
    details.insert("new_path".to_string(), target.display().to_string());
    catalog.record_history(HistoryAction::Rename, details);

    info!("renamed {} -> {}", path.display(), target.display());
    Ok(())
}
