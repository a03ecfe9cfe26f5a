//! Duplicate group construction: size partitions, then key grouping.

use super::{CompareMethod, DuplicateGroup, DuplicateReport, GroupKey};
use crate::core::catalog::FileRecord;
use crate::core::task::CancellationToken;
use crate::events::{DuplicateEvent, DuplicateProgress, Event, EventSender};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

fn push_group(groups: &mut Vec<DuplicateGroup>, key: GroupKey, mut paths: Vec<PathBuf>, size: u64) {
    if paths.len() < 2 {
        return;
    }
    paths.sort();
    groups.push(DuplicateGroup {
        key,
        paths,
        file_size: size,
    });
}

fn content_groups(groups: &mut Vec<DuplicateGroup>, partition: &[&FileRecord], size: u64) {
    let mut by_fingerprint: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
    for record in partition {
        // Files that could not be hashed never group
        if let Some(fingerprint) = record.fingerprint.as_deref() {
            by_fingerprint
                .entry(fingerprint)
                .or_default()
                .push(record.path.clone());
        }
    }
    for (fingerprint, paths) in by_fingerprint {
        push_group(
            groups,
            GroupKey::Fingerprint(fingerprint.to_string()),
            paths,
            size,
        );
    }
}

fn name_groups(groups: &mut Vec<DuplicateGroup>, partition: &[&FileRecord], size: u64) {
    let mut by_name: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
    for record in partition {
        by_name
            .entry(record.name.as_str())
            .or_default()
            .push(record.path.clone());
    }
    for (name, paths) in by_name {
        push_group(groups, GroupKey::Name(name.to_string()), paths, size);
    }
}

/// Group cataloged files into duplicate sets.
///
/// Cancellation is checked between size partitions; progress is
/// reported per partition to bound callback overhead. In `Both` mode
/// a pair matching by content and by name appears in two separate
/// groups; overlapping groups are intentionally not merged.
pub(super) fn build_groups(
    records: &BTreeMap<PathBuf, FileRecord>,
    min_size: u64,
    method: CompareMethod,
    events: &EventSender,
    cancel: &CancellationToken,
) -> (Vec<DuplicateGroup>, bool) {
    let mut by_size: BTreeMap<u64, Vec<&FileRecord>> = BTreeMap::new();
    for record in records.values() {
        if record.size < min_size {
            continue;
        }
        by_size.entry(record.size).or_default().push(record);
    }

    let partitions: Vec<(u64, Vec<&FileRecord>)> = by_size
        .into_iter()
        .filter(|(_, files)| files.len() >= 2)
        .collect();

    let total = partitions.len();
    debug!("{total} size partitions with potential duplicates");
    events.send(Event::Duplicate(DuplicateEvent::Started {
        total_partitions: total,
    }));

    let mut groups = Vec::new();
    let mut cancelled = false;

    for (processed, (size, partition)) in partitions.into_iter().enumerate() {
        if cancel.is_cancelled() {
            info!("duplicate search cancelled");
            cancelled = true;
            break;
        }

        match method {
            CompareMethod::Content => content_groups(&mut groups, &partition, size),
            CompareMethod::Name => name_groups(&mut groups, &partition, size),
            CompareMethod::Both => {
                content_groups(&mut groups, &partition, size);
                name_groups(&mut groups, &partition, size);
            }
        }

        events.send(Event::Duplicate(DuplicateEvent::Progress(
            DuplicateProgress::new(processed + 1, total, groups.len()),
        )));
    }

    let report = DuplicateReport::from_groups(&groups, cancelled);
    events.send(Event::Duplicate(DuplicateEvent::Completed {
        groups: report.groups,
        duplicates: report.duplicates,
        wasted_bytes: report.wasted_bytes,
        cancelled,
    }));

    (groups, cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Category;
    use crate::events::null_sender;
    use std::path::Path;

    fn record(path: &str, size: u64, fingerprint: Option<&str>) -> FileRecord {
        let path = PathBuf::from(path);
        FileRecord {
            name: path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap()
                .to_string(),
            parent: path.parent().unwrap_or(Path::new("/")).to_path_buf(),
            path,
            size,
            created: 0,
            modified: 0,
            accessed: 0,
            extension: ".txt".to_string(),
            hidden: false,
            mime_type: "text/plain".to_string(),
            category: Category::Documents,
            fingerprint: fingerprint.map(str::to_string),
            text_sample: None,
            scanned_at: 0,
        }
    }

    fn catalog_of(records: Vec<FileRecord>) -> BTreeMap<PathBuf, FileRecord> {
        records.into_iter().map(|r| (r.path.clone(), r)).collect()
    }

    fn find(
        records: &BTreeMap<PathBuf, FileRecord>,
        min_size: u64,
        method: CompareMethod,
    ) -> Vec<DuplicateGroup> {
        build_groups(
            records,
            min_size,
            method,
            &null_sender(),
            &CancellationToken::new(),
        )
        .0
    }

    #[test]
    fn content_groups_require_matching_size_and_fingerprint() {
        let records = catalog_of(vec![
            record("/x/a.txt", 100, Some("f1")),
            record("/y/b.txt", 100, Some("f1")),
            record("/z/c.txt", 100, Some("f2")),
            record("/w/d.txt", 200, Some("f1")),
        ]);

        let groups = find(&records, 0, CompareMethod::Content);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths.len(), 2);
        assert_eq!(groups[0].key, GroupKey::Fingerprint("f1".to_string()));
        assert_eq!(groups[0].file_size, 100);
    }

    #[test]
    fn small_files_are_excluded_entirely() {
        let records = catalog_of(vec![
            record("/x/a.txt", 100, Some("f1")),
            record("/y/b.txt", 100, Some("f1")),
        ]);

        let groups = find(&records, 1024, CompareMethod::Content);
        assert!(groups.is_empty());
    }

    #[test]
    fn missing_fingerprints_never_group() {
        let records = catalog_of(vec![
            record("/x/a.txt", 100, None),
            record("/y/b.txt", 100, None),
        ]);

        let groups = find(&records, 0, CompareMethod::Content);
        assert!(groups.is_empty());
    }

    #[test]
    fn name_mode_groups_same_basename() {
        let records = catalog_of(vec![
            record("/x/notes.txt", 100, Some("f1")),
            record("/y/notes.txt", 100, Some("f2")),
            record("/z/other.txt", 100, Some("f3")),
        ]);

        let groups = find(&records, 0, CompareMethod::Name);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, GroupKey::Name("notes.txt".to_string()));
    }

    #[test]
    fn both_mode_keeps_overlapping_groups() {
        // Same content AND same name: one group per key, not merged
        let records = catalog_of(vec![
            record("/x/same.txt", 100, Some("f1")),
            record("/y/same.txt", 100, Some("f1")),
        ]);

        let groups = find(&records, 0, CompareMethod::Both);
        assert_eq!(groups.len(), 2);
        let keys: Vec<String> = groups.iter().map(|g| g.key.to_string()).collect();
        assert!(keys.contains(&"f1".to_string()));
        assert!(keys.contains(&"name:same.txt".to_string()));
    }

    #[test]
    fn three_identical_files_form_one_group() {
        let records = catalog_of(vec![
            record("/one/a.txt", 64, Some("f1")),
            record("/two/b.txt", 64, Some("f1")),
            record("/three/a.txt", 64, Some("f1")),
        ]);

        let groups = find(&records, 0, CompareMethod::Content);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths.len(), 3);
    }

    #[test]
    fn cancelled_search_reports_cancellation() {
        let records = catalog_of(vec![
            record("/x/a.txt", 100, Some("f1")),
            record("/y/b.txt", 100, Some("f1")),
        ]);

        let token = CancellationToken::new();
        token.cancel();
        let (groups, cancelled) = build_groups(
            &records,
            0,
            CompareMethod::Content,
            &null_sender(),
            &token,
        );

        assert!(cancelled);
        assert!(groups.is_empty());
    }
}
