//! Integration tests for the scan -> duplicate search -> resolution
//! pipeline.
//!
//! These tests drive real files through the scanner so grouping and
//! resolution see catalog records the way production does.

use orderly::config::{DuplicateSettings, ScanningSettings};
use orderly::core::catalog::Catalog;
use orderly::core::dupes::{CompareMethod, DuplicateResolver, GroupKey, ResolutionMethod};
use orderly::core::scanner::{FileScanner, HashAlgorithm};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(content).unwrap();
    path
}

fn scan(root: &Path) -> Catalog {
    let catalog = Catalog::in_memory();
    let scanner = FileScanner::new(ScanningSettings::default(), HashAlgorithm::Sha256);
    scanner.scan(root, &catalog).unwrap();
    catalog
}

fn resolver() -> DuplicateResolver {
    let settings = DuplicateSettings {
        min_size_kb: 0,
        compare_method: CompareMethod::Content,
        hash_algorithm: HashAlgorithm::Sha256,
    };
    DuplicateResolver::new(settings, 64 * 1024)
}

#[test]
fn three_identical_files_form_one_group() {
    let dir = TempDir::new().unwrap();
    for sub in ["one", "two", "three"] {
        fs::create_dir(dir.path().join(sub)).unwrap();
    }
    write_file(&dir.path().join("one"), "a.txt", b"identical content");
    write_file(&dir.path().join("two"), "b.txt", b"identical content");
    write_file(&dir.path().join("three"), "a.txt", b"identical content");
    write_file(dir.path(), "unrelated.txt", b"something else entirely");

    let catalog = scan(dir.path());
    let groups = resolver().find(&catalog).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 3);
    assert!(matches!(groups[0].key, GroupKey::Fingerprint(_)));
}

#[test]
fn content_groups_share_size_and_fingerprint() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.bin", b"payload-one");
    write_file(dir.path(), "b.bin", b"payload-one");
    write_file(dir.path(), "c.bin", b"payload-two");
    write_file(dir.path(), "d.bin", b"payload-two");
    write_file(dir.path(), "e.bin", b"unique content here");

    let catalog = scan(dir.path());
    let groups = resolver().find(&catalog).unwrap();

    assert_eq!(groups.len(), 2);
    for group in &groups {
        assert!(group.paths.len() >= 2);

        let GroupKey::Fingerprint(expected) = &group.key else {
            panic!("content mode must key groups by fingerprint");
        };
        for path in &group.paths {
            let record = catalog.get(path).unwrap();
            assert_eq!(record.size, group.file_size);
            assert_eq!(record.fingerprint.as_ref(), Some(expected));
        }
    }
}

#[test]
fn rename_resolution_keeps_oldest_and_tags_the_rest() {
    let dir = TempDir::new().unwrap();
    for sub in ["one", "two", "three"] {
        fs::create_dir(dir.path().join(sub)).unwrap();
    }
    let keeper = write_file(&dir.path().join("one"), "a.txt", b"identical content");
    write_file(&dir.path().join("two"), "b.txt", b"identical content");
    write_file(&dir.path().join("three"), "a.txt", b"identical content");

    let catalog = scan(dir.path());
    let resolver = resolver();
    let groups = resolver.find(&catalog).unwrap();
    assert_eq!(groups.len(), 1);

    let report = resolver
        .resolve(&groups, ResolutionMethod::Rename, &catalog)
        .unwrap();
    assert_eq!(report.files_resolved, 2);

    // Creation times tie within the test, so the lexicographically
    // smallest path ("one/a.txt") is kept untouched
    assert!(keeper.exists());
    assert!(dir.path().join("two").join("b_duplicate.txt").exists());
    assert!(dir.path().join("three").join("a_duplicate.txt").exists());

    // Renamed files were re-cataloged under the new names
    assert!(catalog
        .get(&dir.path().join("two").join("b_duplicate.txt"))
        .is_some());
}

#[test]
fn rename_collisions_append_a_counter() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("x")).unwrap();
    fs::create_dir(dir.path().join("y")).unwrap();
    write_file(&dir.path().join("x"), "a.txt", b"identical content");
    let loser = write_file(&dir.path().join("y"), "a.txt", b"identical content");
    // The natural rename target already exists
    write_file(&dir.path().join("y"), "a_duplicate.txt", b"other bytes 123");

    let catalog = scan(dir.path());
    let resolver = resolver();
    let groups = resolver.find(&catalog).unwrap();
    assert_eq!(groups.len(), 1);

    resolver
        .resolve(&groups, ResolutionMethod::Rename, &catalog)
        .unwrap();

    assert!(!loser.exists());
    assert!(dir.path().join("y").join("a_duplicate_1.txt").exists());
}

#[test]
fn delete_resolution_leaves_exactly_one_survivor() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"identical content");
    write_file(dir.path(), "b.txt", b"identical content");
    write_file(dir.path(), "c.txt", b"identical content");

    let catalog = scan(dir.path());
    let resolver = resolver();
    let groups = resolver.find(&catalog).unwrap();

    resolver
        .resolve(&groups, ResolutionMethod::Delete, &catalog)
        .unwrap();

    let survivors: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .collect();
    assert_eq!(survivors.len(), 1);
    assert_eq!(catalog.len(), 1);
}

#[test]
fn min_size_excludes_tiny_files_entirely() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", b"tiny");
    write_file(dir.path(), "b.txt", b"tiny");

    let catalog = scan(dir.path());

    // Default settings exclude files under 10 KiB
    let strict = DuplicateResolver::new(DuplicateSettings::default(), 64 * 1024);
    assert!(strict.find(&catalog).unwrap().is_empty());
}

#[test]
fn stats_survive_a_delete_round_trip() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "keep.txt", b"identical content");
    write_file(dir.path(), "drop.txt", b"identical content");

    let catalog = scan(dir.path());
    let before = catalog.stats();
    assert_eq!(before.total_size, 34);

    let resolver = resolver();
    let groups = resolver.find(&catalog).unwrap();
    resolver
        .resolve(&groups, ResolutionMethod::Delete, &catalog)
        .unwrap();

    let after = catalog.stats();
    assert_eq!(after.total_size, 17);
    assert_eq!(after.file_count(), 1);
}
