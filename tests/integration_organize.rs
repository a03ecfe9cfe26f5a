//! Integration tests for the scan -> suggest -> organize -> rename
//! surfaces, including catalog persistence.

use chrono::{Local, TimeZone};
use orderly::config::{OrganizationSettings, ScanningSettings};
use orderly::core::catalog::{Catalog, JsonFileStore};
use orderly::core::organize::{NamingConvention, Organizer};
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

fn organizer(convention: NamingConvention) -> Organizer {
    let settings = OrganizationSettings {
        naming_convention: convention,
        ..Default::default()
    };
    Organizer::new(settings, HashAlgorithm::Sha256, 64 * 1024)
}

#[test]
fn default_rules_route_scanned_files_by_category() {
    let dir = TempDir::new().unwrap();
    let photo = write_file(dir.path(), "photo.jpg", &[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3]);
    let essay = write_file(dir.path(), "essay.docx", b"document body");
    write_file(dir.path(), "mystery.zzz", b"who knows");

    let catalog = scan(dir.path());

    // Derive the expected date folders from what the scanner recorded
    let photo_date = Local
        .timestamp_opt(catalog.get(&photo).unwrap().created, 0)
        .single()
        .unwrap();
    let essay_date = Local
        .timestamp_opt(catalog.get(&essay).unwrap().created, 0)
        .single()
        .unwrap();
    let image_folder = dir
        .path()
        .join(format!("Images/{}", photo_date.format("%Y/%m")));
    let docs_folder = dir
        .path()
        .join(format!("Documents/{}", essay_date.format("%Y")));

    let report = organizer(NamingConvention::Camel)
        .auto_organize(dir.path(), None, &catalog)
        .unwrap();

    assert_eq!(report.moved.len(), 3);
    assert!(image_folder.join("photo.jpg").exists());
    assert!(docs_folder.join("essay.docx").exists());
    assert!(dir.path().join("Misc/mystery.zzz").exists());

    // The catalog followed every move
    assert!(catalog.get(&photo).is_none());
    assert!(catalog.get(&image_folder.join("photo.jpg")).is_some());
}

#[test]
fn moves_preserve_aggregate_statistics() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "one.txt", b"first file");
    write_file(dir.path(), "two.txt", b"second file");

    let catalog = scan(dir.path());
    let before = catalog.stats();

    organizer(NamingConvention::Camel)
        .auto_organize(dir.path(), None, &catalog)
        .unwrap();

    let after = catalog.stats();
    assert_eq!(after.total_size, before.total_size);
    assert_eq!(after.file_count(), before.file_count());
}

#[test]
fn suggestions_summarize_a_scanned_directory() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "IMG_0001.jpg", &[0xFF, 0xD8, 0xFF, 1]);
    write_file(dir.path(), "IMG_0002.jpg", &[0xFF, 0xD8, 0xFF, 2]);
    write_file(dir.path(), "notes.txt", b"text");

    let catalog = scan(dir.path());
    let suggestions = organizer(NamingConvention::Camel)
        .suggest(dir.path(), &catalog)
        .unwrap();

    assert_eq!(suggestions.total_files, 3);
    assert_eq!(suggestions.by_category.get("Images"), Some(&2));
    assert_eq!(suggestions.by_extension.get(".jpg"), Some(&2));
    assert_eq!(suggestions.by_name_pattern.get("numbered_IMG_"), Some(&2));
}

#[test]
fn applied_rename_suggestions_reach_a_fixed_point() {
    let dir = TempDir::new().unwrap();
    let messy = write_file(dir.path(), "My Report Final.PDF", b"pdf-ish bytes");

    let catalog = scan(dir.path());
    let organizer = organizer(NamingConvention::Snake);

    let suggestions = organizer.suggest_renames(&[messy.clone()], &catalog);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].suggested_name, "my_report_final.pdf");

    let report = organizer
        .auto_rename(&[messy.clone()], None, &catalog)
        .unwrap();
    assert_eq!(report.renamed.len(), 1);

    let renamed = dir.path().join("my_report_final.pdf");
    assert!(renamed.exists());

    // Running suggestion generation against the new name is a no-op
    let again = organizer.suggest_renames(&[renamed], &catalog);
    assert!(again.is_empty());
}

#[test]
fn pattern_analysis_accumulates_into_the_catalog() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "2024-01-05 scan.pdf", b"a");
    write_file(dir.path(), "2024-02-06 scan.pdf", b"b");
    write_file(dir.path(), "IMG_1234.jpg", b"c");

    let catalog = scan(dir.path());
    let report = organizer(NamingConvention::Camel).analyze(&catalog).unwrap();

    assert_eq!(report.naming.get("date_prefix"), Some(&2));
    assert_eq!(report.naming.get("numbered_IMG_"), Some(&1));
}

#[test]
fn catalog_persists_across_reopen() {
    let tree = TempDir::new().unwrap();
    write_file(tree.path(), "keep.txt", b"persisted content");

    let store_dir = TempDir::new().unwrap();
    let catalog_path = store_dir.path().join("catalog.json");

    {
        let catalog = Catalog::open(Box::new(JsonFileStore::new(&catalog_path))).unwrap();
        let scanner = FileScanner::new(ScanningSettings::default(), HashAlgorithm::Sha256);
        scanner.scan(tree.path(), &catalog).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    assert!(catalog_path.exists());
    let reopened = Catalog::open(Box::new(JsonFileStore::new(&catalog_path))).unwrap();
    assert_eq!(reopened.len(), 1);

    let record = reopened.get(&tree.path().join("keep.txt")).unwrap();
    assert_eq!(record.size, 17);
    assert!(record.fingerprint.is_some());
}
