//! Entry filtering for the directory walk.

use crate::config::ScanningSettings;
use std::collections::HashSet;

#[cfg(windows)]
const SYSTEM_DIRS: &[&str] = &["windows", "system volume information", "$recycle.bin"];
#[cfg(windows)]
const SYSTEM_FILES: &[&str] = &["thumbs.db", "desktop.ini", "ntuser.dat"];

#[cfg(not(windows))]
const SYSTEM_DIR_PREFIXES: &[&str] = &[
    "__MACOSX",
    ".Trash",
    ".fseventsd",
    ".Spotlight-V100",
    "System Volume Information",
];
#[cfg(not(windows))]
const SYSTEM_FILES: &[&str] = &[".DS_Store", ".localized"];

/// Decides which directories are pruned and which files are skipped.
pub struct EntryFilter {
    ignore_hidden: bool,
    ignore_system: bool,
    excluded: HashSet<String>,
    max_size: Option<u64>,
}

impl EntryFilter {
    pub fn from_settings(settings: &ScanningSettings) -> Self {
        Self {
            ignore_hidden: settings.ignore_hidden_files,
            ignore_system: settings.ignore_system_files,
            excluded: settings.excluded_list().into_iter().collect(),
            max_size: settings.max_file_size_bytes(),
        }
    }

    fn is_hidden(name: &str) -> bool {
        name.starts_with('.')
    }

    #[cfg(windows)]
    fn is_system_dir(name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        SYSTEM_DIRS.iter().any(|d| *d == lower)
    }

    #[cfg(not(windows))]
    fn is_system_dir(name: &str) -> bool {
        SYSTEM_DIR_PREFIXES.iter().any(|p| name.starts_with(p))
    }

    #[cfg(windows)]
    fn is_system_file(name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        SYSTEM_FILES.iter().any(|f| *f == lower)
    }

    #[cfg(not(windows))]
    fn is_system_file(name: &str) -> bool {
        SYSTEM_FILES.iter().any(|f| *f == name)
    }

    /// Whether to descend into a subdirectory.
    pub fn should_descend(&self, name: &str) -> bool {
        if self.excluded.contains(name) {
            return false;
        }
        if self.ignore_hidden && Self::is_hidden(name) {
            return false;
        }
        if self.ignore_system && Self::is_system_dir(name) {
            return false;
        }
        true
    }

    /// Whether a file name passes the hidden/system exclusions.
    pub fn should_include_file(&self, name: &str) -> bool {
        if self.ignore_hidden && Self::is_hidden(name) {
            return false;
        }
        if self.ignore_system && Self::is_system_file(name) {
            return false;
        }
        true
    }

    /// Whether a file is above the configured size limit.
    pub fn exceeds_max_size(&self, size: u64) -> bool {
        matches!(self.max_size, Some(max) if size > max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> EntryFilter {
        EntryFilter::from_settings(&ScanningSettings::default())
    }

    #[test]
    fn excluded_folders_are_pruned() {
        let f = filter();
        assert!(!f.should_descend("node_modules"));
        assert!(!f.should_descend(".git"));
        assert!(f.should_descend("photos"));
    }

    #[test]
    fn hidden_entries_are_skipped_by_default() {
        let f = filter();
        assert!(!f.should_descend(".cache"));
        assert!(!f.should_include_file(".profile"));
        assert!(f.should_include_file("notes.txt"));
    }

    #[test]
    fn hidden_entries_can_be_included() {
        let settings = ScanningSettings {
            ignore_hidden_files: false,
            excluded_folders: String::new(),
            ..Default::default()
        };
        let f = EntryFilter::from_settings(&settings);
        assert!(f.should_descend(".cache"));
        assert!(f.should_include_file(".profile"));
    }

    #[cfg(not(windows))]
    #[test]
    fn system_entries_are_skipped() {
        let f = filter();
        assert!(!f.should_descend("__MACOSX"));
        assert!(!f.should_descend(".Trash-1000"));
        assert!(!f.should_include_file(".DS_Store"));
    }

    #[test]
    fn size_limit_applies_when_configured() {
        let settings = ScanningSettings {
            max_file_size_mb: 1,
            ..Default::default()
        };
        let f = EntryFilter::from_settings(&settings);
        assert!(!f.exceeds_max_size(1024));
        assert!(f.exceeds_max_size(2 * 1024 * 1024));
    }

    #[test]
    fn zero_limit_disables_size_check() {
        let settings = ScanningSettings {
            max_file_size_mb: 0,
            ..Default::default()
        };
        let f = EntryFilter::from_settings(&settings);
        assert!(!f.exceeds_max_size(u64::MAX));
    }
}
