//! # Duplicates Module
//!
//! Groups cataloged files into duplicate sets and applies a
//! resolution strategy to each group.
//!
//! ## How It Works
//! 1. Partition cataloged files by exact size (tiny files excluded)
//! 2. Sub-group partitions by fingerprint and/or base name
//! 3. Pick a keeper per group, apply the chosen strategy to the rest
//!
//! Groups are derived data - recomputed each search pass, never
//! persisted.

mod finder;
mod resolver;

pub use resolver::{DuplicateResolver, KeepSelector, ResolutionReport};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How files are matched within a size partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMethod {
    /// Match by content fingerprint
    #[default]
    Content,
    /// Match by base file name
    Name,
    /// Match both ways; overlapping groups are kept separate
    Both,
}

impl CompareMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Name => "name",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for CompareMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with the non-keeper members of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    /// Remove the file
    Delete,
    /// Relocate into a sibling `Duplicates/` folder
    Move,
    /// Replace with a symbolic link to the keeper
    Symlink,
    /// Replace with a hard link to the keeper
    Hardlink,
    /// Rename in place with a `_duplicate` suffix
    Rename,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Symlink => "symlink",
            Self::Hardlink => "hardlink",
            Self::Rename => "rename",
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a duplicate group was keyed on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    /// Shared content fingerprint (hex digest)
    Fingerprint(String),
    /// Shared base name
    Name(String),
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKey::Fingerprint(digest) => f.write_str(digest),
            GroupKey::Name(name) => write!(f, "name:{name}"),
        }
    }
}

/// Files sharing a key within one size partition.
///
/// Invariant: at least two members; in content mode every member has
/// the same size and fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub key: GroupKey,
    /// Member paths, sorted lexicographically
    pub paths: Vec<PathBuf>,
    /// Size of each member in bytes
    pub file_size: u64,
}

impl DuplicateGroup {
    /// Members beyond the one copy worth keeping.
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes recoverable by resolving this group.
    pub fn wasted_bytes(&self) -> u64 {
        self.file_size * self.duplicate_count() as u64
    }
}

/// Summary over one duplicate search.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateReport {
    pub groups: usize,
    pub duplicates: usize,
    pub total_size: u64,
    pub wasted_bytes: u64,
    pub cancelled: bool,
}

impl DuplicateReport {
    pub fn from_groups(groups: &[DuplicateGroup], cancelled: bool) -> Self {
        Self {
            groups: groups.len(),
            duplicates: groups.iter().map(|g| g.duplicate_count()).sum(),
            total_size: groups
                .iter()
                .map(|g| g.file_size * g.paths.len() as u64)
                .sum(),
            wasted_bytes: groups.iter().map(|g| g.wasted_bytes()).sum(),
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_keys_render_with_prefix() {
        let key = GroupKey::Name("photo.jpg".to_string());
        assert_eq!(key.to_string(), "name:photo.jpg");

        let key = GroupKey::Fingerprint("abc123".to_string());
        assert_eq!(key.to_string(), "abc123");
    }

    #[test]
    fn wasted_bytes_excludes_the_keeper() {
        let group = DuplicateGroup {
            key: GroupKey::Fingerprint("f".to_string()),
            paths: vec![
                PathBuf::from("/a"),
                PathBuf::from("/b"),
                PathBuf::from("/c"),
            ],
            file_size: 100,
        };
        assert_eq!(group.duplicate_count(), 2);
        assert_eq!(group.wasted_bytes(), 200);
    }

    #[test]
    fn report_aggregates_groups() {
        let groups = vec![
            DuplicateGroup {
                key: GroupKey::Fingerprint("a".to_string()),
                paths: vec![PathBuf::from("/1"), PathBuf::from("/2")],
                file_size: 10,
            },
            DuplicateGroup {
                key: GroupKey::Name("x".to_string()),
                paths: vec![
                    PathBuf::from("/3"),
                    PathBuf::from("/4"),
                    PathBuf::from("/5"),
                ],
                file_size: 5,
            },
        ];

        let report = DuplicateReport::from_groups(&groups, false);
        assert_eq!(report.groups, 2);
        assert_eq!(report.duplicates, 3);
        assert_eq!(report.total_size, 35);
        assert_eq!(report.wasted_bytes, 20);
    }
}
