//! Naming and directory pattern extraction.

use crate::core::catalog::Category;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn date_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap())
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\D+)(\d+)$").unwrap())
}

fn word_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]+)_").unwrap())
}

fn dir_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}([-_/]\d{2})?$").unwrap())
}

/// Classify a filename into at most one naming pattern.
///
/// Checked in priority order: leading ISO date, trailing number run,
/// letters-only prefix before an underscore. Names matching none are
/// excluded from pattern counts.
pub fn extract_name_pattern(filename: &str) -> Option<String> {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    if date_prefix_re().is_match(stem) {
        return Some("date_prefix".to_string());
    }

    if let Some(captures) = numbered_re().captures(stem) {
        return Some(format!("numbered_{}", &captures[1]));
    }

    if let Some(captures) = word_prefix_re().captures(stem) {
        return Some(format!("prefix_{}", &captures[1]));
    }

    None
}

/// Classify a parent directory's final segment into at most one
/// organization pattern.
pub fn extract_dir_pattern(dir: &Path) -> Option<&'static str> {
    let last = dir.file_name().and_then(|n| n.to_str())?;

    if Category::from_label(last).is_some() {
        return Some("category_based");
    }

    if dir_date_re().is_match(last) {
        return Some("date_based");
    }

    if last.len() == 1 && last.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some("alphabetical");
    }

    None
}
