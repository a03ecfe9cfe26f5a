//! Small filesystem helpers shared by resolution and organization.

use std::path::{Path, PathBuf};

/// Build `stem<suffix>.ext` next to the original.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let name = if ext.is_empty() {
        format!("{stem}{suffix}")
    } else {
        format!("{stem}{suffix}.{ext}")
    };
    path.parent().unwrap_or(Path::new("")).join(name)
}

/// Disambiguate a destination with a numeric suffix before the
/// extension (`name_1.ext`, `name_2.ext`, ...) until it is free.
pub fn unique_path(candidate: &Path) -> PathBuf {
    if !candidate.exists() {
        return candidate.to_path_buf();
    }

    let mut counter = 1usize;
    loop {
        let attempt = with_suffix(candidate, &format!("_{counter}"));
        if !attempt.exists() {
            return attempt;
        }
        counter += 1;
    }
}

/// Disambiguate with a named suffix, falling back to `<suffix>_N` on
/// collision (`report_duplicate.txt`, `report_duplicate_1.txt`, ...).
pub fn unique_path_with_tag(original: &Path, tag: &str) -> PathBuf {
    let candidate = with_suffix(original, &format!("_{tag}"));
    if !candidate.exists() {
        return candidate;
    }

    let mut counter = 1usize;
    loop {
        let attempt = with_suffix(original, &format!("_{tag}_{counter}"));
        if !attempt.exists() {
            return attempt;
        }
        counter += 1;
    }
}
