//! Rename suggestions under a configured naming convention.

use crate::core::catalog::FileRecord;
use chrono::{Local, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// The supported naming conventions. Exactly one is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    /// `MyReportFinal.pdf`
    #[default]
    Camel,
    /// `my_report_final.pdf`
    Snake,
    /// `my-report-final.pdf`
    Kebab,
    /// `My Report Final.pdf`
    Normal,
}

/// A proposed rename, emitted only when it differs from the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameSuggestion {
    pub path: PathBuf,
    pub original_name: String,
    pub suggested_name: String,
}

fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s.\-]").unwrap())
}

fn token_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_\-]+").unwrap())
}

fn space_dash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s\-]+").unwrap())
}

fn space_underscore_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_]+").unwrap())
}

fn underscore_dash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[_\-]+").unwrap())
}

fn leading_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}_").unwrap())
}

/// Uppercase the first character, leave the rest untouched.
///
/// Lowercasing the tail would make repeated application keep
/// rewriting already-converted names.
fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn strip_suffix_ci<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() || name.len() < suffix.len() {
        return None;
    }
    let split = name.len() - suffix.len();
    if !name.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = name.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

fn apply_convention(stem: &str, convention: NamingConvention) -> String {
    match convention {
        NamingConvention::Camel => token_split_re()
            .split(stem)
            .filter(|t| !t.is_empty())
            .map(capitalize)
            .collect(),
        NamingConvention::Snake => space_dash_re()
            .replace_all(&stem.to_lowercase(), "_")
            .into_owned(),
        NamingConvention::Kebab => space_underscore_re()
            .replace_all(&stem.to_lowercase(), "-")
            .into_owned(),
        NamingConvention::Normal => {
            let spaced = underscore_dash_re().replace_all(stem, " ");
            spaced
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

/// Build the suggested name for one record.
///
/// The convention applies to the stem; the catalog's lowercased
/// extension is re-appended afterwards. An already-present
/// `YYYY-MM-DD_` prefix is carried through untouched. Both choices
/// keep the suggestion stable: applying it and suggesting again
/// yields nothing new.
pub fn suggest_name(
    record: &FileRecord,
    convention: NamingConvention,
    date_prefix: bool,
) -> Option<RenameSuggestion> {
    // Strip everything outside word characters, whitespace, dot, hyphen
    let cleaned = strip_re().replace_all(&record.name, "").into_owned();

    let stem = strip_suffix_ci(&cleaned, &record.extension).unwrap_or(&cleaned);

    let (existing_prefix, core) = match leading_date_re().find(stem) {
        Some(m) => (Some(m.as_str().to_string()), &stem[m.end()..]),
        None => (None, stem),
    };

    let mut suggested = match &existing_prefix {
        Some(prefix) => format!("{prefix}{}", apply_convention(core, convention)),
        None => apply_convention(core, convention),
    };

    if date_prefix && existing_prefix.is_none() && record.created > 0 {
        if let Some(date) = Local.timestamp_opt(record.created, 0).single() {
            suggested = format!("{}_{}", date.format("%Y-%m-%d"), suggested);
        }
    }

    if !record.extension.is_empty() {
        suggested.push_str(&record.extension);
    }

    if suggested == record.name {
        return None;
    }

    Some(RenameSuggestion {
        path: record.path.clone(),
        original_name: record.name.clone(),
        suggested_name: suggested,
    })
}
