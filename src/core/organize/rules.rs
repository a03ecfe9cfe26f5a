//! Organization rules: match conditions and destination templates.
//!
//! Rules are evaluated in list order and the first match wins; a
//! file matching several rules goes where the earliest one says.

use crate::core::catalog::{Category, FileRecord};
use crate::error::OrganizeError;
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// One organization rule.
///
/// A closed set of variants keeps evaluation exhaustive: a rule is
/// either a category rule, an extension rule, or a date rule, each
/// with an optional match condition and a destination template.
///
/// Templates may use `{category}`, `{extension}` (without its dot),
/// and `{year}`/`{month}`/`{day}`/`{date}` derived from the file's
/// creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrganizationRule {
    Category {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<Category>,
        destination: String,
    },
    Extension {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension: Option<String>,
        destination: String,
    },
    Date { destination: String },
}

impl OrganizationRule {
    /// Whether this rule's condition accepts the file.
    pub fn matches(&self, record: &FileRecord) -> bool {
        match self {
            OrganizationRule::Category { category, .. } => {
                category.map_or(true, |c| c == record.category)
            }
            OrganizationRule::Extension { extension, .. } => extension
                .as_deref()
                .map_or(true, |e| normalize_extension_filter(e) == record.extension),
            OrganizationRule::Date { .. } => record.created > 0,
        }
    }

    fn template(&self) -> &str {
        match self {
            OrganizationRule::Category { destination, .. }
            | OrganizationRule::Extension { destination, .. }
            | OrganizationRule::Date { destination } => destination,
        }
    }

    /// The destination for a matching file, resolved against its
    /// current parent directory. None when the rule does not match,
    /// or when the template needs a creation time the file lacks.
    pub fn destination_for(&self, record: &FileRecord) -> Option<PathBuf> {
        if !self.matches(record) {
            return None;
        }

        let mut destination = self.template().to_string();
        destination = destination.replace("{category}", record.category.as_str());
        destination = destination.replace(
            "{extension}",
            record.extension.trim_start_matches('.'),
        );

        if destination.contains('{') {
            let date = creation_date(record)?;
            destination = destination.replace("{year}", &date.format("%Y").to_string());
            destination = destination.replace("{month}", &date.format("%m").to_string());
            destination = destination.replace("{day}", &date.format("%d").to_string());
            destination = destination.replace("{date}", &date.format("%Y-%m-%d").to_string());
        }

        Some(record.parent.join(destination))
    }
}

fn creation_date(record: &FileRecord) -> Option<DateTime<Local>> {
    if record.created <= 0 {
        return None;
    }
    Local.timestamp_opt(record.created, 0).single()
}

/// Accept `jpg`, `.jpg`, and `JPG` as the same filter.
fn normalize_extension_filter(filter: &str) -> String {
    let lower = filter.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

/// Evaluate rules in order; the first rule that produces a
/// destination wins and evaluation stops.
pub fn evaluate(rules: &[OrganizationRule], record: &FileRecord) -> Option<PathBuf> {
    rules.iter().find_map(|rule| rule.destination_for(record))
}

/// The default rule set: date-split folders for images and documents,
/// then a generic per-category catch-all. The specific rules are
/// listed first so they win over the catch-all.
pub fn default_rules() -> Vec<OrganizationRule> {
    vec![
        OrganizationRule::Category {
            category: Some(Category::Images),
            destination: "Images/{year}/{month}".to_string(),
        },
        OrganizationRule::Category {
            category: Some(Category::Documents),
            destination: "Documents/{year}".to_string(),
        },
        OrganizationRule::Category {
            category: None,
            destination: "{category}".to_string(),
        },
    ]
}

/// Parse a rule list from an imported JSON document.
///
/// The document must be a list; entries that are not objects with
/// `type` and `destination` are skipped with a warning rather than
/// failing the whole import.
pub fn rules_from_value(value: serde_json::Value) -> Result<Vec<OrganizationRule>, OrganizeError> {
    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        _ => return Err(OrganizeError::InvalidRuleDocument),
    };

    let mut rules = Vec::new();
    for entry in entries {
        let valid_shape = entry
            .as_object()
            .map(|o| o.contains_key("type") && o.contains_key("destination"))
            .unwrap_or(false);
        if !valid_shape {
            warn!("skipping rule without type/destination: {entry}");
            continue;
        }

        match serde_json::from_value::<OrganizationRule>(entry) {
            Ok(rule) => rules.push(rule),
            Err(e) => warn!("skipping malformed rule: {e}"),
        }
    }

    Ok(rules)
}

/// Export rules as a JSON document.
pub fn rules_to_value(rules: &[OrganizationRule]) -> serde_json::Value {
    serde_json::to_value(rules).unwrap_or_else(|_| serde_json::Value::Array(Vec::new()))
}
