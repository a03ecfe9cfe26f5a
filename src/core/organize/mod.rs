//! # Organize Module
//!
//! Derives naming and directory patterns from the catalog, proposes
//! rename and relocation mappings, and applies rule-based moves.
//!
//! ## Surfaces
//! - `analyze` - recurring naming/organization patterns across the
//!   whole catalog
//! - `suggest` - grouping counts for one directory, for user review
//! - rename suggestions under a configured naming convention
//! - `auto-organize` / `auto-rename` - rule-driven filesystem changes
//!   with the catalog kept in lock-step

mod organizer;
mod patterns;
mod rename;
mod rules;

pub use organizer::{
    MoveRecord, OrganizeRunReport, OrganizeSuggestions, Organizer, PatternReport, RenameRunReport,
};
pub use patterns::{extract_dir_pattern, extract_name_pattern};
pub use rename::{suggest_name, NamingConvention, RenameSuggestion};
pub use rules::{default_rules, evaluate, rules_from_value, rules_to_value, OrganizationRule};
