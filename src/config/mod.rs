//! # Config Module
//!
//! Typed settings for the core components.
//!
//! Settings are loaded once, then passed into each component at
//! construction; a running operation never observes a mid-flight
//! config change. Every field has a default, so a partial (or absent)
//! settings file is valid.

use crate::core::dupes::CompareMethod;
use crate::core::organize::NamingConvention;
use crate::core::scanner::HashAlgorithm;
use crate::error::OrderlyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the organizer behaves by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizeMode {
    /// Generate suggestions for review
    #[default]
    Suggest,
    /// Apply organization rules without review
    Auto,
}

/// Settings governing directory scans
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningSettings {
    pub ignore_hidden_files: bool,
    pub ignore_system_files: bool,
    /// Files larger than this are skipped; 0 disables the limit
    pub max_file_size_mb: u64,
    /// Read size for streaming fingerprint computation
    pub chunk_size_kb: usize,
    /// Comma-separated folder names pruned from the walk
    pub excluded_folders: String,
}

impl Default for ScanningSettings {
    fn default() -> Self {
        Self {
            ignore_hidden_files: true,
            ignore_system_files: true,
            max_file_size_mb: 1000,
            chunk_size_kb: 64,
            excluded_folders: "node_modules,venv,.git,__pycache__,build,dist".to_string(),
        }
    }
}

impl ScanningSettings {
    /// The excluded-folder list, split and trimmed
    pub fn excluded_list(&self) -> Vec<String> {
        self.excluded_folders
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Maximum file size in bytes, or None when the limit is disabled
    pub fn max_file_size_bytes(&self) -> Option<u64> {
        if self.max_file_size_mb == 0 {
            None
        } else {
            Some(self.max_file_size_mb * 1024 * 1024)
        }
    }

    pub fn chunk_size_bytes(&self) -> usize {
        self.chunk_size_kb.max(1) * 1024
    }
}

/// Settings governing duplicate search and resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateSettings {
    /// Files below this size are never considered duplicates
    pub min_size_kb: u64,
    pub compare_method: CompareMethod,
    pub hash_algorithm: HashAlgorithm,
}

impl Default for DuplicateSettings {
    fn default() -> Self {
        Self {
            min_size_kb: 10,
            compare_method: CompareMethod::Content,
            hash_algorithm: HashAlgorithm::Sha256,
        }
    }
}

impl DuplicateSettings {
    pub fn min_size_bytes(&self) -> u64 {
        self.min_size_kb * 1024
    }
}

/// Settings governing the organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationSettings {
    pub naming_convention: NamingConvention,
    pub default_mode: OrganizeMode,
    /// When true, rename suggestions keep the original name core
    /// (no date prefix is prepended)
    pub preserve_original: bool,
}

impl Default for OrganizationSettings {
    fn default() -> Self {
        Self {
            naming_convention: NamingConvention::Camel,
            default_mode: OrganizeMode::Suggest,
            preserve_original: true,
        }
    }
}

/// All settings, grouped by section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scanning: ScanningSettings,
    pub duplicates: DuplicateSettings,
    pub organization: OrganizationSettings,
}

impl Settings {
    /// Load settings from a JSON file.
    ///
    /// A missing file yields defaults; a malformed file is a
    /// configuration error.
    pub fn load(path: &Path) -> Result<Self, OrderlyError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| OrderlyError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| OrderlyError::Config(format!("invalid settings in {}: {}", path.display(), e)))
    }

    /// Write settings to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), OrderlyError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OrderlyError::Config(format!("cannot create {}: {}", parent.display(), e)))?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| OrderlyError::Config(e.to_string()))?;
        std::fs::write(path, text)
            .map_err(|e| OrderlyError::Config(format!("cannot write {}: {}", path.display(), e)))
    }
}
