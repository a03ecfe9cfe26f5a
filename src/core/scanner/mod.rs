//! # Scanner Module
//!
//! Walks a directory tree, filters entries, extracts per-file
//! metadata and content fingerprints, and populates the catalog.
//!
//! ## Pipeline
//! 1. **Enumerate** - recursive walk with hidden/system/excluded
//!    pruning and a size cap
//! 2. **Process** - metadata, MIME detection, streamed fingerprint,
//!    text enrichment; batches are hashed in parallel
//! 3. **Catalog** - records upserted with a checkpoint save every
//!    100 files and once at completion
//!
//! Individual file errors are recovered (skip + warn); only an
//! invalid root aborts a scan.

mod filter;
mod fingerprint;
mod metadata;
mod walker;

pub use filter::EntryFilter;
pub use fingerprint::{fingerprint_file, HashAlgorithm};
pub use metadata::{normalized_extension, MetadataReader};
pub use walker::{FileScanner, ScanReport};
