//! Per-file metadata extraction.

use super::fingerprint::{fingerprint_file, HashAlgorithm};
use crate::core::catalog::{Category, FileRecord};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Bytes read when sniffing content signatures or sampling text.
const SNIFF_BYTES: usize = 8 * 1024;

/// Files below this size skip the enrichment pass.
const MIN_ENRICH_SIZE: u64 = 100;

const OCTET_STREAM: &str = "application/octet-stream";

/// Extension-based MIME lookup, first line of detection.
fn mime_from_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".bmp" => "image/bmp",
        ".tiff" => "image/tiff",
        ".webp" => "image/webp",
        ".svg" => "image/svg+xml",
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".xls" => "application/vnd.ms-excel",
        ".xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".ppt" => "application/vnd.ms-powerpoint",
        ".pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".txt" | ".md" | ".tex" => "text/plain",
        ".rtf" => "application/rtf",
        ".csv" => "text/csv",
        ".html" => "text/html",
        ".css" => "text/css",
        ".js" => "text/javascript",
        ".json" => "application/json",
        ".xml" => "application/xml",
        ".yaml" | ".yml" => "application/yaml",
        ".mp3" => "audio/mpeg",
        ".wav" => "audio/wav",
        ".flac" => "audio/flac",
        ".ogg" => "audio/ogg",
        ".mp4" => "video/mp4",
        ".mov" => "video/quicktime",
        ".mkv" => "video/x-matroska",
        ".webm" => "video/webm",
        ".zip" => "application/zip",
        ".gz" => "application/gzip",
        ".tar" => "application/x-tar",
        ".7z" => "application/x-7z-compressed",
        _ => return None,
    };
    Some(mime)
}

/// Sniff a content header for known binary signatures, then fall back
/// to a UTF-8 probe to distinguish text from binary.
fn mime_from_signature(header: &[u8]) -> String {
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg".to_string();
    }
    if header.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return "image/png".to_string();
    }
    if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
        return "image/gif".to_string();
    }
    if header.starts_with(b"%PDF-") {
        return "application/pdf".to_string();
    }
    if header.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
        return "application/zip".to_string();
    }
    if std::str::from_utf8(header).is_ok() {
        return "text/plain".to_string();
    }
    OCTET_STREAM.to_string()
}

fn detect_mime(path: &Path, extension: &str) -> String {
    if let Some(mime) = mime_from_extension(extension) {
        return mime.to_string();
    }

    let mut header = vec![0u8; SNIFF_BYTES];
    match fs::File::open(path).and_then(|mut f| {
        let read = f.read(&mut header)?;
        header.truncate(read);
        Ok(())
    }) {
        Ok(()) => mime_from_signature(&header),
        Err(_) => OCTET_STREAM.to_string(),
    }
}

fn epoch_secs(time: std::io::Result<SystemTime>) -> Option<i64> {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
}

/// Lowercased extension with its leading dot, or empty.
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Builds complete [`FileRecord`]s from paths.
pub struct MetadataReader {
    algorithm: HashAlgorithm,
    chunk_size: usize,
}

impl MetadataReader {
    pub fn new(algorithm: HashAlgorithm, chunk_size: usize) -> Self {
        Self {
            algorithm,
            chunk_size,
        }
    }

    /// Extract metadata, fingerprint, and (for text files) a sample.
    ///
    /// A fingerprint failure downgrades to an absent fingerprint;
    /// only the initial stat can fail the record as a whole.
    pub fn read(&self, path: &Path) -> std::io::Result<FileRecord> {
        let meta = fs::metadata(path)?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let extension = normalized_extension(path);
        let modified = epoch_secs(meta.modified()).unwrap_or(0);

        let mime_type = detect_mime(path, &extension);

        let fingerprint = match fingerprint_file(path, self.algorithm, self.chunk_size) {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!("fingerprint failed for {}: {e}", path.display());
                None
            }
        };

        let mut record = FileRecord {
            path: path.to_path_buf(),
            size: meta.len(),
            created: epoch_secs(meta.created()).unwrap_or(modified),
            modified,
            accessed: epoch_secs(meta.accessed()).unwrap_or(modified),
            hidden: name.starts_with('.'),
            category: Category::from_extension(&extension),
            parent: path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default(),
            name,
            extension,
            mime_type,
            fingerprint,
            text_sample: None,
            scanned_at: epoch_secs(Ok(SystemTime::now())).unwrap_or(0),
        };

        self.enrich(&mut record);
        Ok(record)
    }

    /// Best-effort extras for larger files; failures are swallowed.
    fn enrich(&self, record: &mut FileRecord) {
        if record.size < MIN_ENRICH_SIZE {
            return;
        }

        if record.mime_type.starts_with("text/") {
            let mut buffer = vec![0u8; SNIFF_BYTES];
            if let Ok(read) = fs::File::open(&record.path).and_then(|mut f| f.read(&mut buffer)) {
                buffer.truncate(read);
                record.text_sample = Some(String::from_utf8_lossy(&buffer).into_owned());
            }
        }
    }
}
