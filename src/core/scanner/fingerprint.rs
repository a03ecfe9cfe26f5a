//! Streaming content fingerprints.
//!
//! One algorithm is configured per catalog generation; mixing digests
//! across a run would make duplicate groups meaningless.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Sha256;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Supported fingerprint algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    #[default]
    Sha256,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn digest_stream<D: Digest>(reader: &mut impl Read, chunk_size: usize) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hash a file's content in fixed-size chunks.
pub fn fingerprint_file(
    path: &Path,
    algorithm: HashAlgorithm,
    chunk_size: usize,
) -> io::Result<String> {
    let mut file = File::open(path)?;
    match algorithm {
        HashAlgorithm::Md5 => digest_stream::<Md5>(&mut file, chunk_size),
        HashAlgorithm::Sha1 => digest_stream::<Sha1>(&mut file, chunk_size),
        HashAlgorithm::Sha256 => digest_stream::<Sha256>(&mut file, chunk_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    #[test]
    fn sha256_matches_known_digest() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "hello.txt", b"hello");

        let digest = fingerprint_file(&path, HashAlgorithm::Sha256, 64 * 1024).unwrap();
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn md5_matches_known_digest() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "hello.txt", b"hello");

        let digest = fingerprint_file(&path, HashAlgorithm::Md5, 64 * 1024).unwrap();
        assert_eq!(digest, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn chunk_size_does_not_change_digest() {
        let dir = TempDir::new().unwrap();
        let content: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let path = write_file(&dir, "blob.bin", &content);

        let small = fingerprint_file(&path, HashAlgorithm::Sha256, 16).unwrap();
        let large = fingerprint_file(&path, HashAlgorithm::Sha256, 1 << 20).unwrap();
        assert_eq!(small, large);
    }

    #[test]
    fn identical_content_identical_digest() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"same bytes");
        let b = write_file(&dir, "b.bin", b"same bytes");

        let da = fingerprint_file(&a, HashAlgorithm::Sha1, 1024).unwrap();
        let db = fingerprint_file(&b, HashAlgorithm::Sha1, 1024).unwrap();
        assert_eq!(da, db);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = fingerprint_file(
            Path::new("/nonexistent/file.bin"),
            HashAlgorithm::Sha256,
            1024,
        );
        assert!(result.is_err());
    }

    #[test]
    fn algorithm_names_are_lowercase() {
        assert_eq!(HashAlgorithm::Sha256.to_string(), "sha256");
        let parsed: HashAlgorithm = serde_json::from_str("\"md5\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Md5);
    }
}
