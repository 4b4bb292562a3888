//! Content fingerprinting for materialized dataset files
//!
//! The fingerprint is a change detector, not a security primitive: it only
//! needs to differ when content differs.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::domain::DomainError;

/// Hash a set of files into a deterministic hex digest.
///
/// Paths are sorted lexicographically before hashing, so input order does not
/// affect the result. Each existing file contributes the hex encoding of its
/// raw bytes; missing files are silently skipped.
pub async fn fingerprint_files(paths: &[PathBuf]) -> Result<String, DomainError> {
    let mut sorted: Vec<&PathBuf> = paths.iter().collect();
    sorted.sort();

    let mut hasher = Sha256::new();
    for path in sorted {
        match tokio::fs::read(path).await {
            Ok(bytes) => hasher.update(hex::encode(bytes).as_bytes()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(DomainError::filesystem(format!(
                    "Failed to read '{}' for fingerprinting: {}",
                    path.display(),
                    err
                )))
            }
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_file(dir: &std::path::Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_fingerprint_is_order_independent() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", b"alpha").await;
        let b = write_file(dir.path(), "b.txt", b"beta").await;
        let c = write_file(dir.path(), "c.txt", b"gamma").await;

        let forward = fingerprint_files(&[a.clone(), b.clone(), c.clone()])
            .await
            .unwrap();
        let reversed = fingerprint_files(&[c, b, a]).await.unwrap();

        assert_eq!(forward, reversed);
    }

    #[tokio::test]
    async fn test_fingerprint_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.bin", &[0, 1, 2, 3]).await;

        let first = fingerprint_files(std::slice::from_ref(&a)).await.unwrap();
        let second = fingerprint_files(std::slice::from_ref(&a)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[tokio::test]
    async fn test_fingerprint_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", b"one").await;
        let before = fingerprint_files(std::slice::from_ref(&a)).await.unwrap();

        tokio::fs::write(&a, b"two").await.unwrap();
        let after = fingerprint_files(std::slice::from_ref(&a)).await.unwrap();

        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", b"alpha").await;
        let ghost = dir.path().join("missing.txt");

        let with_ghost = fingerprint_files(&[a.clone(), ghost]).await.unwrap();
        let without = fingerprint_files(&[a]).await.unwrap();

        assert_eq!(with_ghost, without);
    }

    #[tokio::test]
    async fn test_empty_set_has_stable_digest() {
        let first = fingerprint_files(&[]).await.unwrap();
        let second = fingerprint_files(&[]).await.unwrap();
        assert_eq!(first, second);
    }
}
