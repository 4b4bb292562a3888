//! Dataset directory materialization
//!
//! Lays out `<project>/data/<name>/<version>/{images/,labels/}` and gives
//! each version a complete, self-contained snapshot by copying the previous
//! version forward before new uploads land. Writes are direct filesystem
//! writes with no transaction; a failure partway through an upload leaves a
//! partially populated version directory behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::DomainError;

pub const IMAGES_DIR: &str = "images";
pub const LABELS_DIR: &str = "labels";

/// One file inside a dataset version directory, for detail views
#[derive(Debug, Clone, Serialize)]
pub struct DatasetFile {
    pub name: String,
    pub path: String,
    pub relative_path: String,
    pub file_type: String,
    pub size: String,
    pub size_bytes: u64,
}

/// Create the standard project skeleton: `<root>/{data/,models/}`
pub async fn scaffold_project(project_dir: &Path) -> Result<(), DomainError> {
    tokio::fs::create_dir_all(project_dir.join("data")).await?;
    tokio::fs::create_dir_all(project_dir.join("models")).await?;
    info!(path = %project_dir.display(), "Project directory scaffolded");
    Ok(())
}

/// Directory of one dataset version under a project root
pub fn version_dir(project_path: &Path, dataset_name: &str, version: &str) -> PathBuf {
    project_path.join("data").join(dataset_name).join(version)
}

/// Create a version directory with its `images/` and `labels/` subdirectories
pub async fn create_version_dir(
    project_path: &Path,
    dataset_name: &str,
    version: &str,
) -> Result<PathBuf, DomainError> {
    let dir = version_dir(project_path, dataset_name, version);
    tokio::fs::create_dir_all(dir.join(IMAGES_DIR)).await?;
    tokio::fs::create_dir_all(dir.join(LABELS_DIR)).await?;
    debug!(path = %dir.display(), "Created dataset version directory");
    Ok(dir)
}

/// Copy the previous version's `images/` and `labels/` subtrees and any
/// top-level yaml config files into a freshly created version directory.
/// Must run before new uploads are written so they can overwrite copies.
pub async fn copy_previous_version(
    previous_dir: &Path,
    new_dir: &Path,
) -> Result<(), DomainError> {
    if !tokio::fs::try_exists(previous_dir).await? {
        debug!(path = %previous_dir.display(), "Previous version directory not found, nothing to copy");
        return Ok(());
    }

    for subdir in [IMAGES_DIR, LABELS_DIR] {
        let src = previous_dir.join(subdir);
        if tokio::fs::try_exists(&src).await? {
            copy_dir_recursive(&src, &new_dir.join(subdir)).await?;
        }
    }

    let mut entries = tokio::fs::read_dir(previous_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && is_yaml(&path) {
            if let Some(file_name) = path.file_name() {
                tokio::fs::copy(&path, new_dir.join(file_name)).await?;
            }
        }
    }

    info!(
        from = %previous_dir.display(),
        to = %new_dir.display(),
        "Copied previous dataset version forward"
    );
    Ok(())
}

/// Write an uploaded image file under `images/`; returns the written path
pub async fn write_image(
    version_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, DomainError> {
    write_part(&version_dir.join(IMAGES_DIR), file_name, bytes).await
}

/// Write an uploaded label file under `labels/`; returns the written path
pub async fn write_label(
    version_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, DomainError> {
    write_part(&version_dir.join(LABELS_DIR), file_name, bytes).await
}

/// Write the single config file at the version root; returns the written path
pub async fn write_config(
    version_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, DomainError> {
    write_part(version_dir, file_name, bytes).await
}

/// All regular files under a directory, recursively
pub async fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Count regular files under a directory, recursively
pub async fn count_files(dir: &Path) -> Result<i32, DomainError> {
    Ok(collect_files(dir).await?.len() as i32)
}

/// Recursive listing with display metadata, sorted by file name
pub async fn list_files(base_dir: &Path) -> Result<Vec<DatasetFile>, DomainError> {
    let mut listed = Vec::new();

    for path in collect_files(base_dir).await? {
        let metadata = tokio::fs::metadata(&path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let relative_path = path
            .strip_prefix(base_dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        let file_type = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        listed.push(DatasetFile {
            name,
            path: path.to_string_lossy().into_owned(),
            relative_path,
            file_type,
            size: human_size(metadata.len()),
            size_bytes: metadata.len(),
        });
    }

    listed.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listed)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Strip any directory components from a client-supplied file name
fn sanitize_file_name(file_name: &str) -> Result<&str, DomainError> {
    Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DomainError::validation(format!("Invalid file name '{}'", file_name)))
}

async fn write_part(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DomainError> {
    let file_name = sanitize_file_name(file_name)?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    debug!(path = %path.display(), size = bytes.len(), "Wrote uploaded file");
    Ok(path)
}

async fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), DomainError> {
    let mut pending = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((current_src, current_dst)) = pending.pop() {
        tokio::fs::create_dir_all(&current_dst).await?;

        let mut entries = tokio::fs::read_dir(&current_src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let src_path = entry.path();
            let Some(file_name) = src_path.file_name() else {
                continue;
            };
            let dst_path = current_dst.join(file_name);

            if src_path.is_dir() {
                pending.push((src_path, dst_path));
            } else {
                tokio::fs::copy(&src_path, &dst_path).await?;
            }
        }
    }

    Ok(())
}

fn human_size(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    let bytes = bytes as f64;
    if bytes < MB {
        format!("{:.2} KB", bytes / 1024.0)
    } else {
        format!("{:.2} MB", bytes / MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn test_scaffold_project_creates_skeleton() {
        let root = tempfile::tempdir().unwrap();
        let project_dir = root.path().join("demo");

        scaffold_project(&project_dir).await.unwrap();

        assert!(project_dir.join("data").is_dir());
        assert!(project_dir.join("models").is_dir());
    }

    #[tokio::test]
    async fn test_create_version_dir_layout() {
        let root = tempfile::tempdir().unwrap();

        let dir = create_version_dir(root.path(), "plates", "v1.0")
            .await
            .unwrap();

        assert_eq!(dir, root.path().join("data").join("plates").join("v1.0"));
        assert!(dir.join("images").is_dir());
        assert!(dir.join("labels").is_dir());
    }

    #[tokio::test]
    async fn test_copy_previous_version_full_snapshot() {
        let root = tempfile::tempdir().unwrap();
        let prev = create_version_dir(root.path(), "plates", "v1.0")
            .await
            .unwrap();

        write_image(&prev, "a.jpg", b"img-a").await.unwrap();
        write_image(&prev, "b.jpg", b"img-b").await.unwrap();
        write_label(&prev, "a.txt", b"0 0.5 0.5 1 1").await.unwrap();
        write_config(&prev, "data.yaml", b"names: [plate]").await.unwrap();

        let next = create_version_dir(root.path(), "plates", "v1.1")
            .await
            .unwrap();
        copy_previous_version(&prev, &next).await.unwrap();

        // Directory diff: every prior file must exist in the new version
        let prev_files: BTreeSet<String> = list_files(&prev)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.relative_path)
            .collect();
        let next_files: BTreeSet<String> = list_files(&next)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.relative_path)
            .collect();
        assert_eq!(prev_files, next_files);

        let copied = tokio::fs::read(next.join("images").join("a.jpg"))
            .await
            .unwrap();
        assert_eq!(copied, b"img-a");
    }

    #[tokio::test]
    async fn test_copy_missing_previous_is_noop() {
        let root = tempfile::tempdir().unwrap();
        let next = create_version_dir(root.path(), "plates", "v1.1")
            .await
            .unwrap();

        copy_previous_version(&root.path().join("data/plates/v1.0"), &next)
            .await
            .unwrap();

        assert_eq!(count_files(&next).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_files_recursive() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_version_dir(root.path(), "plates", "v1.0")
            .await
            .unwrap();

        write_image(&dir, "a.jpg", b"x").await.unwrap();
        write_image(&dir, "b.jpg", b"y").await.unwrap();
        write_label(&dir, "a.txt", b"0").await.unwrap();
        write_config(&dir, "data.yaml", b"{}").await.unwrap();

        assert_eq!(count_files(&dir).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_file_name_sanitization() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_version_dir(root.path(), "plates", "v1.0")
            .await
            .unwrap();

        let written = write_image(&dir, "../../escape.jpg", b"x").await.unwrap();
        assert_eq!(written, dir.join("images").join("escape.jpg"));

        assert!(write_image(&dir, "..", b"x").await.is_err());
    }

    #[tokio::test]
    async fn test_list_files_metadata() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_version_dir(root.path(), "plates", "v1.0")
            .await
            .unwrap();
        write_image(&dir, "a.jpg", &[0u8; 2048]).await.unwrap();

        let files = list_files(&dir).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.jpg");
        assert_eq!(files[0].relative_path, "images/a.jpg");
        assert_eq!(files[0].file_type, "jpg");
        assert_eq!(files[0].size_bytes, 2048);
        assert_eq!(files[0].size, "2.00 KB");
    }

    #[test]
    fn test_human_size_units() {
        assert_eq!(human_size(512), "0.50 KB");
        assert_eq!(human_size(2 * 1024 * 1024), "2.00 MB");
    }
}
