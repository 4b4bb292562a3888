//! Dataset service: versioned uploads, listings and detail views
//!
//! Uploads materialize a complete version directory first (copy-forward plus
//! new files), then fingerprint it and only then insert the metadata row, so
//! a row never points at a half-built directory.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, instrument};

use crate::domain::dataset::{Dataset, DatasetRepository, DatasetWithProject, NewDataset};
use crate::domain::error::DomainError;
use crate::domain::project::{Project, ProjectRepository};
use crate::domain::versioning::DatasetVersion;
use crate::infrastructure::fingerprint::fingerprint_files;
use crate::infrastructure::materializer::{self, DatasetFile};

/// One uploaded multipart file
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Request to create or update a dataset version
#[derive(Debug, Clone)]
pub struct UploadDatasetRequest {
    pub project_id: i64,
    /// Chain to extend; when set the upload becomes a new minor version
    pub selected_dataset_id: Option<i64>,
    /// Chain name for a brand new dataset; ignored on updates
    pub dataset_name: Option<String>,
    pub description: String,
    pub created_by: String,
    pub images: Vec<UploadedFile>,
    pub labels: Vec<UploadedFile>,
    pub config: Option<UploadedFile>,
}

impl UploadDatasetRequest {
    fn is_empty(&self) -> bool {
        self.images.is_empty() && self.labels.is_empty() && self.config.is_none()
    }
}

/// Dataset row joined with project name and the materialized file listing
#[derive(Debug, Clone, Serialize)]
pub struct DatasetDetails {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub project_name: String,
    pub files: Vec<DatasetFile>,
}

/// Trait for dataset service (for dynamic dispatch in AppState)
#[async_trait]
pub trait DatasetServiceTrait: Send + Sync + Debug {
    async fn upload(&self, request: UploadDatasetRequest) -> Result<Dataset, DomainError>;

    async fn get(&self, id: i64) -> Result<Dataset, DomainError>;

    async fn details(&self, id: i64) -> Result<DatasetDetails, DomainError>;

    async fn list(&self) -> Result<Vec<DatasetWithProject>, DomainError>;

    async fn list_by_project(&self, project_id: i64)
        -> Result<Vec<DatasetWithProject>, DomainError>;
}

/// Dataset service implementation
#[derive(Debug)]
pub struct DatasetService {
    projects: Arc<dyn ProjectRepository>,
    datasets: Arc<dyn DatasetRepository>,
}

impl DatasetService {
    pub fn new(projects: Arc<dyn ProjectRepository>, datasets: Arc<dyn DatasetRepository>) -> Self {
        Self { projects, datasets }
    }

    async fn required_project(&self, id: i64) -> Result<Project, DomainError> {
        self.projects
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Project '{}'", id)))
    }

    /// Resolve the chain name, new version and the previous version directory
    /// to copy forward, if any.
    async fn resolve_target(
        &self,
        request: &UploadDatasetRequest,
    ) -> Result<(String, DatasetVersion, Option<String>), DomainError> {
        if let Some(selected_id) = request.selected_dataset_id {
            let selected = self
                .datasets
                .get(selected_id)
                .await?
                .ok_or_else(|| DomainError::not_found(format!("Dataset '{}'", selected_id)))?;
            if selected.project_id != request.project_id {
                return Err(DomainError::validation(format!(
                    "Dataset '{}' does not belong to project '{}'",
                    selected_id, request.project_id
                )));
            }

            // The chain may have grown since the client picked its dataset;
            // always increment from the latest row.
            let latest = self
                .datasets
                .latest_in_chain(selected.project_id, &selected.name)
                .await?
                .unwrap_or(selected);
            let version = DatasetVersion::parse(&latest.version)?.next_minor();
            return Ok((latest.name.clone(), version, Some(latest.base_path)));
        }

        let name = request
            .dataset_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DomainError::validation("Dataset name must not be empty"))?;
        if name.contains('/') || name.contains("..") {
            return Err(DomainError::validation(
                "Dataset name must not contain path separators",
            ));
        }

        if self
            .datasets
            .latest_in_chain(request.project_id, name)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(format!(
                "Dataset '{}' already exists in project '{}'; select it to upload a new version",
                name, request.project_id
            )));
        }

        Ok((name.to_string(), DatasetVersion::initial(), None))
    }
}

#[async_trait]
impl DatasetServiceTrait for DatasetService {
    #[instrument(skip(self, request), fields(project_id = request.project_id))]
    async fn upload(&self, request: UploadDatasetRequest) -> Result<Dataset, DomainError> {
        if request.is_empty() {
            return Err(DomainError::validation("No files provided"));
        }

        let project = self.required_project(request.project_id).await?;
        let (name, version, previous_dir) = self.resolve_target(&request).await?;

        let version_dir = materializer::create_version_dir(
            Path::new(&project.path),
            &name,
            &version.to_string(),
        )
        .await?;
        if let Some(previous_dir) = previous_dir {
            materializer::copy_previous_version(Path::new(&previous_dir), &version_dir).await?;
        }

        for image in &request.images {
            materializer::write_image(&version_dir, &image.file_name, &image.bytes).await?;
        }
        for label in &request.labels {
            materializer::write_label(&version_dir, &label.file_name, &label.bytes).await?;
        }
        if let Some(config) = &request.config {
            materializer::write_config(&version_dir, &config.file_name, &config.bytes).await?;
        }

        let files = materializer::collect_files(&version_dir).await?;
        let file_count = files.len() as i32;
        let fingerprint = fingerprint_files(&files).await?;

        let created = self
            .datasets
            .insert(NewDataset {
                project_id: project.id,
                name,
                version: version.to_string(),
                file_count,
                fingerprint,
                base_path: version_dir.to_string_lossy().into_owned(),
                description: request.description,
                created_by: request.created_by,
            })
            .await?;

        info!(
            dataset_id = created.id,
            version = %created.version,
            file_count,
            "Stored dataset version"
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Dataset, DomainError> {
        self.datasets
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Dataset '{}'", id)))
    }

    #[instrument(skip(self))]
    async fn details(&self, id: i64) -> Result<DatasetDetails, DomainError> {
        let dataset = self.get(id).await?;
        let project_name = self
            .projects
            .get(dataset.project_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_default();
        let files = materializer::list_files(Path::new(&dataset.base_path)).await?;

        Ok(DatasetDetails {
            dataset,
            project_name,
            files,
        })
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<DatasetWithProject>, DomainError> {
        self.datasets.list().await
    }

    #[instrument(skip(self))]
    async fn list_by_project(
        &self,
        project_id: i64,
    ) -> Result<Vec<DatasetWithProject>, DomainError> {
        self.required_project(project_id).await?;
        self.datasets.list_by_project(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::NewProject;
    use crate::infrastructure::dataset::InMemoryDatasetRepository;
    use crate::infrastructure::project::InMemoryProjectRepository;

    struct Fixture {
        service: DatasetService,
        project_id: i64,
        _root: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let projects: Arc<dyn ProjectRepository> = Arc::new(InMemoryProjectRepository::new());
        let datasets: Arc<dyn DatasetRepository> =
            Arc::new(InMemoryDatasetRepository::new(Arc::clone(&projects)));

        let project_dir = root.path().join("demo");
        materializer::scaffold_project(&project_dir).await.unwrap();
        let project = projects
            .insert(NewProject {
                name: "demo".to_string(),
                description: String::new(),
                path: project_dir.to_string_lossy().into_owned(),
                created_by: "tester".to_string(),
            })
            .await
            .unwrap();

        Fixture {
            service: DatasetService::new(projects, datasets),
            project_id: project.id,
            _root: root,
        }
    }

    fn file(name: &str, content: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            bytes: Bytes::copy_from_slice(content),
        }
    }

    fn initial_upload(project_id: i64) -> UploadDatasetRequest {
        UploadDatasetRequest {
            project_id,
            selected_dataset_id: None,
            dataset_name: Some("plates".to_string()),
            description: "initial".to_string(),
            created_by: "tester".to_string(),
            images: vec![
                file("a.jpg", b"img-a"),
                file("b.jpg", b"img-b"),
                file("c.jpg", b"img-c"),
            ],
            labels: vec![
                file("a.txt", b"0"),
                file("b.txt", b"1"),
                file("c.txt", b"2"),
            ],
            config: None,
        }
    }

    #[tokio::test]
    async fn test_initial_upload_is_v1_0() {
        let fx = fixture().await;

        let dataset = fx.service.upload(initial_upload(fx.project_id)).await.unwrap();

        assert_eq!(dataset.version, "v1.0");
        assert_eq!(dataset.file_count, 6);
        assert_eq!(dataset.fingerprint.len(), 64);
        assert!(Path::new(&dataset.base_path).join("images/a.jpg").is_file());
        assert!(Path::new(&dataset.base_path).join("labels/c.txt").is_file());
    }

    #[tokio::test]
    async fn test_update_copies_previous_version_forward() {
        let fx = fixture().await;
        let v1 = fx.service.upload(initial_upload(fx.project_id)).await.unwrap();

        let update = UploadDatasetRequest {
            project_id: fx.project_id,
            selected_dataset_id: Some(v1.id),
            dataset_name: None,
            description: "one more image".to_string(),
            created_by: "tester".to_string(),
            images: vec![file("d.jpg", b"img-d")],
            labels: vec![],
            config: None,
        };
        let v2 = fx.service.upload(update).await.unwrap();

        assert_eq!(v2.version, "v1.1");
        assert_eq!(v2.name, "plates");
        // All six prior files carried over plus the new one
        assert_eq!(v2.file_count, 7);
        assert_ne!(v2.fingerprint, v1.fingerprint);
        assert!(Path::new(&v2.base_path).join("images/a.jpg").is_file());
        assert!(Path::new(&v2.base_path).join("images/d.jpg").is_file());
        // v1.0 untouched
        assert!(!Path::new(&v1.base_path).join("images/d.jpg").exists());
    }

    #[tokio::test]
    async fn test_chained_updates_increment_minor() {
        let fx = fixture().await;
        let v1 = fx.service.upload(initial_upload(fx.project_id)).await.unwrap();

        let mut latest = v1;
        for i in 0..3 {
            latest = fx
                .service
                .upload(UploadDatasetRequest {
                    project_id: fx.project_id,
                    selected_dataset_id: Some(latest.id),
                    dataset_name: None,
                    description: String::new(),
                    created_by: "tester".to_string(),
                    images: vec![file(&format!("extra_{}.jpg", i), b"x")],
                    labels: vec![],
                    config: None,
                })
                .await
                .unwrap();
        }

        assert_eq!(latest.version, "v1.3");
        assert_eq!(latest.file_count, 9);
    }

    #[tokio::test]
    async fn test_upload_unknown_project_is_not_found() {
        let fx = fixture().await;
        let result = fx.service.upload(initial_upload(999)).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_upload_unknown_selected_dataset_is_not_found() {
        let fx = fixture().await;

        let result = fx
            .service
            .upload(UploadDatasetRequest {
                selected_dataset_id: Some(999),
                ..initial_upload(fx.project_id)
            })
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_new_dataset_name_conflicts() {
        let fx = fixture().await;
        fx.service.upload(initial_upload(fx.project_id)).await.unwrap();

        let result = fx.service.upload(initial_upload(fx.project_id)).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let fx = fixture().await;

        let result = fx
            .service
            .upload(UploadDatasetRequest {
                images: vec![],
                labels: vec![],
                config: None,
                ..initial_upload(fx.project_id)
            })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_yaml_config_lands_at_version_root() {
        let fx = fixture().await;

        let dataset = fx
            .service
            .upload(UploadDatasetRequest {
                config: Some(file("data.yaml", b"names: [plate]")),
                ..initial_upload(fx.project_id)
            })
            .await
            .unwrap();

        assert!(Path::new(&dataset.base_path).join("data.yaml").is_file());
        assert_eq!(dataset.file_count, 7);
    }

    #[tokio::test]
    async fn test_details_lists_materialized_files() {
        let fx = fixture().await;
        let dataset = fx.service.upload(initial_upload(fx.project_id)).await.unwrap();

        let details = fx.service.details(dataset.id).await.unwrap();

        assert_eq!(details.project_name, "demo");
        assert_eq!(details.files.len(), 6);
        assert!(details.files.iter().any(|f| f.relative_path == "images/a.jpg"));
    }
}
