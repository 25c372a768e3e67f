use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::ModelArtifact;
use crate::errors::ServiceError;
use crate::models::{ExpectedFeatureSchema, ModelKind};

/// Why the expected feature schema could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaUnavailable {
    #[error("{path} not found")]
    Missing { path: String },

    #[error("{path} could not be read: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("{path} lists no columns")]
    Empty { path: String },

    #[error("{path} lists column '{column}' more than once")]
    Duplicate { path: String, column: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

#[derive(Debug, Clone)]
struct CachedArtifact {
    stamp: FileStamp,
    artifact: Arc<ModelArtifact>,
}

/// Reads model artifacts and the feature schema from disk.
///
/// With caching enabled, a parsed artifact is reused until the file's
/// modification time or size changes.
#[derive(Debug)]
pub struct ModelStore {
    models_dir: PathBuf,
    schema_path: PathBuf,
    cache: Option<DashMap<PathBuf, CachedArtifact>>,
}

impl ModelStore {
    pub fn new(models_dir: impl Into<PathBuf>, schema_path: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            schema_path: schema_path.into(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(DashMap::new);
        self
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    pub fn artifact_path(&self, kind: ModelKind) -> PathBuf {
        self.models_dir.join(kind.artifact_file())
    }

    pub async fn artifact_exists(&self, kind: ModelKind) -> bool {
        tokio::fs::metadata(self.artifact_path(kind))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Loads and validates the artifact for `kind`.
    pub async fn load_artifact(&self, kind: ModelKind) -> Result<Arc<ModelArtifact>, ServiceError> {
        let path = self.artifact_path(kind);
        let load_error =
            |reason: String| ServiceError::ModelLoad(format!("{}: {}", path.display(), reason));

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| load_error(e.to_string()))?;
        let stamp = FileStamp {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        };

        if let Some(cache) = &self.cache {
            if let Some(entry) = cache.get(&path) {
                if entry.stamp == stamp {
                    debug!(model = %kind.slug(), "Model artifact served from cache");
                    return Ok(entry.artifact.clone());
                }
            }
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| load_error(e.to_string()))?;
        let artifact = ModelArtifact::from_slice(&bytes).map_err(|reason| {
            warn!(model = %kind.slug(), path = %path.display(), %reason, "Model artifact rejected");
            load_error(reason)
        })?;
        let artifact = Arc::new(artifact);

        info!(
            model = %kind.slug(),
            model_type = artifact.model.type_name(),
            capability = ?artifact.capability(),
            "Model artifact loaded"
        );

        if let Some(cache) = &self.cache {
            cache.insert(
                path,
                CachedArtifact {
                    stamp,
                    artifact: artifact.clone(),
                },
            );
        }

        Ok(artifact)
    }

    /// Reads the JSON list of training columns.
    pub async fn load_schema(&self) -> Result<ExpectedFeatureSchema, SchemaUnavailable> {
        let path = self.schema_path.display().to_string();

        let bytes = match tokio::fs::read(&self.schema_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SchemaUnavailable::Missing { path })
            }
            Err(e) => {
                return Err(SchemaUnavailable::Unreadable {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        let schema: ExpectedFeatureSchema =
            serde_json::from_slice(&bytes).map_err(|e| SchemaUnavailable::Unreadable {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if schema.is_empty() {
            return Err(SchemaUnavailable::Empty { path });
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(column) = schema.columns().iter().find(|c| !seen.insert(c.as_str())) {
            return Err(SchemaUnavailable::Duplicate {
                path,
                column: column.clone(),
            });
        }

        Ok(schema)
    }
}
