use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// A CSV file as header plus string rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SampleData {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Serves the bundled historical forecast.
#[derive(Debug, Clone)]
pub struct SampleDataService {
    path: PathBuf,
}

impl SampleDataService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<SampleData, ServiceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ServiceError::NotFound(format!(
                    "sample data file {}",
                    self.path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes.as_slice());
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        debug!(path = %self.path.display(), rows = rows.len(), "Sample data loaded");
        Ok(SampleData {
            source: self.path.display().to_string(),
            headers,
            rows,
        })
    }
}
