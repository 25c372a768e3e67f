use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::forecasting::Clock;
use crate::errors::ServiceError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Contact form submission
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct FeedbackSubmission {
    #[serde(default)]
    #[validate(length(max = 200))]
    #[schema(example = "Ada")]
    pub name: String,

    #[validate(email)]
    #[schema(example = "ada@example.com")]
    pub email: String,

    #[validate(length(max = 5000), custom = "validate_not_blank")]
    #[schema(example = "The SARIMA forecast looks great")]
    pub message: String,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Must not be empty".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedbackReceipt {
    pub received_at: DateTime<Utc>,
}

/// Appends one line per submission to the feedback file.
#[derive(Debug, Clone)]
pub struct FeedbackService {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    write_lock: Arc<Mutex<()>>,
}

impl FeedbackService {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<timestamp> | <name> | <email> | <message>` with embedded line breaks
    /// flattened to spaces.
    pub fn format_line(submission: &FeedbackSubmission, at: DateTime<Utc>) -> String {
        format!(
            "{} | {} | {} | {}\n",
            at.format(TIMESTAMP_FORMAT),
            single_line(&submission.name),
            single_line(&submission.email),
            single_line(&submission.message)
        )
    }

    pub async fn submit(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<FeedbackReceipt, ServiceError> {
        submission.validate()?;

        let received_at = self.clock.now();
        let line = Self::format_line(submission, received_at);

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        info!(path = %self.path.display(), "Feedback recorded");
        Ok(FeedbackReceipt { received_at })
    }
}

fn single_line(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
