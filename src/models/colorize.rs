use serde::Serialize;
use uuid::Uuid;

use crate::models::job::{Job, JobState};

/// Response body for a successful upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub job_id: Uuid,
    pub message: String,
}

/// Response body for a status poll.
///
/// Field presence follows the state: `message` while processing,
/// `image_url` once completed, `error` once failed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    /// Wire view of a job for the polling clients.
    pub fn from_job(job: &Job) -> Self {
        let status = job.state.to_string();
        match &job.state {
            JobState::Processing => Self {
                status,
                image_url: None,
                error: None,
                message: Some("Image is being processed".to_string()),
            },
            JobState::Completed { .. } => Self {
                status,
                image_url: Some(format!("/api/processed/{}", job.id)),
                error: None,
                message: None,
            },
            JobState::Failed { error } => Self {
                status,
                image_url: None,
                error: Some(error.clone()),
                message: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_view_has_message_only() {
        let job = Job::new();
        let view = StatusResponse::from_job(&job);
        assert_eq!(view.status, "processing");
        assert!(view.image_url.is_none());
        assert!(view.error.is_none());
        assert_eq!(view.message.as_deref(), Some("Image is being processed"));
    }

    #[test]
    fn test_completed_view_points_at_processed_route() {
        let mut job = Job::new();
        job.state = JobState::Completed {
            result_key: format!("{}_colorized.png", job.id),
        };
        let view = StatusResponse::from_job(&job);
        assert_eq!(view.status, "completed");
        assert_eq!(view.image_url, Some(format!("/api/processed/{}", job.id)));
        assert!(view.error.is_none());
    }

    #[test]
    fn test_failed_view_carries_diagnostic() {
        let mut job = Job::new();
        job.state = JobState::Failed {
            error: "Model server error: 500".to_string(),
        };
        let view = StatusResponse::from_job(&job);
        assert_eq!(view.status, "failed");
        assert_eq!(view.error.as_deref(), Some("Model server error: 500"));
        assert!(view.image_url.is_none());
    }
}
