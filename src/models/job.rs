use chrono::{DateTime, Utc};
use strum::Display;
use uuid::Uuid;

/// State of a colorization job.
///
/// Terminal states carry their payload: a completed job always has a store
/// key for its result, a failed job always has a diagnostic, and neither
/// can exist in any other state.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum JobState {
    Processing,
    Completed { result_key: String },
    Failed { error: String },
}

impl JobState {
    pub fn is_processing(&self) -> bool {
        matches!(self, JobState::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_processing()
    }
}

/// A tracked colorization job.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub state: JobState,
}

impl Job {
    /// Fresh job in `Processing` with a newly allocated id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            state: JobState::Processing,
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome reported back by the inference gateway when a dispatch finishes.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Success(Vec<u8>),
    Failure(String),
}
