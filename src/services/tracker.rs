use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::job::{Job, JobOutcome, JobState};
use crate::services::gateway::Colorizer;
use crate::services::storage::{ImageStore, StorageError};

/// Failure diagnostic recorded when the processing deadline passes.
pub const TIMEOUT_REASON: &str = "Processing timed out";

/// In-memory registry of colorization jobs plus the state machine that
/// governs them.
///
/// `Processing -> Completed` and `Processing -> Failed` are the only
/// transitions. Every transition happens under the record's map guard and
/// guards are never held across an await point, so whichever terminal
/// write takes the guard first is final and later reports are discarded.
pub struct JobTracker {
    jobs: DashMap<Uuid, Job>,
    store: Arc<ImageStore>,
    gateway: Arc<dyn Colorizer>,
    timeout: Duration,
}

impl JobTracker {
    pub fn new(store: Arc<ImageStore>, gateway: Arc<dyn Colorizer>, timeout: Duration) -> Self {
        Self {
            jobs: DashMap::new(),
            store,
            gateway,
            timeout,
        }
    }

    /// Register a new job and hand the image to the inference gateway.
    ///
    /// Returns the job id as soon as the record exists; the dispatch task
    /// runs in the background and reports back through
    /// [`report_outcome`](Self::report_outcome) when inference finishes.
    pub fn submit(self: &Arc<Self>, image: Vec<u8>) -> Uuid {
        let job = Job::new();
        let id = job.id;
        self.jobs.insert(id, job);

        metrics::counter!("colorize_jobs_total").increment(1);
        metrics::gauge!("colorize_jobs_in_flight").increment(1.0);
        tracing::info!(job_id = %id, bytes = image.len(), "Job submitted, dispatching to model server");

        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = match tracker.gateway.colorize(&image).await {
                Ok(colorized) => JobOutcome::Success(colorized),
                Err(e) => JobOutcome::Failure(e.to_string()),
            };
            tracker.report_outcome(id, outcome).await;
        });

        id
    }

    /// Record the gateway's outcome for a job.
    ///
    /// A job that already reached a terminal state keeps it; the late
    /// outcome is discarded. Unknown ids are logged and dropped so a stale
    /// callback cannot fail anything else.
    pub async fn report_outcome(&self, id: Uuid, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Success(colorized) => {
                let key = result_key(id);
                // Persist before taking the record guard; the state only
                // flips to completed once the bytes are durably on disk.
                if let Err(e) = self.store.save(&key, &colorized).await {
                    tracing::error!(job_id = %id, error = %e, "Failed to persist colorized image");
                    self.transition(
                        id,
                        JobState::Failed {
                            error: format!("Failed to store colorized image: {e}"),
                        },
                    );
                    return;
                }
                let completed = self.transition(
                    id,
                    JobState::Completed {
                        result_key: key.clone(),
                    },
                );
                if !completed {
                    // The record went terminal while we were writing, so
                    // the file on disk is an orphan.
                    if let Err(e) = self.store.delete(&key).await {
                        tracing::warn!(job_id = %id, error = %e, "Failed to remove discarded result");
                    }
                }
            }
            JobOutcome::Failure(reason) => {
                self.transition(id, JobState::Failed { error: reason });
            }
        }
    }

    /// Current state of a job, applying the lazy timeout policy.
    ///
    /// A `Processing` record older than the configured threshold is failed
    /// with [`TIMEOUT_REASON`] at the moment of the poll; no background
    /// sweeper exists.
    pub fn status(&self, id: Uuid) -> Result<Job, TrackerError> {
        let expired = {
            let entry = self.jobs.get(&id).ok_or(TrackerError::NotFound)?;
            entry.state.is_processing() && Utc::now() - entry.submitted_at > self.timeout
        };
        if expired {
            // Re-checked under the record guard, so a genuine outcome that
            // lands in between still wins.
            self.transition(
                id,
                JobState::Failed {
                    error: TIMEOUT_REASON.to_string(),
                },
            );
        }
        self.jobs
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(TrackerError::NotFound)
    }

    /// Bytes of the completed result image.
    pub async fn result(&self, id: Uuid) -> Result<Vec<u8>, TrackerError> {
        let key = {
            let entry = self.jobs.get(&id).ok_or(TrackerError::NotFound)?;
            match &entry.state {
                JobState::Completed { result_key } => result_key.clone(),
                _ => return Err(TrackerError::NotReady),
            }
        };
        Ok(self.store.load(&key).await?)
    }

    /// Number of jobs currently in `Processing`.
    pub fn in_flight(&self) -> usize {
        self.jobs
            .iter()
            .filter(|entry| entry.state.is_processing())
            .count()
    }

    /// Apply a terminal transition if the job is still `Processing`.
    ///
    /// Returns false when the record is unknown, already terminal, or the
    /// target state is not terminal.
    fn transition(&self, id: Uuid, to: JobState) -> bool {
        let Some(mut entry) = self.jobs.get_mut(&id) else {
            tracing::warn!(job_id = %id, "Outcome for unknown job discarded");
            return false;
        };
        if entry.state.is_terminal() {
            tracing::warn!(job_id = %id, state = %entry.state, "Late outcome for settled job discarded");
            return false;
        }

        let elapsed_secs = (Utc::now() - entry.submitted_at).num_milliseconds() as f64 / 1000.0;
        match &to {
            JobState::Completed { .. } => {
                metrics::counter!("colorize_jobs_completed").increment(1);
                tracing::info!(job_id = %id, elapsed_secs, "Job completed");
            }
            JobState::Failed { error } => {
                metrics::counter!("colorize_jobs_failed").increment(1);
                tracing::warn!(job_id = %id, elapsed_secs, error = %error, "Job failed");
            }
            JobState::Processing => return false,
        }
        metrics::gauge!("colorize_jobs_in_flight").decrement(1.0);
        metrics::histogram!("colorize_processing_seconds").record(elapsed_secs);
        entry.state = to;
        true
    }
}

/// Store key for a job's colorized output.
fn result_key(id: Uuid) -> String {
    format!("{id}_colorized.png")
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Job not found")]
    NotFound,

    #[error("Job has not completed yet")]
    NotReady,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
