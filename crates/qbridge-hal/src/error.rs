//! Error types for the job interfaces.

use thiserror::Error;

use crate::job::JobStatus;

/// Errors raised by job submitters and job handles.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The submitter refused the payload.
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    /// The payload is in a framework the submitter does not accept.
    #[error("Unsupported payload: {0}")]
    UnsupportedPayload(String),

    /// Shot count outside the accepted range.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// Job execution failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job cancelled")]
    JobCancelled,

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// A result was requested before the job completed.
    #[error("Job {job} has no result yet (status: {status})")]
    ResultNotReady {
        /// The job.
        job: String,
        /// Its status at the time of the request.
        status: JobStatus,
    },

    /// Timeout waiting for job.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for job operations.
pub type HalResult<T> = Result<T, HalError>;
