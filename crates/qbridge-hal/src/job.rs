//! Job lifecycle types.
//!
//! The job state machine:
//!
//! ```text
//!   submit() ──→ Initializing ──→ Queued ──→ Running ──→ Completed
//!                     │              │          │
//!                     │              │          ├──→ Failed(reason)
//!                     │              │          │
//!                     └──────────────┴──→ Cancelling ──→ Cancelled
//! ```
//!
//! **Invariants:**
//! - Transitions are monotonic: a job never moves backward.
//! - Terminal states (`Completed`, `Failed`, `Cancelled`) are permanent.
//! - A result exists only once the status is `Completed`.
//! - `Unknown` is reported when a submitter cannot map a provider status; it
//!   may be followed by any state.

use chrono::{DateTime, Utc};
use qbridge_ir::FrameworkId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::counts::Counts;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a job ID from an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Accepted, not yet queued.
    Initializing,
    /// Waiting in queue.
    Queued,
    /// Currently running.
    Running,
    /// Cancellation requested.
    Cancelling,
    /// Cancelled.
    Cancelled,
    /// Completed successfully.
    Completed,
    /// Failed with an error message.
    Failed(String),
    /// The provider reported a status with no mapping.
    Unknown,
}

impl JobStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    /// Check if the job is still pending (not yet terminal).
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            JobStatus::Initializing | JobStatus::Queued | JobStatus::Running | JobStatus::Cancelling
        )
    }

    /// Check if the job completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }

    /// Position along the lifecycle; `None` for `Unknown`.
    fn rank(&self) -> Option<u8> {
        match self {
            JobStatus::Initializing => Some(0),
            JobStatus::Queued => Some(1),
            JobStatus::Running => Some(2),
            JobStatus::Cancelling => Some(3),
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled => Some(4),
            JobStatus::Unknown => None,
        }
    }

    /// Whether moving from `self` to `next` respects the lifecycle.
    pub fn can_transition_to(&self, next: &JobStatus) -> bool {
        if self.is_terminal() {
            return self == next;
        }
        if *self == JobStatus::Cancelling {
            // A job may still finish before the cancellation lands.
            return matches!(
                next,
                JobStatus::Cancelling
                    | JobStatus::Cancelled
                    | JobStatus::Completed
                    | JobStatus::Failed(_)
            );
        }
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to >= from,
            _ => true,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Initializing => write!(f, "Initializing"),
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Cancelling => write!(f, "Cancelling"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed(msg) => write!(f, "Failed: {msg}"),
            JobStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A transpiled circuit ready to submit: its framework and serialized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    /// Framework the body is written for.
    pub framework: FrameworkId,
    /// Native circuit text (JSON or OpenQASM).
    pub body: String,
}

impl JobPayload {
    /// Create a payload.
    pub fn new(framework: FrameworkId, body: impl Into<String>) -> Self {
        Self {
            framework,
            body: body.into(),
        }
    }
}

/// Measurement outcome of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// The job that produced it.
    pub job_id: JobId,
    /// Outcome histogram.
    pub counts: Counts,
    /// Shots requested.
    pub shots: u32,
    /// Time the result was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobResult {
    /// Create a result stamped with the current time.
    pub fn new(job_id: JobId, counts: Counts, shots: u32) -> Self {
        Self {
            job_id,
            counts,
            shots,
            finished_at: Some(Utc::now()),
        }
    }
}
