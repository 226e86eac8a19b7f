//! Submission and job-handle traits.
//!
//! | Method | Sync/Async | Default | Returns |
//! |--------|------------|---------|---------|
//! | `JobSubmitter::name()` | sync | required | `&str` |
//! | `JobSubmitter::accepts()` | sync | required | `&[FrameworkId]` |
//! | `JobSubmitter::submit()` | async | required | `HalResult<JobId>` |
//! | `JobHandle::status()` | async | required | `HalResult<JobStatus>` |
//! | `JobHandle::result()` | async | required | `HalResult<JobResult>` |
//! | `JobHandle::cancel()` | async | required | `HalResult<()>` |
//! | `JobHandle::wait()` | async | provided | `HalResult<JobResult>` |

use async_trait::async_trait;
use qbridge_ir::FrameworkId;
use std::time::Duration;
use tracing::debug;

use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobPayload, JobResult, JobStatus};

/// Something that accepts transpiled circuits for execution.
///
/// # Contract
///
/// - `submit()` MUST reject payloads whose framework is not in `accepts()`
///   with `HalError::UnsupportedPayload`.
/// - `submit()` MUST reject zero shots with `HalError::InvalidShots`.
/// - A JSON framework payload that does not parse is `HalError::Serialization`.
/// - A freshly submitted job starts in `Initializing` or `Queued`.
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    /// Name of the execution target.
    fn name(&self) -> &str;

    /// Frameworks whose payloads this submitter understands.
    fn accepts(&self) -> &[FrameworkId];

    /// Submit a payload for `shots` repetitions.
    async fn submit(&self, payload: &JobPayload, shots: u32) -> HalResult<JobId>;
}

/// Observation and control of submitted jobs.
///
/// # Contract
///
/// - Successive `status()` calls never move a job backward.
/// - `result()` MUST fail with `HalError::ResultNotReady` unless the status
///   is `Completed`.
/// - `cancel()` on a terminal job is a no-op.
#[async_trait]
pub trait JobHandle: Send + Sync {
    /// Current status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<JobResult>;

    /// Request cancellation.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Poll until the job reaches a terminal state, then return its result.
    async fn wait(
        &self,
        job_id: &JobId,
        poll_interval: Duration,
        timeout: Duration,
    ) -> HalResult<JobResult> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let status = self.status(job_id).await?;
            debug!(job = %job_id, %status, "polled job");
            match status {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                _ => {}
            }
            if tokio::time::Instant::now() + poll_interval > deadline {
                return Err(HalError::Timeout(job_id.0.clone()));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
