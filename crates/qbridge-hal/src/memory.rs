//! In-memory submitter for tests and dry runs.
//!
//! Jobs never execute. Each call to [`InMemoryBackend::advance`] moves every
//! live job one step along the lifecycle, and completed jobs report a fixed
//! histogram configured with [`InMemoryBackend::with_outcome`].

use async_trait::async_trait;
use qbridge_ir::FrameworkId;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::counts::Counts;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobPayload, JobResult, JobStatus};
use crate::submitter::{JobHandle, JobSubmitter};

#[derive(Debug, Clone)]
struct StoredJob {
    payload: JobPayload,
    shots: u32,
    status: JobStatus,
    result: Option<JobResult>,
}

/// A submitter and job handle backed by a map.
#[derive(Clone)]
pub struct InMemoryBackend {
    name: String,
    accepts: Vec<FrameworkId>,
    outcome: Option<Counts>,
    jobs: Arc<RwLock<FxHashMap<String, StoredJob>>>,
}

impl InMemoryBackend {
    /// A backend accepting every framework.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accepts: FrameworkId::ALL.to_vec(),
            outcome: None,
            jobs: Arc::new(RwLock::new(FxHashMap::default())),
        }
    }

    /// Restrict the accepted frameworks.
    pub fn accepting(mut self, frameworks: &[FrameworkId]) -> Self {
        self.accepts = frameworks.to_vec();
        self
    }

    /// Histogram reported by completed jobs. Without one, every shot lands
    /// on `"0"`.
    pub fn with_outcome(mut self, counts: Counts) -> Self {
        self.outcome = Some(counts);
        self
    }

    /// Move every live job one step forward.
    pub async fn advance(&self) {
        let mut jobs = self.jobs.write().await;
        for (id, job) in jobs.iter_mut() {
            let next = match job.status {
                JobStatus::Initializing => JobStatus::Queued,
                JobStatus::Queued => JobStatus::Running,
                JobStatus::Running => JobStatus::Completed,
                JobStatus::Cancelling => JobStatus::Cancelled,
                _ => continue,
            };
            if next == JobStatus::Completed {
                let counts = self
                    .outcome
                    .clone()
                    .unwrap_or_else(|| [("0", u64::from(job.shots))].into_iter().collect());
                job.result = Some(JobResult::new(JobId::new(id.clone()), counts, job.shots));
            }
            debug!(job = %id, from = %job.status, to = %next, "advance");
            job.status = next;
        }
    }

    /// Mark a live job as failed.
    pub async fn fail(&self, job_id: &JobId, reason: impl Into<String>) -> HalResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        let failed = JobStatus::Failed(reason.into());
        if job.status.can_transition_to(&failed) {
            job.status = failed;
        }
        Ok(())
    }

    /// Payload a job was submitted with.
    pub async fn payload(&self, job_id: &JobId) -> HalResult<JobPayload> {
        let jobs = self.jobs.read().await;
        jobs.get(&job_id.0)
            .map(|job| job.payload.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }
}

#[async_trait]
impl JobSubmitter for InMemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self) -> &[FrameworkId] {
        &self.accepts
    }

    async fn submit(&self, payload: &JobPayload, shots: u32) -> HalResult<JobId> {
        if !self.accepts.contains(&payload.framework) {
            return Err(HalError::UnsupportedPayload(format!(
                "{} does not accept {} payloads",
                self.name, payload.framework
            )));
        }
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if payload.body.trim().is_empty() {
            return Err(HalError::SubmissionFailed("empty payload".into()));
        }
        if !matches!(
            payload.framework,
            FrameworkId::OpenQasm2 | FrameworkId::OpenQasm3
        ) {
            serde_json::from_str::<serde_json::Value>(&payload.body)?;
        }

        let id = JobId::generate();
        let job = StoredJob {
            payload: payload.clone(),
            shots,
            status: JobStatus::Initializing,
            result: None,
        };
        self.jobs.write().await.insert(id.0.clone(), job);
        info!(job = %id, backend = %self.name, framework = %payload.framework, shots, "job submitted");
        Ok(id)
    }
}

#[async_trait]
impl JobHandle for InMemoryBackend {
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self.jobs.read().await;
        jobs.get(&job_id.0)
            .map(|job| job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<JobResult> {
        let jobs = self.jobs.read().await;
        let job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match (&job.status, &job.result) {
            (JobStatus::Completed, Some(result)) => Ok(result.clone()),
            (status, _) => Err(HalError::ResultNotReady {
                job: job_id.0.clone(),
                status: status.clone(),
            }),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if job.status.is_pending() {
            job.status = JobStatus::Cancelling;
        }
        Ok(())
    }
}
