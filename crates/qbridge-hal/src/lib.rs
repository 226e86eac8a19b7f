//! qbridge job interfaces
//!
//! Transpiling a circuit produces native text for a framework. This crate
//! describes what happens next: handing that text to an execution target and
//! following the job it creates. The transpiler never calls into it.
//!
//! - [`JobSubmitter`] accepts a [`JobPayload`] and returns a [`JobId`]
//! - [`JobHandle`] reports [`JobStatus`], fetches a [`JobResult`] and cancels
//! - [`InMemoryBackend`] implements both without executing anything
//!
//! # Example
//!
//! ```ignore
//! use qbridge_hal::{InMemoryBackend, JobHandle, JobPayload, JobSubmitter};
//! use qbridge_ir::FrameworkId;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryBackend::new("dry-run");
//!     let payload = JobPayload::new(FrameworkId::OpenQasm3, qasm_text);
//!     let job = backend.submit(&payload, 1000).await?;
//!
//!     let result = backend
//!         .wait(&job, Duration::from_millis(100), Duration::from_secs(10))
//!         .await?;
//!     if let Some((bits, n)) = result.counts.most_frequent() {
//!         println!("{bits}: {n}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod counts;
pub mod error;
pub mod job;
pub mod memory;
pub mod submitter;

pub use counts::Counts;
pub use error::{HalError, HalResult};
pub use job::{JobId, JobPayload, JobResult, JobStatus};
pub use memory::InMemoryBackend;
pub use submitter::{JobHandle, JobSubmitter};
