//! Observability events emitted once per job.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    JobStarted { path: PathBuf },
    JobSucceeded { path: PathBuf, duration: Duration, bytes_written: u64 },
    JobFailed { path: PathBuf, error_kind: String, detail: String },
}
