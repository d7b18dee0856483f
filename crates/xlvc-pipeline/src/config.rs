//! Pipeline configuration: worker sizing, backpressure marks, timeouts, and
//! the settings forwarded to the chunking store and VCS adapter.

use std::path::PathBuf;
use std::time::Duration;

use xlvc_chunk::ChunkWriteOptions;
use xlvc_model::codec::CodecOptions;

/// Configuration for [`crate::dispatcher::Pipeline::start`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub repo_root: PathBuf,
    pub data_dir: String,
    /// Bounded worker pool size. Defaults to the number of CPU cores, with
    /// a floor of 2.
    pub worker_count: usize,
    /// Queue depth at which the dispatcher stops consuming watcher events.
    pub high_water_mark: usize,
    /// Queue depth at which the dispatcher resumes consuming watcher events.
    pub low_water_mark: usize,
    pub decode_timeout: Duration,
    pub commit_timeout: Duration,
    pub chunk_options: ChunkWriteOptions,
    /// Options forwarded to `xlvc_model::codec::decode_file` on every job.
    pub codec_options: CodecOptions,
    /// Commit message template; see `xlvc_vcs::template`.
    pub commit_template: String,
    pub commit_author_name: String,
    pub commit_author_email: String,
}

impl PipelineConfig {
    pub fn new(repo_root: PathBuf) -> Self {
        Self {
            repo_root,
            data_dir: ".xlvc".to_string(),
            worker_count: default_worker_count(),
            high_water_mark: 64,
            low_water_mark: 16,
            decode_timeout: Duration::from_secs(60),
            commit_timeout: Duration::from_secs(10),
            chunk_options: ChunkWriteOptions::default(),
            codec_options: CodecOptions::default(),
            commit_template: "{action}: {filename}".to_string(),
            commit_author_name: "xlvc".to_string(),
            commit_author_email: "xlvc@localhost".to_string(),
        }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(2).max(2)
}
