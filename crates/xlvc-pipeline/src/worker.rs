//! Running a single job: decode/write/commit, or remove/commit for a
//! deletion, each under its own timeout.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use xlvc_model::error::{Error, Result};
use xlvc_vcs::{Action, VcsAdapter};

use crate::config::PipelineConfig;
use crate::job::{Job, JobKind};

/// Run `job` to completion, returning the number of bytes written to the
/// chunk directory (0 for a deletion).
///
/// `vcs` is a single adapter shared by every worker, guarded by a mutex:
/// the working tree's index is a process-wide resource, so stage+commit is
/// serialized even though decode and chunk writes run in parallel per path.
pub fn process_job(job: &Job, config: &PipelineConfig, vcs: &Mutex<VcsAdapter>, cancelled: &AtomicBool) -> Result<u64> {
    let dest_dir = xlvc_chunk::locate(&job.path, &config.repo_root, &config.data_dir);

    match &job.kind {
        JobKind::Deleted => {
            if dest_dir.exists() {
                fs::remove_dir_all(&dest_dir).map_err(|e| Error::IOError(e.to_string()))?;
            }
            let deadline = Instant::now() + config.commit_timeout;
            stage_and_commit(vcs, config, Action::Delete, &job.path, &dest_dir, 0, deadline)?;
            Ok(0)
        }
        JobKind::Created | JobKind::Modified | JobKind::Renamed { .. } => {
            let decode_path = job.path.clone();
            let codec_options = config.codec_options.clone();
            let document = run_with_timeout(config.decode_timeout, move || {
                xlvc_model::codec::decode_file(&decode_path, &codec_options)
            })?;

            if cancelled.load(Ordering::SeqCst) {
                return Err(Error::ShuttingDown);
            }

            let manifest = xlvc_chunk::write(&document, &dest_dir, config.chunk_options)?;
            let bytes_written = directory_size(&dest_dir).unwrap_or(0);
            let file_count = manifest.sheets.len() + 1;

            let action = if matches!(job.kind, JobKind::Created) { Action::Add } else { Action::Update };
            let deadline = Instant::now() + config.commit_timeout;
            stage_and_commit(vcs, config, action, &job.path, &dest_dir, file_count, deadline)?;

            Ok(bytes_written)
        }
    }
}

/// Stage `dest_dir` (this job's own chunk output, never the whole working
/// tree) and commit, bailing out with [`Error::Timeout`] before running
/// either step once `deadline` has passed rather than running the step and
/// reporting a timeout after the fact -- a reported timeout must mean the
/// step never ran, since callers retry against the resulting VCS state.
#[allow(clippy::too_many_arguments)]
fn stage_and_commit(
    vcs: &Mutex<VcsAdapter>,
    config: &PipelineConfig,
    action: Action,
    path: &Path,
    dest_dir: &Path,
    file_count: usize,
    deadline: Instant,
) -> Result<()> {
    let vcs = vcs.lock().expect("vcs mutex poisoned");

    if Instant::now() >= deadline {
        return Err(Error::Timeout(config.commit_timeout));
    }
    let stage_path = dest_dir
        .strip_prefix(&config.repo_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| dest_dir.to_path_buf());
    vcs.stage(&[stage_path])?;

    if Instant::now() >= deadline {
        return Err(Error::Timeout(config.commit_timeout));
    }
    let branch = vcs.current_branch();
    let timestamp = chrono::Utc::now().to_rfc3339();
    let filename = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let values = xlvc_vcs::standard_placeholders(action, &filename, &timestamp, branch.as_deref(), file_count);
    let message = xlvc_vcs::render(&config.commit_template, &values);
    vcs.commit(&message, &config.commit_author_name, &config.commit_author_email, chrono::Utc::now())?;
    Ok(())
}

/// Run `f` on a helper thread, failing with [`Error::Timeout`] if it does
/// not complete within `timeout`. Used for the codec decode step, which has
/// no native cancellation point.
fn run_with_timeout<T, F>(timeout: Duration, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(timeout).unwrap_or(Err(Error::Timeout(timeout)))
}

fn directory_size(dir: &Path) -> std::io::Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_timeout_returns_result_when_fast() {
        let result = run_with_timeout(Duration::from_secs(1), || Ok::<_, Error>(42));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_run_with_timeout_fails_when_slow() {
        let result = run_with_timeout(Duration::from_millis(10), || {
            std::thread::sleep(Duration::from_millis(100));
            Ok::<_, Error>(())
        });
        assert!(matches!(result, Err(Error::Timeout(_))));
    }
}
