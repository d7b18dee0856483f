//! The dispatcher: consumes coalesced watcher events, runs jobs across a
//! bounded worker pool, and applies per-path supersession and queue-depth
//! backpressure.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use xlvc_model::error::Error;
use xlvc_vcs::VcsAdapter;
use xlvc_watch::{FileWatcher, WatchConfig};

use crate::config::PipelineConfig;
use crate::events::PipelineEvent;
use crate::job::Job;
use crate::worker;

struct State {
    /// At most one queued-but-not-started job per path; a new event for the
    /// same path overwrites the slot instead of growing the queue.
    queued: HashMap<PathBuf, Job>,
    in_flight: HashSet<PathBuf>,
}

type SharedState = Arc<(Mutex<State>, Condvar)>;

/// The running pipeline: watcher, dispatcher, and worker pool wired
/// together, emitting [`PipelineEvent`]s as jobs complete.
pub struct Pipeline {
    config: PipelineConfig,
    state: SharedState,
    shutting_down: Arc<AtomicBool>,
    hard_cancelled: Arc<AtomicBool>,
    watcher: FileWatcher,
    events_rx: Receiver<PipelineEvent>,
    ingest_handle: Option<JoinHandle<()>>,
    worker_handles: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Open the VCS working tree at `config.repo_root`, start the watcher,
    /// and spin up `config.worker_count` workers.
    pub fn start(config: PipelineConfig, watch_config: WatchConfig) -> xlvc_model::error::Result<Self> {
        let vcs = Arc::new(Mutex::new(VcsAdapter::open(&config.repo_root)?));
        let watcher = FileWatcher::start(watch_config)?;

        let state: SharedState = Arc::new((
            Mutex::new(State { queued: HashMap::new(), in_flight: HashSet::new() }),
            Condvar::new(),
        ));
        let shutting_down = Arc::new(AtomicBool::new(false));
        let hard_cancelled = Arc::new(AtomicBool::new(false));
        let (events_tx, events_rx) = crossbeam_channel::unbounded();

        let ingest_handle = spawn_ingest(
            watcher.events().clone(),
            state.clone(),
            shutting_down.clone(),
            config.high_water_mark,
            config.low_water_mark,
        );

        let worker_handles = (0..config.worker_count)
            .map(|_| spawn_worker(config.clone(), state.clone(), vcs.clone(), shutting_down.clone(), hard_cancelled.clone(), events_tx.clone()))
            .collect();

        Ok(Self {
            config,
            state,
            shutting_down,
            hard_cancelled,
            watcher,
            events_rx,
            ingest_handle: Some(ingest_handle),
            worker_handles,
        })
    }

    /// The job observability stream: `job_started`, `job_succeeded`,
    /// `job_failed`.
    pub fn events(&self) -> &Receiver<PipelineEvent> {
        &self.events_rx
    }

    pub fn watched_roots(&self) -> Vec<PathBuf> {
        self.watcher.watched_roots()
    }

    /// Graceful shutdown: stop the watcher, drain in-flight and queued jobs
    /// to completion, then return once every worker has exited. New events
    /// arriving after this call starts are never enqueued.
    pub fn shutdown(&mut self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.watcher.stop();
        if let Some(handle) = self.ingest_handle.take() {
            let _ = handle.join();
        }
        self.state.1.notify_all();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }

    /// Test-only hard cancel: aborts in-flight jobs at their next I/O
    /// checkpoint instead of letting them run to completion. Chunk state is
    /// never left partial since writes are atomic per chunk.
    pub fn hard_cancel(&mut self) {
        self.hard_cancelled.store(true, Ordering::SeqCst);
        self.shutdown();
    }
}

fn spawn_ingest(
    watcher_events: Receiver<xlvc_watch::WatchEvent>,
    state: SharedState,
    shutting_down: Arc<AtomicBool>,
    high_water_mark: usize,
    low_water_mark: usize,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("xlvc-pipeline-ingest".to_string())
        .spawn(move || loop {
            if shutting_down.load(Ordering::SeqCst) {
                return;
            }
            match watcher_events.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => {
                    if let Some(job) = Job::from_event(event) {
                        enqueue(&state, job);
                        apply_backpressure(&state, high_water_mark, low_water_mark);
                    }
                    // `Resync` (no job) is a signal for the host to perform
                    // a full rescan of watched roots; the dispatcher itself
                    // has no rescan loop to re-enter here.
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        })
        .expect("failed to spawn pipeline ingest thread")
}

fn enqueue(state: &SharedState, job: Job) {
    let (mutex, condvar) = &**state;
    let mut guard = mutex.lock().expect("pipeline state mutex poisoned");
    guard.queued.insert(job.path.clone(), job);
    drop(guard);
    condvar.notify_all();
}

fn apply_backpressure(state: &SharedState, high_water_mark: usize, low_water_mark: usize) {
    let (mutex, _condvar) = &**state;
    loop {
        let depth = mutex.lock().expect("pipeline state mutex poisoned").queued.len();
        if depth <= high_water_mark {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
        let depth = mutex.lock().expect("pipeline state mutex poisoned").queued.len();
        if depth < low_water_mark {
            return;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_worker(
    config: PipelineConfig,
    state: SharedState,
    vcs: Arc<Mutex<VcsAdapter>>,
    shutting_down: Arc<AtomicBool>,
    hard_cancelled: Arc<AtomicBool>,
    events_tx: Sender<PipelineEvent>,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("xlvc-pipeline-worker".to_string())
        .spawn(move || loop {
            if hard_cancelled.load(Ordering::SeqCst) {
                return;
            }

            let (mutex, condvar) = &*state;
            let mut guard = mutex.lock().expect("pipeline state mutex poisoned");
            let path = loop {
                if let Some(path) = guard.queued.keys().find(|p| !guard.in_flight.contains(*p)).cloned() {
                    break Some(path);
                }
                if shutting_down.load(Ordering::SeqCst) && guard.queued.is_empty() && guard.in_flight.is_empty() {
                    break None;
                }
                let (next_guard, _timeout_result) =
                    condvar.wait_timeout(guard, Duration::from_millis(100)).expect("pipeline state mutex poisoned");
                guard = next_guard;
            };

            let path = match path {
                Some(path) => path,
                None => return,
            };
            let job = guard.queued.remove(&path).expect("path was selected from the queued map");
            guard.in_flight.insert(path.clone());
            drop(guard);

            let span = tracing::info_span!("job", path = %path.display());
            let _guard = span.enter();

            tracing::debug!("job started");
            let _ = events_tx.send(PipelineEvent::JobStarted { path: path.clone() });
            let started_at = Instant::now();
            let outcome = worker::process_job(&job, &config, &vcs, &hard_cancelled);
            let event = match outcome {
                Ok(bytes_written) => {
                    let duration = started_at.elapsed();
                    tracing::info!(bytes_written, ?duration, "job committed");
                    PipelineEvent::JobSucceeded { path: path.clone(), duration, bytes_written }
                }
                Err(e) => {
                    let kind = error_kind(&e);
                    if matches!(e, Error::ShuttingDown | Error::Timeout(_)) {
                        tracing::warn!(error_kind = %kind, detail = %e, "job did not complete");
                    } else {
                        tracing::error!(error_kind = %kind, detail = %e, "job failed");
                    }
                    PipelineEvent::JobFailed { path: path.clone(), error_kind: kind, detail: e.to_string() }
                }
            };
            let _ = events_tx.send(event);
            drop(_guard);

            let mut guard = mutex.lock().expect("pipeline state mutex poisoned");
            guard.in_flight.remove(&path);
            drop(guard);
            condvar.notify_all();
        })
        .expect("failed to spawn pipeline worker thread")
}

fn error_kind(error: &Error) -> String {
    match error {
        Error::IOError(_) | Error::Io(_) => "IOError",
        Error::FileNotFound(_) => "FileNotFound",
        Error::UnsupportedFormat(_) => "UnsupportedFormat",
        Error::Corrupt(_) => "Corrupt",
        Error::FormulaParseError { .. } => "FormulaParseError",
        Error::SheetTooLarge { .. } => "SheetTooLarge",
        Error::ManifestMismatch(_) => "ManifestMismatch",
        Error::SchemaVersionUnsupported(_) => "SchemaVersionUnsupported",
        Error::InvalidDocument(_) => "InvalidDocument",
        Error::Timeout(_) => "Timeout",
        Error::VCSError(_) => "VCSError",
        Error::MalformedConflict(_) => "MalformedConflict",
        Error::ShuttingDown => "ShuttingDown",
        _ => "Internal",
    }
    .to_string()
}
