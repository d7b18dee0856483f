//! The debouncing filesystem watcher: wraps `notify`'s OS-level watcher with
//! the coalescing state machine and ignore filtering.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use xlvc_model::error::{Error, Result};

use crate::debounce::{Debouncer, RawKind};
use crate::event::WatchEvent;
use crate::ignore::EventFilter;

/// Configuration driving a [`FileWatcher`].
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub directories: Vec<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub debounce_delay: Duration,
    pub file_extensions: HashSet<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            ignore_patterns: crate::ignore::default_ignore_patterns(),
            debounce_delay: Duration::from_millis(500),
            file_extensions: ["xlsx".to_string(), "xlsm".to_string()].into_iter().collect(),
        }
    }
}

/// A running watcher. Dropping it does not stop the background dispatcher;
/// call [`FileWatcher::stop`] explicitly.
pub struct FileWatcher {
    roots: Arc<Mutex<HashSet<PathBuf>>>,
    notify_watcher: RecommendedWatcher,
    events_rx: Receiver<WatchEvent>,
    stop_tx: Sender<()>,
    dispatcher: Option<JoinHandle<()>>,
}

impl FileWatcher {
    /// Start watching `config.directories`. The dispatcher thread runs
    /// until [`stop`](Self::stop) is called.
    pub fn start(config: WatchConfig) -> Result<Self> {
        let (raw_tx, raw_rx) = crossbeam_channel::unbounded::<notify::Result<Event>>();
        let mut notify_watcher = notify::recommended_watcher(move |res| {
            let _ = raw_tx.send(res);
        })
        .map_err(|e| Error::Internal(format!("failed to start filesystem watcher: {e}")))?;

        let roots = Arc::new(Mutex::new(HashSet::new()));
        for dir in &config.directories {
            notify_watcher
                .watch(dir, RecursiveMode::Recursive)
                .map_err(|e| Error::Internal(format!("failed to watch '{}': {e}", dir.display())))?;
            roots.lock().expect("roots mutex poisoned").insert(dir.clone());
        }
        tracing::info!(roots = config.directories.len(), "filesystem watcher started");

        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);

        let filter = EventFilter::new(config.ignore_patterns.clone(), config.file_extensions.clone());
        let delay = config.debounce_delay;
        let dispatcher = std::thread::Builder::new()
            .name("xlvc-watch-dispatcher".to_string())
            .spawn(move || dispatch_loop(raw_rx, stop_rx, events_tx, filter, delay))
            .map_err(|e| Error::Internal(format!("failed to spawn watcher dispatcher: {e}")))?;

        Ok(Self {
            roots,
            notify_watcher,
            events_rx,
            stop_tx,
            dispatcher: Some(dispatcher),
        })
    }

    /// The coalesced event stream.
    pub fn events(&self) -> &Receiver<WatchEvent> {
        &self.events_rx
    }

    /// Stop taking new events, drain nothing further, and wait for the
    /// dispatcher to exit. Idempotent.
    pub fn stop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.dispatcher.take() {
            let _ = handle.join();
        }
    }

    /// Start watching an additional root.
    pub fn add_root(&mut self, dir: &Path) -> Result<()> {
        self.notify_watcher
            .watch(dir, RecursiveMode::Recursive)
            .map_err(|e| Error::Internal(format!("failed to watch '{}': {e}", dir.display())))?;
        self.roots.lock().expect("roots mutex poisoned").insert(dir.to_path_buf());
        Ok(())
    }

    /// Stop watching a root.
    pub fn remove_root(&mut self, dir: &Path) -> Result<()> {
        self.notify_watcher
            .unwatch(dir)
            .map_err(|e| Error::Internal(format!("failed to unwatch '{}': {e}", dir.display())))?;
        self.roots.lock().expect("roots mutex poisoned").remove(dir);
        Ok(())
    }

    /// The currently watched roots.
    pub fn watched_roots(&self) -> Vec<PathBuf> {
        self.roots.lock().expect("roots mutex poisoned").iter().cloned().collect()
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn dispatch_loop(
    raw_rx: Receiver<notify::Result<Event>>,
    stop_rx: Receiver<()>,
    events_tx: Sender<WatchEvent>,
    filter: EventFilter,
    delay: Duration,
) {
    let mut debouncer = Debouncer::new(delay);
    let tick = Duration::from_millis(50).min(delay);

    loop {
        if stop_rx.try_recv().is_ok() {
            return;
        }

        crossbeam_channel::select! {
            recv(raw_rx) -> msg => match msg {
                Ok(Ok(event)) => record_event(&mut debouncer, &event),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "watcher channel overflowed, requesting a resync");
                    let _ = events_tx.send(WatchEvent::Resync);
                }
                Err(_) => return,
            },
            recv(stop_rx) -> _ => return,
            default(tick) => {}
        }

        let now = Instant::now();
        for event in debouncer.flush_ready(now) {
            if let Some(path) = event.path() {
                if filter.should_ignore(path) {
                    continue;
                }
            }
            if events_tx.send(event).is_err() {
                return;
            }
        }
    }
}

fn record_event(debouncer: &mut Debouncer, event: &Event) {
    let now = Instant::now();
    match &event.kind {
        EventKind::Create(_) => {
            for path in &event.paths {
                debouncer.record(path.clone(), RawKind::Created, now);
            }
        }
        EventKind::Remove(_) => {
            for path in &event.paths {
                debouncer.record(path.clone(), RawKind::Deleted, now);
            }
        }
        EventKind::Modify(notify::event::ModifyKind::Name(notify::event::RenameMode::Both)) => {
            if let [from, to] = event.paths.as_slice() {
                debouncer.record(from.clone(), RawKind::RenamedTo(to.clone()), now);
            }
        }
        EventKind::Modify(_) => {
            for path in &event.paths {
                debouncer.record(path.clone(), RawKind::Modified, now);
            }
        }
        _ => {}
    }
}
