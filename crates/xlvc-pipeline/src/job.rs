//! The unit of work a dispatcher worker runs for one watcher event.

use std::path::PathBuf;

use xlvc_watch::WatchEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    Created,
    Modified,
    Deleted,
    Renamed { from: PathBuf },
}

/// One workbook path plus what happened to it. `path` is always the
/// current location (the `to` side of a rename).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub path: PathBuf,
    pub kind: JobKind,
}

impl Job {
    /// Convert a coalesced watcher event into a job. `Resync` has no single
    /// path and is handled by the dispatcher as a full-scan trigger instead.
    pub fn from_event(event: WatchEvent) -> Option<Job> {
        match event {
            WatchEvent::Created(path) => Some(Job { path, kind: JobKind::Created }),
            WatchEvent::Modified(path) => Some(Job { path, kind: JobKind::Modified }),
            WatchEvent::Deleted(path) => Some(Job { path, kind: JobKind::Deleted }),
            WatchEvent::Renamed { from, to } => Some(Job { path: to, kind: JobKind::Renamed { from } }),
            WatchEvent::Resync => None,
        }
    }
}
