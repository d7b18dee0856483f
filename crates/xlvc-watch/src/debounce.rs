//! Per-path coalescing state machine.
//!
//! Raw filesystem notifications for the same path within a quiet-period
//! window collapse into a single logical event, applying the rules: a
//! `created` absorbs subsequent `modified`s; `created` then `deleted`
//! cancels out; `modified` then `deleted` becomes `deleted`; any sequence
//! ending in a rename becomes `renamed(original_path, last_target)`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::event::WatchEvent;

/// One raw, uncoalesced notification from the underlying OS watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawKind {
    Created,
    Modified,
    Deleted,
    RenamedTo(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingKind {
    Created,
    Modified,
    Deleted,
    Renamed { to: PathBuf },
}

struct PendingEntry {
    kind: PendingKind,
    last_event: Instant,
}

/// Accumulates raw events per path and flushes coalesced ones once their
/// quiet period has elapsed.
pub struct Debouncer {
    delay: std::time::Duration,
    pending: HashMap<PathBuf, PendingEntry>,
}

impl Debouncer {
    pub fn new(delay: std::time::Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Record a raw event for `path`, observed at `now`.
    pub fn record(&mut self, path: PathBuf, raw: RawKind, now: Instant) {
        let existing = self.pending.remove(&path).map(|e| e.kind);
        match merge(existing, raw) {
            Some(kind) => {
                self.pending.insert(path, PendingEntry { kind, last_event: now });
            }
            None => {
                // Cancelled out (e.g. created then deleted); nothing pending.
            }
        }
    }

    /// Flush every entry whose quiet period has elapsed as of `now`,
    /// removing them from the pending set.
    pub fn flush_ready(&mut self, now: Instant) -> Vec<WatchEvent> {
        let ready: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_event) >= self.delay)
            .map(|(path, _)| path.clone())
            .collect();

        let mut events = Vec::with_capacity(ready.len());
        for path in ready {
            if let Some(entry) = self.pending.remove(&path) {
                events.push(match entry.kind {
                    PendingKind::Created => WatchEvent::Created(path),
                    PendingKind::Modified => WatchEvent::Modified(path),
                    PendingKind::Deleted => WatchEvent::Deleted(path),
                    PendingKind::Renamed { to } => WatchEvent::Renamed { from: path, to },
                });
            }
        }
        events
    }

    /// True if no events are waiting out their quiet period.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

fn merge(existing: Option<PendingKind>, raw: RawKind) -> Option<PendingKind> {
    use PendingKind::*;
    use RawKind as R;

    match (existing.clone(), raw) {
        (None, R::Created) => Some(Created),
        (None, R::Modified) => Some(Modified),
        (None, R::Deleted) => Some(Deleted),
        (None, R::RenamedTo(to)) => Some(Renamed { to }),

        (Some(Created), R::Created) => Some(Created),
        (Some(Created), R::Modified) => Some(Created),
        (Some(Created), R::Deleted) => None,
        (Some(Created), R::RenamedTo(to)) => Some(Renamed { to }),

        (Some(Modified), R::Created) => Some(Modified),
        (Some(Modified), R::Modified) => Some(Modified),
        (Some(Modified), R::Deleted) => Some(Deleted),
        (Some(Modified), R::RenamedTo(to)) => Some(Renamed { to }),

        (Some(Deleted), R::Created) => Some(Created),
        (Some(Deleted), R::Modified) => Some(Modified),
        (Some(Deleted), R::Deleted) => Some(Deleted),
        (Some(Deleted), R::RenamedTo(to)) => Some(Renamed { to }),

        (Some(Renamed { .. }), R::Modified) => existing_renamed(existing),
        (Some(Renamed { .. }), R::Created) => existing_renamed(existing),
        (Some(Renamed { .. }), R::Deleted) => Some(Deleted),
        (Some(Renamed { .. }), R::RenamedTo(to)) => Some(Renamed { to }),
    }
}

fn existing_renamed(existing: Option<PendingKind>) -> Option<PendingKind> {
    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> Instant {
        Instant::now() + Duration::from_secs(secs)
    }

    #[test]
    fn test_created_then_modified_coalesces_to_created() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let path = PathBuf::from("Book1.xlsx");
        d.record(path.clone(), RawKind::Created, at(0));
        d.record(path.clone(), RawKind::Modified, at(0));
        let events = d.flush_ready(at(1));
        assert_eq!(events, vec![WatchEvent::Created(path)]);
    }

    #[test]
    fn test_created_then_deleted_cancels() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let path = PathBuf::from("Book1.xlsx");
        d.record(path.clone(), RawKind::Created, at(0));
        d.record(path.clone(), RawKind::Deleted, at(0));
        assert!(d.is_empty());
    }

    #[test]
    fn test_modified_then_deleted_becomes_deleted() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let path = PathBuf::from("Book1.xlsx");
        d.record(path.clone(), RawKind::Modified, at(0));
        d.record(path.clone(), RawKind::Deleted, at(0));
        let events = d.flush_ready(at(1));
        assert_eq!(events, vec![WatchEvent::Deleted(path)]);
    }

    #[test]
    fn test_sequence_ending_in_rename_keeps_original_and_last_target() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let path = PathBuf::from("Book1.xlsx");
        d.record(path.clone(), RawKind::Modified, at(0));
        d.record(path.clone(), RawKind::RenamedTo(PathBuf::from("Budget.xlsx")), at(0));
        let events = d.flush_ready(at(1));
        assert_eq!(
            events,
            vec![WatchEvent::Renamed {
                from: path,
                to: PathBuf::from("Budget.xlsx"),
            }]
        );
    }

    #[test]
    fn test_flush_ready_waits_out_quiet_period() {
        let mut d = Debouncer::new(Duration::from_secs(10));
        let path = PathBuf::from("Book1.xlsx");
        let t0 = Instant::now();
        d.record(path.clone(), RawKind::Modified, t0);
        assert!(d.flush_ready(t0 + Duration::from_secs(1)).is_empty());
        let events = d.flush_ready(t0 + Duration::from_secs(11));
        assert_eq!(events, vec![WatchEvent::Modified(path)]);
    }
}
