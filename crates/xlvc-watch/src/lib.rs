//! A debouncing filesystem watcher over a set of workbook directory roots.
//!
//! Wraps an OS-level `notify` watcher with a per-path coalescing window so
//! consumers see at most one event per `(path, final-kind)` per quiet
//! period, plus ignore-pattern and extension filtering.

pub mod debounce;
pub mod event;
pub mod ignore;
pub mod watcher;

pub use event::WatchEvent;
pub use watcher::{FileWatcher, WatchConfig};
