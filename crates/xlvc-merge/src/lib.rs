//! Domain-aware conflict resolution for chunk files.
//!
//! A merge tool hands this crate the conflicted text of a `workbook.json` or
//! `sheet_*.json` chunk file; it parses the standard three-line conflict
//! markers and resolves each region according to the chosen strategy,
//! falling back to whole-document semantic merging by default rather than
//! treating the file as opaque lines.

pub mod conflict;
pub mod semantic;
pub mod strategy;

pub use conflict::{ConflictRegion, Segment, Side};
pub use strategy::{resolve_file, ChunkKind, InteractiveResolver, InteractiveVerdict, ResolutionStrategy};
