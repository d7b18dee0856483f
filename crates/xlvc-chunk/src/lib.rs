//! Content-addressed, per-sheet chunking store.
//!
//! A workbook document is rendered to a directory of small, diff-friendly
//! JSON files -- one per sheet plus a workbook-level file -- tracked by a
//! manifest that records a content digest for each chunk. The store is the
//! textual representation a VCS actually tracks; [`xlvc_model::codec`]
//! handles the binary side.

pub mod layout;
pub mod manifest;
pub mod store;

pub use layout::locate;
pub use manifest::{ChunkManifest, SheetManifestEntry, SCHEMA_VERSION};
pub use store::{is_up_to_date, read, write, ChunkWriteOptions, WorkbookChunk};
