//! xlvc: git-friendly version control for Excel (.xlsx) workbooks.
//!
//! Wires together the document codec ([`xlvc_model::codec`]), the
//! content-addressed chunking store ([`xlvc_chunk`]), the debounced
//! filesystem watcher ([`xlvc_watch`]), the VCS commit adapter
//! ([`xlvc_vcs`]), the semantic conflict resolver ([`xlvc_merge`]), and the
//! dispatcher that strings them into a running pipeline ([`xlvc_pipeline`]).
//!
//! A host (CLI, TUI, editor plugin) drives this crate through three
//! surfaces: one-shot `codec::decode_file`/`encode_file` conversions,
//! `chunking::is_up_to_date` for status display, and `Pipeline::start` for
//! the watch-decode-commit loop.

pub use xlvc_model::error::{Error, Result};

/// One-shot workbook <-> document-model conversion, with no watching or
/// commit involved.
pub mod codec {
    pub use xlvc_model::codec::{
        decode_bytes, decode_file, encode_bytes, encode_file, list_sheets, CodecOptions,
    };
}

/// The document model: [`Document`], [`Sheet`], [`Cell`], and friends.
pub use xlvc_model::cell::{Cell, CellValue};
pub use xlvc_model::document::Document;
pub use xlvc_model::sheet::Sheet;

/// The content-addressed chunking store.
pub mod chunking {
    pub use xlvc_chunk::{is_up_to_date, layout::locate, read, write, ChunkManifest, ChunkWriteOptions, WorkbookChunk};
}

/// The debounced filesystem watcher.
pub mod watch {
    pub use xlvc_watch::{FileWatcher, WatchConfig, WatchEvent};
}

/// The git working-tree adapter and commit message templating.
pub mod vcs {
    pub use xlvc_vcs::{render, standard_placeholders, Action, VcsAdapter};
}

/// Semantic merge of conflicted chunk files.
pub mod merge {
    pub use xlvc_merge::conflict::{self, ConflictRegion, Segment, Side};
    pub use xlvc_merge::semantic::{merge_sheets, merge_workbook_chunks};
    pub use xlvc_merge::strategy::{resolve_file, ChunkKind, InteractiveResolver, InteractiveVerdict, ResolutionStrategy};
}

/// The running watch -> decode -> chunk -> commit pipeline.
pub mod pipeline {
    pub use xlvc_pipeline::{Job, JobKind, Pipeline, PipelineConfig, PipelineEvent};
}

/// Utility functions for cell reference conversion.
pub mod utils {
    pub use xlvc_model::utils::cell_ref::{
        cell_name_to_coordinates, column_name_to_number, column_number_to_name,
        coordinates_to_cell_name,
    };
    pub use xlvc_model::utils::constants;
}
