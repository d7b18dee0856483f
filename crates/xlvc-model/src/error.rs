//! Error taxonomy shared by the document model, codec, chunking store, and
//! the crates built on top of them.
//!
//! Every failure mode named in the component design is a distinct tagged
//! variant; nothing here is propagated as an opaque string except where the
//! underlying library (zip, quick-xml) only gives us one.

use thiserror::Error;

/// The top-level error type for `xlvc-model` and its dependents.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Cell/sheet reference errors =====
    #[error("invalid cell reference: {0}")]
    InvalidCellReference(String),

    #[error("invalid row number: {0}")]
    InvalidRowNumber(u32),

    #[error("invalid column number: {0}")]
    InvalidColumnNumber(u32),

    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),

    #[error("invalid defined name: {0}")]
    InvalidDefinedName(String),

    #[error("workbook already has the maximum of {max} cell styles")]
    CellStylesExceeded { max: usize },

    // ===== Document model errors (§4.1) =====
    /// Construction failed because a §3 invariant was violated (duplicate
    /// sheet name, non-contiguous sheet index, overlapping merge range,
    /// mismatched logical type tag, ...).
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    // ===== Codec errors (§4.2) =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt workbook: {0}")]
    Corrupt(String),

    #[error("formula parse error at {address}: {detail}")]
    FormulaParseError { address: String, detail: String },

    #[error("sheet '{sheet}' has {count} cells, exceeding the limit of {limit}")]
    SheetTooLarge {
        sheet: String,
        count: usize,
        limit: usize,
    },

    // ===== Chunking store errors (§4.3) =====
    #[error("I/O error: {0}")]
    IOError(String),

    #[error("manifest mismatch: {0}")]
    ManifestMismatch(String),

    #[error("unsupported chunk schema version: {0}")]
    SchemaVersionUnsupported(String),

    // ===== Pipeline errors (§4.5) =====
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("pipeline is shutting down")]
    ShuttingDown,

    // ===== VCS adapter errors (§4.6) =====
    #[error("VCS error: {0}")]
    VCSError(String),

    // ===== Conflict resolver errors (§4.7) =====
    #[error("malformed conflict markers: {0}")]
    MalformedConflict(String),

    // ===== Passthrough / low-level =====
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(String),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("XML deserialization error: {0}")]
    XmlDeserialize(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// A convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
