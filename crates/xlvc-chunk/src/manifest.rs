//! The `.chunks_manifest.json` format: a digest-backed index over the
//! per-sheet and workbook-level chunk files in a chunk directory.

use serde::{Deserialize, Serialize};
use xlvc_model::digest::ContentDigest;

/// Schema version for the chunk layout itself (independent of
/// [`xlvc_model::document::SCHEMA_VERSION`], though both start at `"1.0"`).
pub const SCHEMA_VERSION: &str = "1.0";

/// One sheet's entry in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetManifestEntry {
    pub index: usize,
    pub name: String,
    pub filename: String,
    pub content_digest: ContentDigest,
    pub cell_count: usize,
}

/// `.chunks_manifest.json`: digests and bookkeeping for every chunk file in
/// a workbook's chunk directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkManifest {
    pub schema_version: String,
    /// Digest of the binary workbook source the chunks were rendered from.
    pub workbook_digest: ContentDigest,
    /// RFC 3339 timestamp of the write that produced this manifest, used by
    /// [`crate::store::is_up_to_date`] as the sole staleness check.
    pub modified_timestamp: String,
    pub sheets: Vec<SheetManifestEntry>,
}

impl ChunkManifest {
    pub fn sheet_entry(&self, name: &str) -> Option<&SheetManifestEntry> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
