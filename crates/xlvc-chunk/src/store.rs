//! Reading and writing a workbook's chunk directory.
//!
//! Writes are atomic per chunk (temp sibling + rename) and the manifest is
//! written last, also atomically, so a reader never observes a chunk
//! directory mid-write: either the previous manifest and its chunks are
//! intact, or the new ones are.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use xlvc_model::digest::digest_bytes;
use xlvc_model::doc_props::DocProperties;
use xlvc_model::document::{Document, DocumentMetadata};
use xlvc_model::error::{Error, Result};
use xlvc_model::sheet::Sheet;

use crate::layout::{self, MANIFEST_FILENAME, WORKBOOK_FILENAME};
use crate::manifest::{ChunkManifest, SheetManifestEntry, SCHEMA_VERSION};

/// Options controlling how chunk JSON is rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkWriteOptions {
    /// When true, chunk JSON is emitted without indentation.
    pub compact_output: bool,
}

/// The `workbook.json` chunk: workbook-level attributes, properties, and the
/// ordered list of sheet names. Sheets themselves live in their own chunk
/// files, referenced by the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookChunk {
    pub schema_version: String,
    pub metadata: DocumentMetadata,
    pub properties: DocProperties,
    pub defined_names: BTreeMap<String, String>,
    pub sheet_names: Vec<String>,
}

/// Render `document` to `dest_dir`, returning the manifest written.
///
/// Every chunk file is written to a temp sibling and renamed into place;
/// the manifest is written the same way, last. Sheet chunk files present in
/// `dest_dir` that no longer correspond to a sheet in `document` are removed
/// only after the manifest write succeeds.
pub fn write(document: &Document, dest_dir: &Path, options: ChunkWriteOptions) -> Result<ChunkManifest> {
    fs::create_dir_all(dest_dir).map_err(|e| Error::IOError(e.to_string()))?;

    let workbook_chunk = WorkbookChunk {
        schema_version: SCHEMA_VERSION.to_string(),
        metadata: document.metadata.clone(),
        properties: document.properties.clone(),
        defined_names: document.defined_names.clone(),
        sheet_names: document.sheet_names().into_iter().map(str::to_string).collect(),
    };
    write_json_atomic(&dest_dir.join(WORKBOOK_FILENAME), &workbook_chunk, options)?;

    let mut sheet_entries = Vec::with_capacity(document.sheets.len());
    let mut live_filenames: Vec<String> = vec![WORKBOOK_FILENAME.to_string(), MANIFEST_FILENAME.to_string()];
    for sheet in &document.sheets {
        let filename = layout::sheet_chunk_filename(sheet.index, &sheet.name);
        let bytes = write_json_atomic(&dest_dir.join(&filename), sheet, options)?;
        sheet_entries.push(SheetManifestEntry {
            index: sheet.index,
            name: sheet.name.clone(),
            filename: filename.clone(),
            content_digest: digest_bytes(&bytes),
            cell_count: sheet.cells.len(),
        });
        live_filenames.push(filename);
    }

    let manifest = ChunkManifest {
        schema_version: SCHEMA_VERSION.to_string(),
        workbook_digest: document.metadata.content_digest.clone(),
        modified_timestamp: rfc3339_now(),
        sheets: sheet_entries,
    };
    write_json_atomic(&dest_dir.join(MANIFEST_FILENAME), &manifest, options)?;

    prune_stale_chunks(dest_dir, &live_filenames)?;

    Ok(manifest)
}

/// Read a document back from a chunk directory, validating every chunk's
/// content digest against the manifest.
pub fn read(dest_dir: &Path) -> Result<Document> {
    let manifest: ChunkManifest = read_json(&dest_dir.join(MANIFEST_FILENAME))?;
    if manifest.schema_version != SCHEMA_VERSION {
        return Err(Error::SchemaVersionUnsupported(manifest.schema_version));
    }

    let workbook_bytes = fs::read(dest_dir.join(WORKBOOK_FILENAME)).map_err(|e| Error::IOError(e.to_string()))?;
    let workbook_chunk: WorkbookChunk =
        serde_json::from_slice(&workbook_bytes).map_err(|e| Error::ManifestMismatch(e.to_string()))?;

    let mut sheets = Vec::with_capacity(manifest.sheets.len());
    for entry in &manifest.sheets {
        let path = dest_dir.join(&entry.filename);
        let bytes = fs::read(&path).map_err(|e| Error::IOError(e.to_string()))?;
        let actual_digest = digest_bytes(&bytes);
        if actual_digest != entry.content_digest {
            return Err(Error::ManifestMismatch(format!(
                "sheet '{}' chunk '{}' digest mismatch: manifest has {}, file has {}",
                entry.name, entry.filename, entry.content_digest, actual_digest
            )));
        }
        let sheet: Sheet =
            serde_json::from_slice(&bytes).map_err(|e| Error::ManifestMismatch(e.to_string()))?;
        sheets.push(sheet);
    }
    sheets.sort_by_key(|s| s.index);

    if workbook_chunk.sheet_names.len() != sheets.len() {
        return Err(Error::ManifestMismatch(format!(
            "workbook chunk lists {} sheets but manifest has {}",
            workbook_chunk.sheet_names.len(),
            sheets.len()
        )));
    }

    Document::build(
        workbook_chunk.metadata,
        workbook_chunk.properties,
        sheets,
        workbook_chunk.defined_names,
    )
}

/// True iff `dest_dir` holds a manifest newer than `workbook_path`'s mtime.
/// This is the sole staleness check the pipeline relies on -- it never
/// compares content.
pub fn is_up_to_date(workbook_path: &Path, dest_dir: &Path) -> Result<bool> {
    let manifest_path = dest_dir.join(MANIFEST_FILENAME);
    if !manifest_path.exists() {
        return Ok(false);
    }
    let manifest: ChunkManifest = read_json(&manifest_path)?;
    let modified: chrono::DateTime<chrono::Utc> = manifest
        .modified_timestamp
        .parse()
        .map_err(|e| Error::ManifestMismatch(format!("invalid modified_timestamp: {e}")))?;

    let workbook_mtime = fs::metadata(workbook_path)
        .and_then(|m| m.modified())
        .map_err(|e| Error::IOError(e.to_string()))?;
    let workbook_modified: chrono::DateTime<chrono::Utc> = workbook_mtime.into();

    Ok(modified > workbook_modified)
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T, options: ChunkWriteOptions) -> Result<Vec<u8>> {
    let rendered = if options.compact_output {
        serde_json::to_vec(value).map_err(|e| Error::IOError(e.to_string()))?
    } else {
        serde_json::to_vec_pretty(value).map_err(|e| Error::IOError(e.to_string()))?
    };

    let dir = path.parent().ok_or_else(|| Error::IOError("chunk path has no parent".to_string()))?;
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::IOError(e.to_string()))?;
    temp.write_all(&rendered).map_err(|e| Error::IOError(e.to_string()))?;
    temp.as_file().sync_all().map_err(|e| Error::IOError(e.to_string()))?;
    temp.persist(path).map_err(|e| Error::IOError(e.error.to_string()))?;

    Ok(rendered)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| Error::IOError(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::ManifestMismatch(e.to_string()))
}

fn prune_stale_chunks(dest_dir: &Path, live_filenames: &[String]) -> Result<()> {
    let entries = fs::read_dir(dest_dir).map_err(|e| Error::IOError(e.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::IOError(e.to_string()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("sheet_") && name.ends_with(".json") && !live_filenames.contains(&name) {
            fs::remove_file(entry.path()).map_err(|e| Error::IOError(e.to_string()))?;
        }
    }
    Ok(())
}

fn rfc3339_now() -> String {
    let now: chrono::DateTime<chrono::Utc> = SystemTime::now().into();
    now.to_rfc3339()
}
