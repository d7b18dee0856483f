//! Pure path computation for the chunk directory layout.
//!
//! For a workbook at relative path `P/W.xlsx` under a repository root,
//! chunks live at `<root>/<data-dir>/P/W.xlsx_chunks/`.

use std::path::{Path, PathBuf};

pub const MANIFEST_FILENAME: &str = ".chunks_manifest.json";
pub const WORKBOOK_FILENAME: &str = "workbook.json";

/// Compute the destination directory for a workbook's chunks. No I/O.
///
/// `workbook_path` may be absolute or relative; only its path components
/// under `repo_root` matter. `data_dir` is the configured subdirectory
/// chunks are rooted under (e.g. `".xlvc"`).
pub fn locate(workbook_path: &Path, repo_root: &Path, data_dir: &str) -> PathBuf {
    let relative = workbook_path.strip_prefix(repo_root).unwrap_or(workbook_path);
    let mut dest = repo_root.join(data_dir).join(relative);
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.set_file_name(format!("{file_name}_chunks"));
    dest
}

/// Filename for a sheet's chunk file, given its index and a filesystem-safe
/// slug of its name.
pub fn sheet_chunk_filename(index: usize, sheet_name: &str) -> String {
    format!("sheet_{index}_{}.json", slugify(sheet_name))
}

/// Lossy, filesystem-safe slug of a sheet name: lowercased, non-alphanumeric
/// runs collapsed to a single `_`, leading/trailing `_` trimmed. Collisions
/// between distinct sheet names are broken by the `index` prefix, so the
/// slug only needs to be legible, not unique.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = slug.trim_matches('_');
    if trimmed.is_empty() {
        "sheet".to_string()
    } else {
        trimmed.to_string()
    }
}
