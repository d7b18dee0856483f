//! The [`Sheet`] type: one two-dimensional table inside a [`crate::document::Document`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::utils::constants::{MAX_SHEET_NAME_LENGTH, SHEET_NAME_INVALID_CHARS};

/// Validate a sheet name according to Excel rules.
///
/// A valid sheet name must:
/// - Be non-empty
/// - Be at most [`MAX_SHEET_NAME_LENGTH`] (31) characters
/// - Not contain any of the characters `: \ / ? * [ ]`
/// - Not start or end with a single quote (`'`)
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("sheet name cannot be empty".into()));
    }
    if name.len() > MAX_SHEET_NAME_LENGTH {
        return Err(Error::InvalidSheetName(format!(
            "sheet name '{}' exceeds {} characters",
            name, MAX_SHEET_NAME_LENGTH
        )));
    }
    for ch in SHEET_NAME_INVALID_CHARS {
        if name.contains(*ch) {
            return Err(Error::InvalidSheetName(format!(
                "sheet name '{}' contains invalid character '{}'",
                name, ch
            )));
        }
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(Error::InvalidSheetName(format!(
            "sheet name '{}' cannot start or end with a single quote",
            name
        )));
    }
    Ok(())
}

/// Sheet-level protection flags (§3 "protection settings").
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SheetProtection {
    pub sheet_locked: bool,
    pub objects_locked: bool,
    pub scenarios_locked: bool,
}

/// One two-dimensional table inside a workbook document.
///
/// Owned exclusively by its containing [`crate::document::Document`]. Cells
/// are owned exclusively by the sheet and are value-like: copying is cheap
/// and sharing is never required.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name, unique within the workbook, preserved exactly.
    pub name: String,
    /// Zero-based index; sheet indices form a contiguous permutation of
    /// `0..N` matching the document's sheet list order.
    pub index: usize,
    /// Cell address ("A1"-style) to cell. Order-insensitive for diffing and
    /// equality purposes -- a `BTreeMap` gives deterministic iteration for
    /// stable serialization without imposing semantic order.
    pub cells: BTreeMap<String, Cell>,
    /// Ordered list of merged-cell ranges (e.g. `"A1:B2"`). Ranges never
    /// overlap; order is preserved since it affects the chunked file's
    /// textual diff surface but not the sheet's semantics.
    pub merged_ranges: Vec<String>,
    /// Row number (1-based) to row height, for rows with a non-default
    /// height.
    pub row_heights: BTreeMap<u32, f64>,
    /// Column letter to column width, for columns with a non-default width.
    pub col_widths: BTreeMap<String, f64>,
    /// True if the sheet is hidden in the workbook's tab strip.
    pub hidden: bool,
    /// Sheet protection settings, if the sheet is protected.
    pub protection: Option<SheetProtection>,
}

impl Sheet {
    /// Construct an empty, named sheet at the given index.
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Sheet {
            name: name.into(),
            index,
            cells: BTreeMap::new(),
            merged_ranges: Vec::new(),
            row_heights: BTreeMap::new(),
            col_widths: BTreeMap::new(),
            hidden: false,
            protection: None,
        }
    }

    /// Non-empty cells only, in address order -- the set a chunk file
    /// actually materializes when `ignore_empty_cells` is enabled.
    pub fn non_empty_cells(&self) -> impl Iterator<Item = (&String, &Cell)> {
        self.cells.iter().filter(|(_, c)| !c.is_empty())
    }

    /// Count of materialized (non-empty) cells, used against
    /// `max_cells_per_sheet`.
    pub fn cell_count(&self) -> usize {
        self.non_empty_cells().count()
    }
}
