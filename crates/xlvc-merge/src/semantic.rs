//! Document-level semantic merge: combining two versions of a sheet or
//! workbook chunk field by field instead of line by line.

use std::collections::BTreeMap;

use xlvc_chunk::WorkbookChunk;
use xlvc_model::cell::{Cell, CellValue};
use xlvc_model::sheet::Sheet;

/// Merge two versions of a sheet per the field-by-field rules: cells merged
/// by address, row heights/column widths union with max-on-collision, merged
/// ranges unioned and de-duplicated, hidden/protection taken from `ours`.
pub fn merge_sheets(ours: &Sheet, theirs: &Sheet) -> Sheet {
    let mut cells: BTreeMap<String, Cell> = ours.cells.clone();
    for (address, their_cell) in &theirs.cells {
        match cells.get(address) {
            None => {
                cells.insert(address.clone(), their_cell.clone());
            }
            Some(our_cell) => {
                cells.insert(address.clone(), merge_cell(our_cell, their_cell));
            }
        }
    }

    let mut row_heights = ours.row_heights.clone();
    for (row, height) in &theirs.row_heights {
        row_heights
            .entry(*row)
            .and_modify(|h| *h = h.max(*height))
            .or_insert(*height);
    }

    let mut col_widths = ours.col_widths.clone();
    for (col, width) in &theirs.col_widths {
        col_widths
            .entry(col.clone())
            .and_modify(|w| *w = w.max(*width))
            .or_insert(*width);
    }

    let mut merged_ranges = ours.merged_ranges.clone();
    for range in &theirs.merged_ranges {
        if !merged_ranges.contains(range) {
            merged_ranges.push(range.clone());
        }
    }

    Sheet {
        name: ours.name.clone(),
        index: ours.index,
        cells,
        merged_ranges,
        row_heights,
        col_widths,
        hidden: ours.hidden,
        protection: ours.protection.clone(),
    }
}

/// One cell's merge rule: an empty value loses to a non-empty one; a
/// formula-bearing side wins over one without a formula; otherwise ours wins.
fn merge_cell(ours: &Cell, theirs: &Cell) -> Cell {
    let ours_empty = matches!(ours.value, CellValue::Empty);
    let theirs_empty = matches!(theirs.value, CellValue::Empty);
    if ours_empty && !theirs_empty {
        return theirs.clone();
    }
    if theirs_empty && !ours_empty {
        return ours.clone();
    }

    let ours_has_formula = ours.formula.is_some();
    let theirs_has_formula = theirs.formula.is_some();
    if theirs_has_formula && !ours_has_formula {
        return theirs.clone();
    }

    ours.clone()
}

/// Merge two versions of a workbook chunk: ours is the base, `modified` takes
/// the greater of the two, defined names union with theirs winning
/// collisions, sheet name order follows ours with any theirs-only names
/// appended.
pub fn merge_workbook_chunks(ours: &WorkbookChunk, theirs: &WorkbookChunk) -> WorkbookChunk {
    let mut metadata = ours.metadata.clone();
    metadata.modified = newer_timestamp(&ours.metadata.modified, &theirs.metadata.modified);

    let mut defined_names = ours.defined_names.clone();
    for (name, reference) in &theirs.defined_names {
        defined_names.insert(name.clone(), reference.clone());
    }

    let mut sheet_names = ours.sheet_names.clone();
    for name in &theirs.sheet_names {
        if !sheet_names.contains(name) {
            sheet_names.push(name.clone());
        }
    }

    WorkbookChunk {
        schema_version: ours.schema_version.clone(),
        metadata,
        properties: ours.properties.clone(),
        defined_names,
        sheet_names,
    }
}

fn newer_timestamp(ours: &Option<String>, theirs: &Option<String>) -> Option<String> {
    match (ours, theirs) {
        (Some(o), Some(t)) => {
            if t > o {
                Some(t.clone())
            } else {
                Some(o.clone())
            }
        }
        (Some(o), None) => Some(o.clone()),
        (None, Some(t)) => Some(t.clone()),
        (None, None) => None,
    }
}
