//! Structured diffing between two [`crate::document::Document`] values.
//!
//! `diff` never compares text lines; it walks the document model sheet by
//! sheet, cell by cell (§4.1).

use std::collections::BTreeSet;

use crate::cell::{Cell, CellValue};
use crate::document::Document;
use crate::sheet::Sheet;

/// The kind of change a [`CellChange`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Remove,
    Modify,
}

/// One cell-level change within a sheet diff.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub kind: ChangeKind,
    pub address: String,
    pub old_value: Option<CellValue>,
    pub new_value: Option<CellValue>,
    pub old_formula: Option<String>,
    pub new_formula: Option<String>,
    /// True when the only thing that differs is the style descriptor.
    pub style_only: bool,
}

/// Per-sheet change list plus identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetDiff {
    pub name: String,
    pub changes: Vec<CellChange>,
    /// True if this sheet moved to a different position in the sheet list.
    pub reordered: bool,
}

/// Summary counts over a [`DocumentDiff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffSummary {
    pub changed_sheets: usize,
    pub cell_insertions: usize,
    pub cell_deletions: usize,
    pub cell_modifications: usize,
    pub style_only_changes: usize,
}

/// The structured diff between two documents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentDiff {
    pub summary: DiffSummary,
    pub sheets: Vec<SheetDiff>,
}

impl DocumentDiff {
    /// True when nothing changed at all.
    pub fn is_empty(&self) -> bool {
        self.summary == DiffSummary::default()
    }
}

/// Compare two documents structurally.
///
/// Order-insensitive over each sheet's cell map; order-sensitive over the
/// document's sheet list (reordering sheets counts as a change, surfaced as
/// a whole-sheet add+remove pair since names stay keyed by identity).
pub fn diff(a: &Document, b: &Document) -> DocumentDiff {
    let mut result = DocumentDiff::default();

    let a_names: Vec<&str> = a.sheets.iter().map(|s| s.name.as_str()).collect();
    let b_names: Vec<&str> = b.sheets.iter().map(|s| s.name.as_str()).collect();

    let a_set: BTreeSet<&str> = a_names.iter().copied().collect();
    let b_set: BTreeSet<&str> = b_names.iter().copied().collect();

    for name in a_set.union(&b_set) {
        let a_sheet = a.sheets.iter().find(|s| s.name == *name);
        let b_sheet = b.sheets.iter().find(|s| s.name == *name);

        match (a_sheet, b_sheet) {
            (Some(a_sheet), Some(b_sheet)) => {
                let mut sheet_diff = diff_sheets(a_sheet, b_sheet);
                sheet_diff.reordered = a_sheet.index != b_sheet.index;
                if !sheet_diff.changes.is_empty() || sheet_diff.reordered {
                    accumulate(&mut result.summary, &sheet_diff);
                    result.sheets.push(sheet_diff);
                }
            }
            (Some(a_sheet), None) => {
                let sheet_diff = whole_sheet_change(a_sheet, ChangeKind::Remove);
                accumulate(&mut result.summary, &sheet_diff);
                result.sheets.push(sheet_diff);
            }
            (None, Some(b_sheet)) => {
                let sheet_diff = whole_sheet_change(b_sheet, ChangeKind::Add);
                accumulate(&mut result.summary, &sheet_diff);
                result.sheets.push(sheet_diff);
            }
            (None, None) => unreachable!("name came from the union of both sheet sets"),
        }
    }

    result.sheets.sort_by(|a, b| a.name.cmp(&b.name));
    result
}

fn accumulate(summary: &mut DiffSummary, sheet_diff: &SheetDiff) {
    if sheet_diff.changes.is_empty() && !sheet_diff.reordered {
        return;
    }
    summary.changed_sheets += 1;
    for change in &sheet_diff.changes {
        match change.kind {
            ChangeKind::Add => summary.cell_insertions += 1,
            ChangeKind::Remove => summary.cell_deletions += 1,
            ChangeKind::Modify => summary.cell_modifications += 1,
        }
        if change.style_only {
            summary.style_only_changes += 1;
        }
    }
}

fn whole_sheet_change(sheet: &Sheet, kind: ChangeKind) -> SheetDiff {
    let changes = sheet
        .non_empty_cells()
        .map(|(address, cell)| cell_change(kind, address, Some(cell), None))
        .collect();
    SheetDiff {
        name: sheet.name.clone(),
        changes,
        reordered: false,
    }
}

fn diff_sheets(a: &Sheet, b: &Sheet) -> SheetDiff {
    let mut changes = Vec::new();
    let addresses: BTreeSet<&String> = a.cells.keys().chain(b.cells.keys()).collect();

    for address in addresses {
        let a_cell = a.cells.get(address);
        let b_cell = b.cells.get(address);
        match (a_cell, b_cell) {
            (Some(a_cell), Some(b_cell)) if cells_equal(a_cell, b_cell) => {}
            (Some(a_cell), Some(b_cell)) => {
                let style_only = a_cell.value == b_cell.value
                    && a_cell.formula == b_cell.formula
                    && a_cell.style != b_cell.style;
                let mut change = cell_change(ChangeKind::Modify, address, Some(a_cell), Some(b_cell));
                change.style_only = style_only;
                changes.push(change);
            }
            (Some(a_cell), None) if !a_cell.is_empty() => {
                changes.push(cell_change(ChangeKind::Remove, address, Some(a_cell), None));
            }
            (None, Some(b_cell)) if !b_cell.is_empty() => {
                changes.push(cell_change(ChangeKind::Add, address, None, Some(b_cell)));
            }
            _ => {}
        }
    }

    changes.sort_by(|x, y| x.address.cmp(&y.address));
    SheetDiff {
        name: a.name.clone(),
        changes,
        reordered: false,
    }
}

fn cells_equal(a: &Cell, b: &Cell) -> bool {
    a == b
}

fn cell_change(
    kind: ChangeKind,
    address: &str,
    old: Option<&Cell>,
    new: Option<&Cell>,
) -> CellChange {
    CellChange {
        kind,
        address: address.to_string(),
        old_value: old.map(|c| c.value.clone()),
        new_value: new.map(|c| c.value.clone()),
        old_formula: old.and_then(|c| c.formula.clone()),
        new_formula: new.and_then(|c| c.formula.clone()),
        style_only: false,
    }
}

/// True iff the two documents are semantically equal: same sheets (by name
/// and index), same cells, formulas, and styles -- but not necessarily
/// identical on bookkeeping fields that never round trip byte-for-byte
/// (e.g. the workbook's own digest, which is computed over the binary
/// source and so is meaningless to compare model-to-model).
pub fn equal_semantically(a: &Document, b: &Document) -> bool {
    diff(a, b).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellValue};
    use crate::document::{DocumentMetadata, DocumentProperties};
    use std::collections::BTreeMap;

    fn doc_with_sheets(sheets: Vec<Sheet>) -> Document {
        Document::build(
            DocumentMetadata {
                origin_filename: "w.xlsx".into(),
                origin_byte_size: 0,
                content_digest: "deadbeef".into(),
                ..Default::default()
            },
            DocumentProperties::default(),
            sheets,
            BTreeMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_diff_identical_documents_is_empty() {
        let sheet = Sheet::new("S", 0);
        let a = doc_with_sheets(vec![sheet.clone()]);
        let b = doc_with_sheets(vec![sheet]);
        assert!(diff(&a, &b).is_empty());
        assert!(equal_semantically(&a, &b));
    }

    #[test]
    fn test_diff_detects_cell_addition() {
        let mut sheet_a = Sheet::new("S", 0);
        sheet_a.cells.insert("A1".into(), Cell::new(CellValue::Number(1.0)));
        let mut sheet_b = sheet_a.clone();
        sheet_b.cells.insert("A2".into(), Cell::new(CellValue::Number(2.0)));

        let a = doc_with_sheets(vec![sheet_a]);
        let b = doc_with_sheets(vec![sheet_b]);
        let d = diff(&a, &b);
        assert_eq!(d.summary.cell_insertions, 1);
        assert_eq!(d.summary.changed_sheets, 1);
    }

    #[test]
    fn test_diff_detects_cell_modification() {
        let mut sheet_a = Sheet::new("S", 0);
        sheet_a.cells.insert("A1".into(), Cell::new(CellValue::String("old".into())));
        let mut sheet_b = Sheet::new("S", 0);
        sheet_b.cells.insert("A1".into(), Cell::new(CellValue::String("new".into())));

        let a = doc_with_sheets(vec![sheet_a]);
        let b = doc_with_sheets(vec![sheet_b]);
        let d = diff(&a, &b);
        assert_eq!(d.summary.cell_modifications, 1);
    }

    #[test]
    fn test_diff_counts_match_change_list_lengths() {
        let mut sheet_a = Sheet::new("S", 0);
        sheet_a.cells.insert("A1".into(), Cell::new(CellValue::Number(1.0)));
        sheet_a.cells.insert("B1".into(), Cell::new(CellValue::Number(2.0)));
        let mut sheet_b = Sheet::new("S", 0);
        sheet_b.cells.insert("A1".into(), Cell::new(CellValue::Number(99.0)));
        sheet_b.cells.insert("C1".into(), Cell::new(CellValue::Number(3.0)));

        let a = doc_with_sheets(vec![sheet_a]);
        let b = doc_with_sheets(vec![sheet_b]);
        let d = diff(&a, &b);

        let total_changes: usize = d.sheets.iter().map(|s| s.changes.len()).sum();
        let summary_total = d.summary.cell_insertions
            + d.summary.cell_deletions
            + d.summary.cell_modifications;
        assert_eq!(total_changes, summary_total);
    }

    #[test]
    fn test_diff_self_is_zero_total_changes() {
        let mut sheet = Sheet::new("S", 0);
        sheet.cells.insert("A1".into(), Cell::new(CellValue::Number(1.0)));
        let doc = doc_with_sheets(vec![sheet]);
        let d = diff(&doc, &doc);
        assert_eq!(d.summary.cell_insertions, 0);
        assert_eq!(d.summary.cell_deletions, 0);
        assert_eq!(d.summary.cell_modifications, 0);
    }

    #[test]
    fn test_diff_style_only_change_flagged() {
        use crate::style::Style;

        let mut sheet_a = Sheet::new("S", 0);
        sheet_a.cells.insert("A1".into(), Cell::new(CellValue::Number(1.0)));
        let mut sheet_b = Sheet::new("S", 0);
        let mut styled = Cell::new(CellValue::Number(1.0));
        styled.style = Some(Style::default());
        sheet_b.cells.insert("A1".into(), styled);

        let a = doc_with_sheets(vec![sheet_a]);
        let b = doc_with_sheets(vec![sheet_b]);
        let d = diff(&a, &b);
        assert_eq!(d.summary.style_only_changes, 1);
    }
}
