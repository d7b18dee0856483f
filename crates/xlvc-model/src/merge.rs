//! Merged-cell range geometry.
//!
//! The document model treats merged ranges as immutable facts recorded on a
//! [`crate::sheet::Sheet`]; these helpers parse a range reference and check
//! two ranges for overlap, used by [`crate::document`] to enforce the §3
//! invariant that merged ranges on a sheet never overlap.

use crate::error::{Error, Result};
use crate::utils::cell_ref::cell_name_to_coordinates;

/// Parse a range reference like "A1:C3" into `(col1, row1, col2, row2)`
/// coordinates, both 1-based, normalized so `(col1, row1)` is top-left.
pub fn parse_range(reference: &str) -> Result<(u32, u32, u32, u32)> {
    let parts: Vec<&str> = reference.split(':').collect();
    if parts.len() != 2 {
        return Err(Error::InvalidCellReference(format!(
            "expected range like 'A1:C3', got '{reference}'"
        )));
    }
    let (c1, r1) = cell_name_to_coordinates(parts[0])?;
    let (c2, r2) = cell_name_to_coordinates(parts[1])?;
    Ok((c1.min(c2), r1.min(r2), c1.max(c2), r1.max(r2)))
}

/// Check whether two rectangular ranges overlap.
pub fn ranges_overlap(a: (u32, u32, u32, u32), b: (u32, u32, u32, u32)) -> bool {
    let (a_min_col, a_min_row, a_max_col, a_max_row) = a;
    let (b_min_col, b_min_row, b_max_col, b_max_row) = b;
    a_min_col <= b_max_col
        && a_max_col >= b_min_col
        && a_min_row <= b_max_row
        && a_max_row >= b_min_row
}

/// True if `ranges` contains no two ranges that overlap.
pub fn ranges_mutually_disjoint(ranges: &[String]) -> Result<bool> {
    let parsed: Vec<_> = ranges.iter().map(|r| parse_range(r)).collect::<Result<_>>()?;
    for i in 0..parsed.len() {
        for j in (i + 1)..parsed.len() {
            if ranges_overlap(parsed[i], parsed[j]) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
