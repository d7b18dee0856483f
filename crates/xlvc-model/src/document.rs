//! The [`Document`] type: the typed, immutable-after-build in-memory
//! representation of a workbook (§3, §4.1).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::defined_names::validate_defined_name;
use crate::error::{Error, Result};
use crate::formula::parse_formula;
use crate::merge::{parse_range, ranges_overlap};
use crate::sheet::Sheet;

pub use crate::doc_props::DocProperties as DocumentProperties;

/// Workbook-level metadata (§3).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub created: Option<String>,
    pub modified: Option<String>,
    /// Path or filename the binary workbook was decoded from.
    pub origin_filename: String,
    /// Size in bytes of the binary workbook source.
    pub origin_byte_size: u64,
    /// Digest of the binary source, computed by the codec via
    /// [`crate::digest::digest_bytes`]. Never invented from the model.
    pub content_digest: String,
}

/// Schema version for the document model itself (distinct from the chunk
/// manifest's schema version, though both start at "1.0").
pub const SCHEMA_VERSION: &str = "1.0";

/// The canonical representation of a workbook.
///
/// Constructed only by [`Document::build`] (never mutated in place
/// afterward); sheets are owned exclusively by the document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub schema_version: String,
    pub metadata: DocumentMetadata,
    pub properties: DocumentProperties,
    pub sheets: Vec<Sheet>,
    pub defined_names: BTreeMap<String, String>,
    /// Package parts the codec has no model for (charts, pivot tables,
    /// embedded images, ...), keyed by their zip path and carried verbatim
    /// from decode to encode so unmodeled content survives a round trip.
    pub opaque_parts: BTreeMap<String, Vec<u8>>,
}

impl Document {
    /// Build a document from its constituent parts, enforcing every §3
    /// invariant. Fails with [`Error::InvalidDocument`] on violation.
    pub fn build(
        metadata: DocumentMetadata,
        properties: DocumentProperties,
        sheets: Vec<Sheet>,
        defined_names: BTreeMap<String, String>,
    ) -> Result<Document> {
        validate_sheets(&sheets)?;
        for name in defined_names.keys() {
            validate_defined_name(name)
                .map_err(|e| Error::InvalidDocument(format!("defined name '{name}': {e}")))?;
        }

        Ok(Document {
            schema_version: SCHEMA_VERSION.to_string(),
            metadata,
            properties,
            sheets,
            defined_names,
            opaque_parts: BTreeMap::new(),
        })
    }

    /// Attach package parts the codec could not model, to be replayed
    /// verbatim on the next encode.
    pub fn with_opaque_parts(mut self, parts: BTreeMap<String, Vec<u8>>) -> Self {
        self.opaque_parts = parts;
        self
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheet names in document order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

fn validate_sheets(sheets: &[Sheet]) -> Result<()> {
    let mut seen_names = std::collections::BTreeSet::new();
    for (expected_index, sheet) in sheets.iter().enumerate() {
        if !seen_names.insert(sheet.name.as_str()) {
            return Err(Error::InvalidDocument(format!(
                "duplicate sheet name '{}'",
                sheet.name
            )));
        }
        if sheet.index != expected_index {
            return Err(Error::InvalidDocument(format!(
                "sheet '{}' has index {} but occupies list position {} \
                 (sheet indices must be a contiguous 0..N permutation matching list order)",
                sheet.name, sheet.index, expected_index
            )));
        }
        validate_merged_ranges(sheet)?;
        for (address, cell) in &sheet.cells {
            if !cell.tags_agree() {
                return Err(Error::InvalidDocument(format!(
                    "sheet '{}' cell {}: logical type tag {:?} disagrees with value tag {:?}",
                    sheet.name,
                    address,
                    cell.logical_type,
                    cell.value.logical_type()
                )));
            }
            if let Some(formula) = &cell.formula {
                parse_formula(formula).map_err(|e| Error::FormulaParseError {
                    address: format!("{}!{}", sheet.name, address),
                    detail: e.to_string(),
                })?;
            }
        }
    }
    Ok(())
}

fn validate_merged_ranges(sheet: &Sheet) -> Result<()> {
    let mut parsed = Vec::with_capacity(sheet.merged_ranges.len());
    for range in &sheet.merged_ranges {
        let rect = parse_range(range).map_err(|e| {
            Error::InvalidDocument(format!(
                "sheet '{}' merged range '{}' is invalid: {e}",
                sheet.name, range
            ))
        })?;
        parsed.push(rect);
    }
    for i in 0..parsed.len() {
        for j in (i + 1)..parsed.len() {
            if ranges_overlap(parsed[i], parsed[j]) {
                return Err(Error::InvalidDocument(format!(
                    "sheet '{}' merged ranges '{}' and '{}' overlap",
                    sheet.name, sheet.merged_ranges[i], sheet.merged_ranges[j]
                )));
            }
        }
    }
    Ok(())
}
