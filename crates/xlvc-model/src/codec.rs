//! Translation between the binary `.xlsx` package and the [`Document`]
//! model.
//!
//! Decode reads every package part the model understands and stashes
//! everything else (charts, pivot caches, embedded media, ...) verbatim in
//! [`Document::opaque_parts`] so an encode of a decoded document reproduces
//! the parts this codec has no model for. Encode always rebuilds
//! `[Content_Types].xml`, the workbook part, and the relationship graph from
//! scratch rather than patching the originals, since sheet count, comments,
//! and validations can all change between a decode and the next encode.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use xlvc_xml::comments::Comments;
use xlvc_xml::content_types::{mime_types, ContentTypeDefault, ContentTypeOverride, ContentTypes};
use xlvc_xml::doc_props::{deserialize_core_properties, serialize_core_properties, ExtendedProperties};
use xlvc_xml::namespaces;
use xlvc_xml::relationships::{self, rel_types, Relationship, Relationships};
use xlvc_xml::shared_strings::Sst;
use xlvc_xml::styles::StyleSheet;
use xlvc_xml::workbook::{DefinedName, DefinedNames, SheetEntry, Sheets, WorkbookXml};
use xlvc_xml::worksheet::{
    cell_types, Cell as XmlCell, CellFormula, Col, Cols, DataValidations, Dimension, MergeCell,
    MergeCells, Row as XmlRow, SheetData, SheetProtection as XmlSheetProtection, WorksheetXml,
};

use crate::cell::{datetime_to_serial, serial_to_datetime, Cell, CellValue};
use crate::comment::{self, CommentConfig};
use crate::digest::digest_bytes;
use crate::doc_props::DocProperties;
use crate::document::{Document, DocumentMetadata};
use crate::error::{Error, Result};
use crate::numfmt;
use crate::sheet::{Sheet, SheetProtection};
use crate::sst::SharedStringTable;
use crate::style::{self, builtin_num_fmts, NumFmtStyle, Style};
use crate::utils::cell_ref::{cell_name_to_coordinates, column_name_to_number, column_number_to_name, coordinates_to_cell_name};
use crate::validation::{self, DataValidationConfig, ValidationRule};
use crate::workbook_paths::{
    default_relationships, relationship_part_path, relative_relationship_target,
    resolve_relationship_target,
};

const PART_CONTENT_TYPES: &str = "[Content_Types].xml";
const PART_PACKAGE_RELS: &str = "_rels/.rels";
const PART_WORKBOOK: &str = "xl/workbook.xml";
const PART_WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const PART_STYLES: &str = "xl/styles.xml";
const PART_SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const PART_CORE_PROPS: &str = "docProps/core.xml";
const PART_APP_PROPS: &str = "docProps/app.xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Default cap on cells materialized per sheet, bounding decode memory use.
pub const DEFAULT_MAX_CELLS_PER_SHEET: usize = 1_000_000;

/// Options recognized by both [`decode_bytes`]/[`decode_file`] and
/// [`encode_bytes`]/[`encode_file`].
///
/// `compact_output` is a chunking-store concern ([`xlvc_chunk::ChunkWriteOptions`]),
/// not a codec one, and has no counterpart here.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecOptions {
    /// Capture formula text verbatim. When off, decoded cells never carry a
    /// formula and encode never emits `<f>` elements.
    pub preserve_formulas: bool,
    /// Capture style descriptors (font, fill, borders, alignment, number
    /// format). When off, decoded cells carry no style and encode emits no
    /// `s` attribute.
    pub preserve_styles: bool,
    /// Capture cell comments. When off, decode skips the comments part and
    /// encode never writes one.
    pub preserve_comments: bool,
    /// Cells with an empty value and no style are not materialized during
    /// decode.
    pub ignore_empty_cells: bool,
    /// Decode fails with [`Error::SheetTooLarge`] once a sheet's
    /// materialized cell count exceeds this.
    pub max_cells_per_sheet: usize,
    /// If non-empty, only sheets with these names are decoded.
    pub sheets_to_convert: Vec<String>,
    /// Sheets with these names are never decoded, regardless of
    /// `sheets_to_convert`/`sheet_indices`.
    pub exclude_sheets: Vec<String>,
    /// If non-empty, only sheets at these zero-based source positions are
    /// decoded.
    pub sheet_indices: Vec<usize>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            preserve_formulas: true,
            preserve_styles: true,
            preserve_comments: true,
            ignore_empty_cells: true,
            max_cells_per_sheet: DEFAULT_MAX_CELLS_PER_SHEET,
            sheets_to_convert: Vec::new(),
            exclude_sheets: Vec::new(),
            sheet_indices: Vec::new(),
        }
    }
}

fn sheet_included(name: &str, source_index: usize, options: &CodecOptions) -> bool {
    if options.exclude_sheets.iter().any(|n| n == name) {
        return false;
    }
    if !options.sheets_to_convert.is_empty() && !options.sheets_to_convert.iter().any(|n| n == name) {
        return false;
    }
    if !options.sheet_indices.is_empty() && !options.sheet_indices.contains(&source_index) {
        return false;
    }
    true
}

// ===== Decode =====

/// Read a workbook from disk and decode it into a [`Document`].
pub fn decode_file<P: AsRef<Path>>(path: P, options: &CodecOptions) -> Result<Document> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).map_err(|e| Error::FileNotFound(format!("{}: {e}", path.display())))?;
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    decode_bytes(&bytes, &filename, options)
}

/// List a workbook's sheet names without materializing any cells.
///
/// A fast path over [`decode_file`] for hosts that only need to know what
/// sheets exist (e.g. to populate `sheets_to_convert`/`exclude_sheets`).
pub fn list_sheets<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).map_err(|e| Error::FileNotFound(format!("{}: {e}", path.display())))?;
    let cursor = Cursor::new(&bytes);
    let mut archive = ZipArchive::new(cursor).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
    let workbook_xml: WorkbookXml = read_xml_part(&mut archive, PART_WORKBOOK)?;
    Ok(workbook_xml.sheets.sheets.into_iter().map(|e| e.name).collect())
}

/// Decode an in-memory `.xlsx` package into a [`Document`].
pub fn decode_bytes(bytes: &[u8], origin_filename: &str, options: &CodecOptions) -> Result<Document> {
    let cursor = Cursor::new(bytes);
    let mut archive = ZipArchive::new(cursor).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
    let mut seen: BTreeSet<String> = BTreeSet::new();

    let _: ContentTypes = read_xml_part(&mut archive, PART_CONTENT_TYPES)?;
    seen.insert(PART_CONTENT_TYPES.to_string());
    seen.insert(PART_PACKAGE_RELS.to_string());

    let workbook_xml: WorkbookXml = read_xml_part(&mut archive, PART_WORKBOOK)?;
    seen.insert(PART_WORKBOOK.to_string());

    let workbook_rels: Relationships =
        read_xml_part(&mut archive, PART_WORKBOOK_RELS).unwrap_or_else(|_| default_relationships());
    seen.insert(PART_WORKBOOK_RELS.to_string());

    let stylesheet: StyleSheet = read_xml_part(&mut archive, PART_STYLES).unwrap_or_default();
    seen.insert(PART_STYLES.to_string());

    let sst = match read_xml_part::<Sst, _>(&mut archive, PART_SHARED_STRINGS) {
        Ok(sst_xml) => {
            seen.insert(PART_SHARED_STRINGS.to_string());
            SharedStringTable::from_sst(&sst_xml)
        }
        Err(_) => SharedStringTable::new(),
    };

    let mut sheets = Vec::with_capacity(workbook_xml.sheets.sheets.len());
    for (source_index, entry) in workbook_xml.sheets.sheets.iter().enumerate() {
        let rel = workbook_rels
            .relationships
            .iter()
            .find(|r| r.id == entry.r_id)
            .ok_or_else(|| {
                Error::Corrupt(format!(
                    "sheet '{}' has no matching workbook relationship",
                    entry.name
                ))
            })?;
        let sheet_path = resolve_relationship_target(PART_WORKBOOK, &rel.target);
        seen.insert(sheet_path.clone());

        if !sheet_included(&entry.name, source_index, options) {
            continue;
        }

        let ws: WorksheetXml = read_xml_part(&mut archive, &sheet_path)?;

        let rels_path = relationship_part_path(&sheet_path);
        let sheet_rels: Option<Relationships> = read_xml_part(&mut archive, &rels_path).ok();
        if sheet_rels.is_some() {
            seen.insert(rels_path);
        }

        let mut comments: Option<Comments> = None;
        if options.preserve_comments {
            if let Some(sheet_rels) = &sheet_rels {
                if let Some(rel) = sheet_rels
                    .relationships
                    .iter()
                    .find(|r| r.rel_type == rel_types::COMMENTS)
                {
                    let comments_path = resolve_relationship_target(&sheet_path, &rel.target);
                    if let Ok(parsed) = read_xml_part::<Comments, _>(&mut archive, &comments_path) {
                        seen.insert(comments_path);
                        comments = Some(parsed);
                    }
                }
            }
        }

        let hidden = matches!(entry.state.as_deref(), Some("hidden") | Some("veryHidden"));
        let mut sheet = decode_worksheet(
            entry.name.clone(),
            sheets.len(),
            &ws,
            &sst,
            &stylesheet,
            comments.as_ref(),
            options,
        )?;
        sheet.hidden = hidden;
        sheets.push(sheet);
    }

    let defined_names = decode_defined_names(&workbook_xml);

    let core_props = read_string_part(&mut archive, PART_CORE_PROPS)
        .ok()
        .and_then(|xml| deserialize_core_properties(&xml).ok());
    seen.insert(PART_CORE_PROPS.to_string());
    seen.insert(PART_APP_PROPS.to_string());

    let properties = core_props.as_ref().map(DocProperties::from).unwrap_or_default();

    let metadata = DocumentMetadata {
        created: properties.created.clone(),
        modified: properties.modified.clone(),
        origin_filename: origin_filename.to_string(),
        origin_byte_size: bytes.len() as u64,
        content_digest: digest_bytes(bytes),
    };

    let opaque_parts = collect_opaque_parts(&mut archive, &seen)?;

    let doc = Document::build(metadata, properties, sheets, defined_names)?;
    Ok(doc.with_opaque_parts(opaque_parts))
}

fn decode_defined_names(workbook_xml: &WorkbookXml) -> BTreeMap<String, String> {
    let mut names = BTreeMap::new();
    if let Some(defined_names) = &workbook_xml.defined_names {
        for dn in &defined_names.defined_names {
            names.insert(dn.name.clone(), dn.value.clone());
        }
    }
    names
}

#[allow(clippy::too_many_arguments)]
fn decode_worksheet(
    name: String,
    index: usize,
    ws: &WorksheetXml,
    sst: &SharedStringTable,
    stylesheet: &StyleSheet,
    comments: Option<&Comments>,
    options: &CodecOptions,
) -> Result<Sheet> {
    let mut sheet = Sheet::new(name, index);

    for row in &ws.sheet_data.rows {
        if let Some(ht) = row.ht {
            sheet.row_heights.insert(row.r, ht);
        }
        for xml_cell in &row.cells {
            let cell = decode_cell(xml_cell, sst, stylesheet, options)?;
            if options.ignore_empty_cells && cell.is_empty() {
                continue;
            }
            sheet.cells.insert(xml_cell.r.clone(), cell);
            if sheet.cells.len() > options.max_cells_per_sheet {
                return Err(Error::SheetTooLarge {
                    sheet: sheet.name.clone(),
                    count: sheet.cells.len(),
                    limit: options.max_cells_per_sheet,
                });
            }
        }
    }

    if let Some(cols) = &ws.cols {
        for col in &cols.cols {
            if let Some(width) = col.width {
                for num in col.min..=col.max {
                    sheet.col_widths.insert(column_number_to_name(num)?, width);
                }
            }
        }
    }

    if let Some(merge_cells) = &ws.merge_cells {
        sheet.merged_ranges = merge_cells
            .merge_cells
            .iter()
            .map(|m| m.reference.clone())
            .collect();
    }

    if let Some(protection) = &ws.sheet_protection {
        sheet.protection = Some(SheetProtection {
            sheet_locked: protection.sheet.unwrap_or(false),
            objects_locked: protection.objects.unwrap_or(false),
            scenarios_locked: protection.scenarios.unwrap_or(false),
        });
    }

    for config in validation::get_validations(ws) {
        let rule = ValidationRule::from(&config);
        for addr in expand_sqref(&config.sqref)? {
            sheet
                .cells
                .entry(addr)
                .or_insert_with(|| Cell::new(CellValue::Empty))
                .validation = Some(rule.clone());
        }
    }

    if options.preserve_comments {
        if let Some(comments) = comments {
            for cfg in comment::get_all_comments(&Some(comments.clone())) {
                sheet
                    .cells
                    .entry(cfg.cell)
                    .or_insert_with(|| Cell::new(CellValue::Empty))
                    .comment = Some(cfg.text);
            }
        }
    }

    Ok(sheet)
}

fn decode_cell(xml_cell: &XmlCell, sst: &SharedStringTable, stylesheet: &StyleSheet, options: &CodecOptions) -> Result<Cell> {
    let resolved_style = xml_cell.s.and_then(|id| style::get_style(stylesheet, id));
    let number_format = resolved_style.as_ref().and_then(|s| s.num_fmt.as_ref()).map(|nf| match nf {
        NumFmtStyle::Builtin(id) => numfmt::builtin_format_code(*id)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "General".to_string()),
        NumFmtStyle::Custom(code) => code.clone(),
    });
    let is_date_format = number_format
        .as_deref()
        .map(numfmt::is_date_time_format)
        .unwrap_or(false);

    let value = match xml_cell.t.as_deref() {
        Some(cell_types::SHARED_STRING) => {
            let idx: usize = xml_cell
                .v
                .as_deref()
                .unwrap_or("0")
                .parse()
                .map_err(|_| Error::Corrupt(format!("invalid shared string index in cell {}", xml_cell.r)))?;
            CellValue::String(sst.get(idx).unwrap_or_default().to_string())
        }
        Some(cell_types::INLINE_STRING) => {
            CellValue::String(xml_cell.is.as_ref().and_then(|is| is.t.clone()).unwrap_or_default())
        }
        Some(cell_types::FORMULA_STRING) => CellValue::String(xml_cell.v.clone().unwrap_or_default()),
        Some(cell_types::BOOLEAN) => CellValue::Bool(xml_cell.v.as_deref() == Some("1")),
        Some(cell_types::ERROR) => CellValue::Error(xml_cell.v.clone().unwrap_or_default()),
        Some(cell_types::DATE) => {
            let serial: f64 = xml_cell.v.as_deref().unwrap_or("0").parse().unwrap_or(0.0);
            serial_to_datetime(serial).map(CellValue::Date).unwrap_or(CellValue::Number(serial))
        }
        _ => match xml_cell.v.as_deref() {
            Some(v) if !v.is_empty() => {
                let n: f64 = v
                    .parse()
                    .map_err(|_| Error::Corrupt(format!("invalid numeric value in cell {}", xml_cell.r)))?;
                if is_date_format {
                    serial_to_datetime(n).map(CellValue::Date).unwrap_or(CellValue::Number(n))
                } else {
                    CellValue::Number(n)
                }
            }
            _ => CellValue::Empty,
        },
    };

    let mut cell = Cell::new(value);
    if options.preserve_styles {
        cell.style = resolved_style;
        cell.number_format = number_format;
    }
    if options.preserve_formulas {
        if let Some(f) = &xml_cell.f {
            if let Some(formula) = &f.value {
                cell.formula = Some(formula.strip_prefix('=').unwrap_or(formula).to_string());
            }
        }
    }
    Ok(cell)
}

/// Expand a data validation `sqref` (space-separated cells and/or ranges)
/// into the individual cell addresses it covers.
fn expand_sqref(sqref: &str) -> Result<Vec<String>> {
    let mut addrs = Vec::new();
    for part in sqref.split_whitespace() {
        match part.split_once(':') {
            Some((start, end)) => {
                let (c1, r1) = cell_name_to_coordinates(start)?;
                let (c2, r2) = cell_name_to_coordinates(end)?;
                let (min_c, max_c) = (c1.min(c2), c1.max(c2));
                let (min_r, max_r) = (r1.min(r2), r1.max(r2));
                for row in min_r..=max_r {
                    for col in min_c..=max_c {
                        addrs.push(coordinates_to_cell_name(col, row)?);
                    }
                }
            }
            None => addrs.push(part.to_string()),
        }
    }
    Ok(addrs)
}

fn collect_opaque_parts<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    seen: &BTreeSet<String>,
) -> Result<BTreeMap<String, Vec<u8>>> {
    let names: Vec<String> = archive.file_names().map(|s| s.to_string()).collect();
    let mut parts = BTreeMap::new();
    for name in names {
        if seen.contains(&name) || name.ends_with('/') {
            continue;
        }
        parts.insert(name.clone(), read_bytes_part(archive, &name)?);
    }
    Ok(parts)
}

fn read_xml_part<T: serde::de::DeserializeOwned, R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<T> {
    let xml = read_string_part(archive, name)?;
    quick_xml::de::from_str(&xml).map_err(|e| Error::XmlDeserialize(format!("{name}: {e}")))
}

fn read_string_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| Error::Zip(format!("{name}: {e}")))?;
    let mut s = String::new();
    file.read_to_string(&mut s)?;
    Ok(s)
}

fn read_bytes_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| Error::Zip(format!("{name}: {e}")))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

// ===== Encode =====

/// Encode a [`Document`] and write it to disk as an `.xlsx` package.
pub fn encode_file<P: AsRef<Path>>(doc: &Document, path: P, options: &CodecOptions) -> Result<()> {
    let bytes = encode_bytes(doc, options)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Encode a [`Document`] into an in-memory `.xlsx` package.
pub fn encode_bytes(doc: &Document, options: &CodecOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let cursor = Cursor::new(&mut buf);
        let mut zip = ZipWriter::new(cursor);
        let zip_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        write_zip_contents(doc, &mut zip, zip_options, options)?;
        zip.finish().map_err(|e| Error::Zip(e.to_string()))?;
    }
    Ok(buf)
}

fn write_zip_contents<W: Write + Seek>(
    doc: &Document,
    zip: &mut ZipWriter<W>,
    zip_options: SimpleFileOptions,
    options: &CodecOptions,
) -> Result<()> {
    let mut stylesheet = StyleSheet::default();
    let mut sst = SharedStringTable::new();

    let mut worksheets = Vec::with_capacity(doc.sheets.len());
    for sheet in &doc.sheets {
        worksheets.push(encode_sheet(sheet, &mut sst, &mut stylesheet, options)?);
    }

    let sheet_paths: Vec<String> = (1..=doc.sheets.len())
        .map(|i| format!("xl/worksheets/sheet{i}.xml"))
        .collect();
    let comment_paths: Vec<Option<String>> = worksheets
        .iter()
        .enumerate()
        .map(|(i, (_, comments))| comments.as_ref().map(|_| format!("xl/comments{}.xml", i + 1)))
        .collect();

    let mut content_types = ContentTypes {
        xmlns: namespaces::CONTENT_TYPES.to_string(),
        defaults: vec![
            ContentTypeDefault {
                extension: "rels".to_string(),
                content_type: mime_types::RELS.to_string(),
            },
            ContentTypeDefault {
                extension: "xml".to_string(),
                content_type: mime_types::XML.to_string(),
            },
        ],
        overrides: vec![
            ContentTypeOverride {
                part_name: format!("/{PART_WORKBOOK}"),
                content_type: mime_types::WORKBOOK.to_string(),
            },
            ContentTypeOverride {
                part_name: format!("/{PART_STYLES}"),
                content_type: mime_types::STYLES.to_string(),
            },
            ContentTypeOverride {
                part_name: format!("/{PART_SHARED_STRINGS}"),
                content_type: mime_types::SHARED_STRINGS.to_string(),
            },
            ContentTypeOverride {
                part_name: format!("/{PART_CORE_PROPS}"),
                content_type: mime_types::CORE_PROPERTIES.to_string(),
            },
            ContentTypeOverride {
                part_name: format!("/{PART_APP_PROPS}"),
                content_type: mime_types::EXTENDED_PROPERTIES.to_string(),
            },
        ],
    };
    for path in &sheet_paths {
        content_types.overrides.push(ContentTypeOverride {
            part_name: format!("/{path}"),
            content_type: mime_types::WORKSHEET.to_string(),
        });
    }
    for path in comment_paths.iter().flatten() {
        content_types.overrides.push(ContentTypeOverride {
            part_name: format!("/{path}"),
            content_type: mime_types::COMMENTS.to_string(),
        });
    }

    let mut workbook_rels = Relationships {
        xmlns: namespaces::PACKAGE_RELATIONSHIPS.to_string(),
        relationships: Vec::with_capacity(sheet_paths.len() + 2),
    };
    for (i, path) in sheet_paths.iter().enumerate() {
        workbook_rels.relationships.push(Relationship {
            id: format!("rId{}", i + 1),
            rel_type: rel_types::WORKSHEET.to_string(),
            target: path.trim_start_matches("xl/").to_string(),
            target_mode: None,
        });
    }
    workbook_rels.relationships.push(Relationship {
        id: format!("rId{}", sheet_paths.len() + 1),
        rel_type: rel_types::STYLES.to_string(),
        target: "styles.xml".to_string(),
        target_mode: None,
    });
    workbook_rels.relationships.push(Relationship {
        id: format!("rId{}", sheet_paths.len() + 2),
        rel_type: rel_types::SHARED_STRINGS.to_string(),
        target: "sharedStrings.xml".to_string(),
        target_mode: None,
    });

    let sheets_entries: Vec<SheetEntry> = doc
        .sheets
        .iter()
        .enumerate()
        .map(|(i, sheet)| SheetEntry {
            name: sheet.name.clone(),
            sheet_id: (i + 1) as u32,
            state: if sheet.hidden { Some("hidden".to_string()) } else { None },
            r_id: format!("rId{}", i + 1),
        })
        .collect();

    let defined_names = if doc.defined_names.is_empty() {
        None
    } else {
        Some(DefinedNames {
            defined_names: doc
                .defined_names
                .iter()
                .map(|(name, value)| DefinedName {
                    name: name.clone(),
                    local_sheet_id: None,
                    hidden: None,
                    value: value.clone(),
                })
                .collect(),
        })
    };

    let workbook_xml = WorkbookXml {
        xmlns: namespaces::SPREADSHEET_ML.to_string(),
        xmlns_r: namespaces::RELATIONSHIPS.to_string(),
        file_version: None,
        workbook_pr: None,
        book_views: None,
        sheets: Sheets { sheets: sheets_entries },
        defined_names,
        calc_pr: None,
    };

    let mut written: BTreeSet<String> = BTreeSet::new();

    write_xml_part(zip, PART_CONTENT_TYPES, &content_types, zip_options)?;
    written.insert(PART_CONTENT_TYPES.to_string());

    write_xml_part(zip, PART_PACKAGE_RELS, &relationships::package_rels(), zip_options)?;
    written.insert(PART_PACKAGE_RELS.to_string());

    write_xml_part(zip, PART_WORKBOOK, &workbook_xml, zip_options)?;
    written.insert(PART_WORKBOOK.to_string());

    write_xml_part(zip, PART_WORKBOOK_RELS, &workbook_rels, zip_options)?;
    written.insert(PART_WORKBOOK_RELS.to_string());

    for (i, (ws, _)) in worksheets.iter().enumerate() {
        let path = &sheet_paths[i];
        write_xml_part(zip, path, ws, zip_options)?;
        written.insert(path.clone());

        if let Some(comment_path) = &comment_paths[i] {
            let rels_path = relationship_part_path(path);
            let target = relative_relationship_target(path, comment_path);
            let sheet_rels = Relationships {
                xmlns: namespaces::PACKAGE_RELATIONSHIPS.to_string(),
                relationships: vec![Relationship {
                    id: "rId1".to_string(),
                    rel_type: rel_types::COMMENTS.to_string(),
                    target,
                    target_mode: None,
                }],
            };
            write_xml_part(zip, &rels_path, &sheet_rels, zip_options)?;
            written.insert(rels_path);
        }
    }

    write_xml_part(zip, PART_STYLES, &stylesheet, zip_options)?;
    written.insert(PART_STYLES.to_string());

    write_xml_part(zip, PART_SHARED_STRINGS, &sst.to_sst(), zip_options)?;
    written.insert(PART_SHARED_STRINGS.to_string());

    for (i, (_, comments)) in worksheets.iter().enumerate() {
        if let Some(comments) = comments {
            let path = comment_paths[i].as_ref().expect("comments imply a comments path");
            write_xml_part(zip, path, comments, zip_options)?;
            written.insert(path.clone());
        }
    }

    write_string_part(
        zip,
        PART_CORE_PROPS,
        &serialize_core_properties(&doc.properties.to_core_properties()),
        zip_options,
    )?;
    written.insert(PART_CORE_PROPS.to_string());

    write_xml_part(zip, PART_APP_PROPS, &ExtendedProperties::with_defaults(), zip_options)?;
    written.insert(PART_APP_PROPS.to_string());

    for (path, bytes) in &doc.opaque_parts {
        if written.contains(path) {
            continue;
        }
        zip.start_file(path, zip_options)
            .map_err(|e| Error::Zip(format!("{path}: {e}")))?;
        zip.write_all(bytes)?;
    }

    Ok(())
}

fn encode_sheet(
    sheet: &Sheet,
    sst: &mut SharedStringTable,
    stylesheet: &mut StyleSheet,
    options: &CodecOptions,
) -> Result<(WorksheetXml, Option<Comments>)> {
    let sheet_data = build_sheet_data(sheet, sst, stylesheet, options)?;
    let dimension = sheet_dimension(sheet)?;
    let cols = build_cols(sheet)?;

    let merge_cells = if sheet.merged_ranges.is_empty() {
        None
    } else {
        Some(MergeCells {
            count: Some(sheet.merged_ranges.len() as u32),
            merge_cells: sheet
                .merged_ranges
                .iter()
                .map(|r| MergeCell { reference: r.clone() })
                .collect(),
        })
    };

    let sheet_protection = sheet.protection.as_ref().map(|p| XmlSheetProtection {
        sheet: Some(p.sheet_locked),
        objects: Some(p.objects_locked),
        scenarios: Some(p.scenarios_locked),
        password: None,
    });

    let data_validations = build_data_validations(sheet);

    let mut comments: Option<Comments> = None;
    if options.preserve_comments {
        for (addr, cell) in &sheet.cells {
            if let Some(text) = &cell.comment {
                comment::add_comment(
                    &mut comments,
                    &CommentConfig {
                        cell: addr.clone(),
                        author: "xlvc".to_string(),
                        text: text.clone(),
                    },
                );
            }
        }
    }

    let ws = WorksheetXml {
        dimension,
        cols,
        sheet_data,
        merge_cells,
        sheet_protection,
        data_validations,
        ..WorksheetXml::default()
    };

    Ok((ws, comments))
}

fn build_sheet_data(
    sheet: &Sheet,
    sst: &mut SharedStringTable,
    stylesheet: &mut StyleSheet,
    options: &CodecOptions,
) -> Result<SheetData> {
    let mut rows_map: BTreeMap<u32, Vec<(u32, XmlCell)>> = BTreeMap::new();
    for (addr, cell) in &sheet.cells {
        let (col, row) = cell_name_to_coordinates(addr)?;
        let xml_cell = encode_cell(addr, cell, sst, stylesheet, options)?;
        rows_map.entry(row).or_default().push((col, xml_cell));
    }

    let mut rows = Vec::with_capacity(rows_map.len().max(sheet.row_heights.len()));
    for (r, mut cells) in rows_map {
        cells.sort_by_key(|(col, _)| *col);
        rows.push(XmlRow {
            r,
            spans: None,
            s: None,
            custom_format: None,
            ht: sheet.row_heights.get(&r).copied(),
            hidden: None,
            custom_height: sheet.row_heights.get(&r).map(|_| true),
            outline_level: None,
            cells: cells.into_iter().map(|(_, c)| c).collect(),
        });
    }

    for (&r, &ht) in &sheet.row_heights {
        if !rows.iter().any(|row| row.r == r) {
            rows.push(XmlRow {
                r,
                spans: None,
                s: None,
                custom_format: None,
                ht: Some(ht),
                hidden: None,
                custom_height: Some(true),
                outline_level: None,
                cells: vec![],
            });
        }
    }
    rows.sort_by_key(|r| r.r);

    Ok(SheetData { rows })
}

fn sheet_dimension(sheet: &Sheet) -> Result<Option<Dimension>> {
    if sheet.cells.is_empty() {
        return Ok(None);
    }
    let mut min_col = u32::MAX;
    let mut max_col = 0u32;
    let mut min_row = u32::MAX;
    let mut max_row = 0u32;
    for addr in sheet.cells.keys() {
        let (col, row) = cell_name_to_coordinates(addr)?;
        min_col = min_col.min(col);
        max_col = max_col.max(col);
        min_row = min_row.min(row);
        max_row = max_row.max(row);
    }
    let start = coordinates_to_cell_name(min_col, min_row)?;
    let end = coordinates_to_cell_name(max_col, max_row)?;
    Ok(Some(Dimension { reference: format!("{start}:{end}") }))
}

fn build_cols(sheet: &Sheet) -> Result<Option<Cols>> {
    if sheet.col_widths.is_empty() {
        return Ok(None);
    }
    let mut cols = Vec::with_capacity(sheet.col_widths.len());
    for (name, width) in &sheet.col_widths {
        let num = column_name_to_number(name)?;
        cols.push(Col {
            min: num,
            max: num,
            width: Some(*width),
            style: None,
            hidden: None,
            custom_width: Some(true),
            outline_level: None,
        });
    }
    cols.sort_by_key(|c| c.min);
    Ok(Some(Cols { cols }))
}

fn build_data_validations(sheet: &Sheet) -> Option<DataValidations> {
    let mut groups: Vec<(ValidationRule, Vec<String>)> = Vec::new();
    for (addr, cell) in &sheet.cells {
        if let Some(rule) = &cell.validation {
            match groups.iter_mut().find(|(r, _)| r == rule) {
                Some(group) => group.1.push(addr.clone()),
                None => groups.push((rule.clone(), vec![addr.clone()])),
            }
        }
    }
    if groups.is_empty() {
        return None;
    }

    let mut data_validations = Vec::with_capacity(groups.len());
    for (rule, addrs) in groups {
        let config = DataValidationConfig {
            sqref: addrs.join(" "),
            validation_type: rule.validation_type.clone(),
            operator: rule.operator.clone(),
            formula1: rule.formula1.clone(),
            formula2: rule.formula2.clone(),
            allow_blank: rule.allow_blank,
            error_style: rule.error_style.clone(),
            error_title: rule.error_title.clone(),
            error_message: rule.error_message.clone(),
            prompt_title: None,
            prompt_message: None,
            show_input_message: false,
            show_error_message: rule.error_style.is_some(),
        };
        data_validations.push(validation::config_to_xml(&config));
    }

    Some(DataValidations {
        count: Some(data_validations.len() as u32),
        data_validations,
    })
}

fn encode_cell(
    addr: &str,
    cell: &Cell,
    sst: &mut SharedStringTable,
    stylesheet: &mut StyleSheet,
    options: &CodecOptions,
) -> Result<XmlCell> {
    let mut t: Option<String> = None;
    let mut v: Option<String> = None;

    match &cell.value {
        CellValue::Empty => {}
        CellValue::String(s) => {
            t = Some(cell_types::SHARED_STRING.to_string());
            v = Some(sst.add(s).to_string());
        }
        CellValue::Number(n) => v = Some(format_number_value(*n)),
        CellValue::Bool(b) => {
            t = Some(cell_types::BOOLEAN.to_string());
            v = Some(if *b { "1".to_string() } else { "0".to_string() });
        }
        CellValue::Date(dt) => v = Some(format_number_value(datetime_to_serial(*dt))),
        CellValue::Error(e) => {
            t = Some(cell_types::ERROR.to_string());
            v = Some(e.clone());
        }
    }

    let s = if options.preserve_styles { encode_cell_style(cell, stylesheet)? } else { None };

    let f = if options.preserve_formulas {
        cell.formula.as_ref().map(|formula| CellFormula {
            t: None,
            reference: None,
            si: None,
            value: Some(formula.clone()),
        })
    } else {
        None
    };

    Ok(XmlCell {
        r: addr.to_string(),
        s,
        t,
        v,
        f,
        is: None,
    })
}

fn encode_cell_style(cell: &Cell, stylesheet: &mut StyleSheet) -> Result<Option<u32>> {
    if let Some(style) = &cell.style {
        return Ok(Some(style::add_style(stylesheet, style)?));
    }
    if let Some(fmt) = &cell.number_format {
        let style = Style {
            num_fmt: Some(NumFmtStyle::Custom(fmt.clone())),
            ..Style::default()
        };
        return Ok(Some(style::add_style(stylesheet, &style)?));
    }
    if matches!(cell.value, CellValue::Date(_)) {
        let style = Style {
            num_fmt: Some(NumFmtStyle::Builtin(builtin_num_fmts::DATE_MDY)),
            ..Style::default()
        };
        return Ok(Some(style::add_style(stylesheet, &style)?));
    }
    Ok(None)
}

fn format_number_value(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn write_xml_part<T: serde::Serialize, W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    value: &T,
    options: SimpleFileOptions,
) -> Result<()> {
    let body = quick_xml::se::to_string(value).map_err(|e| Error::XmlParse(format!("{name}: {e}")))?;
    let xml = format!("{XML_DECLARATION}\n{body}");
    zip.start_file(name, options)
        .map_err(|e| Error::Zip(format!("{name}: {e}")))?;
    zip.write_all(xml.as_bytes())?;
    Ok(())
}

fn write_string_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    content: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|e| Error::Zip(format!("{name}: {e}")))?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}
