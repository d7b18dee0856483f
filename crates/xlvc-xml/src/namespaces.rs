//! XML namespace URIs mandated by the OOXML package and spreadsheet schemas.
//!
//! These values are fixed by the ECMA-376 / ISO 29500 specs, not a design
//! choice of this crate -- every conforming reader and writer uses the exact
//! same strings.

macro_rules! namespace_constants {
    ($($(#[$meta:meta])* $name:ident => $value:expr;)+) => {
        $(
            $(#[$meta])*
            pub const $name: &str = $value;
        )+
    };
}

namespace_constants! {
    /// SpreadsheetML: workbook.xml, worksheet XML, styles.xml, sharedStrings.xml.
    SPREADSHEET_ML => "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

    /// Part-to-part relationship references (`r:id` attributes).
    RELATIONSHIPS => "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// Package-level relationships (`_rels/.rels`).
    PACKAGE_RELATIONSHIPS => "http://schemas.openxmlformats.org/package/2006/relationships";

    /// `[Content_Types].xml`.
    CONTENT_TYPES => "http://schemas.openxmlformats.org/package/2006/content-types";

    DRAWING_ML => "http://schemas.openxmlformats.org/drawingml/2006/main";
    DRAWING_ML_CHART => "http://schemas.openxmlformats.org/drawingml/2006/chart";
    DRAWING_ML_SPREADSHEET => "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing";

    /// Markup compatibility (`mc:Ignorable` etc).
    MC => "http://schemas.openxmlformats.org/markup-compatibility/2006";

    /// Dublin Core, used by `docProps/core.xml`.
    DC => "http://purl.org/dc/elements/1.1/";
    DC_TERMS => "http://purl.org/dc/terms/";
    DC_MITYPE => "http://purl.org/dc/dcmitype/";

    EXTENDED_PROPERTIES => "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
    CORE_PROPERTIES => "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

    /// Variant-type values used inside `docProps/app.xml`.
    VT => "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";

    CUSTOM_PROPERTIES => "http://schemas.openxmlformats.org/officeDocument/2006/custom-properties";

    XML => "http://www.w3.org/XML/1998/namespace";
    XSI => "http://www.w3.org/2001/XMLSchema-instance";
}
