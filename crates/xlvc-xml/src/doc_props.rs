//! Document properties XML schema structures.
//!
//! Covers:
//! - Core properties (`docProps/core.xml`) - Dublin Core metadata
//! - Extended properties (`docProps/app.xml`) - application metadata

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Reader;
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::namespaces;

// ---------------------------------------------------------------------------
// Core Properties (docProps/core.xml)
// ---------------------------------------------------------------------------

/// Core document properties (docProps/core.xml).
///
/// Uses Dublin Core namespaces (`dc:`, `dcterms:`, `cp:`).
/// Because quick-xml serde does not handle namespace prefixes well,
/// serialization and deserialization are done manually.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub category: Option<String>,
    pub content_status: Option<String>,
}

// DCMI Type namespace, only used for the coreProperties root element.
const DC_MITYPE: &str = "http://purl.org/dc/dcmitype/";

/// Tags that carry plain text content, in serialization order.
fn text_fields(props: &CoreProperties) -> Vec<(&'static str, &Option<String>)> {
    vec![
        ("dc:title", &props.title),
        ("dc:subject", &props.subject),
        ("dc:creator", &props.creator),
        ("cp:keywords", &props.keywords),
        ("dc:description", &props.description),
        ("cp:lastModifiedBy", &props.last_modified_by),
        ("cp:revision", &props.revision),
    ]
}

/// Tags that carry a `dcterms:W3CDTF`-typed timestamp.
fn timestamp_fields(props: &CoreProperties) -> Vec<(&'static str, &Option<String>)> {
    vec![("dcterms:created", &props.created), ("dcterms:modified", &props.modified)]
}

/// Tags appearing after the timestamp fields.
fn trailing_text_fields(props: &CoreProperties) -> Vec<(&'static str, &Option<String>)> {
    vec![("cp:category", &props.category), ("cp:contentStatus", &props.content_status)]
}

/// Serialize `CoreProperties` to its XML string representation.
pub fn serialize_core_properties(props: &CoreProperties) -> String {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .unwrap();

    let mut root = BytesStart::new("cp:coreProperties");
    root.push_attribute(("xmlns:cp", namespaces::CORE_PROPERTIES));
    root.push_attribute(("xmlns:dc", namespaces::DC));
    root.push_attribute(("xmlns:dcterms", namespaces::DC_TERMS));
    root.push_attribute(("xmlns:dcmitype", DC_MITYPE));
    root.push_attribute(("xmlns:xsi", namespaces::XSI));
    writer.write_event(Event::Start(root)).unwrap();

    for (tag, value) in text_fields(props) {
        if let Some(v) = value {
            write_text_element(&mut writer, tag, v);
        }
    }
    for (tag, value) in timestamp_fields(props) {
        if let Some(v) = value {
            write_w3cdtf_element(&mut writer, tag, v);
        }
    }
    for (tag, value) in trailing_text_fields(props) {
        if let Some(v) = value {
            write_text_element(&mut writer, tag, v);
        }
    }

    writer.write_event(Event::End(BytesEnd::new("cp:coreProperties"))).unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) {
    writer.write_event(Event::Start(BytesStart::new(tag))).unwrap();
    writer.write_event(Event::Text(BytesText::new(value))).unwrap();
    writer.write_event(Event::End(BytesEnd::new(tag))).unwrap();
}

fn write_w3cdtf_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) {
    let mut start = BytesStart::new(tag);
    start.push_attribute(("xsi:type", "dcterms:W3CDTF"));
    writer.write_event(Event::Start(start)).unwrap();
    writer.write_event(Event::Text(BytesText::new(value))).unwrap();
    writer.write_event(Event::End(BytesEnd::new(tag))).unwrap();
}

/// Deserialize `CoreProperties` from an XML string.
pub fn deserialize_core_properties(xml: &str) -> Result<CoreProperties, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut props = CoreProperties::default();
    let mut current_tag: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                current_tag = Some(String::from_utf8_lossy(e.name().as_ref()).to_string());
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref tag) = current_tag {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match tag.as_str() {
                        "dc:title" | "title" => props.title = Some(text),
                        "dc:subject" | "subject" => props.subject = Some(text),
                        "dc:creator" | "creator" => props.creator = Some(text),
                        "cp:keywords" | "keywords" => props.keywords = Some(text),
                        "dc:description" | "description" => props.description = Some(text),
                        "cp:lastModifiedBy" | "lastModifiedBy" => props.last_modified_by = Some(text),
                        "cp:revision" | "revision" => props.revision = Some(text),
                        "dcterms:created" | "created" => props.created = Some(text),
                        "dcterms:modified" | "modified" => props.modified = Some(text),
                        "cp:category" | "category" => props.category = Some(text),
                        "cp:contentStatus" | "contentStatus" => props.content_status = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(_)) => current_tag = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {e}")),
            _ => {}
        }
    }

    Ok(props)
}

// ---------------------------------------------------------------------------
// Extended Properties (docProps/app.xml)
// ---------------------------------------------------------------------------

/// Extended (application) properties (`docProps/app.xml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Properties")]
pub struct ExtendedProperties {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    #[serde(rename = "@xmlns:vt", skip_serializing_if = "Option::is_none")]
    pub xmlns_vt: Option<String>,

    #[serde(rename = "Application", skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(rename = "DocSecurity", skip_serializing_if = "Option::is_none")]
    pub doc_security: Option<u32>,
    #[serde(rename = "ScaleCrop", skip_serializing_if = "Option::is_none")]
    pub scale_crop: Option<bool>,
    #[serde(rename = "Company", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "LinksUpToDate", skip_serializing_if = "Option::is_none")]
    pub links_up_to_date: Option<bool>,
    #[serde(rename = "SharedDoc", skip_serializing_if = "Option::is_none")]
    pub shared_doc: Option<bool>,
    #[serde(rename = "HyperlinksChanged", skip_serializing_if = "Option::is_none")]
    pub hyperlinks_changed: Option<bool>,
    #[serde(rename = "AppVersion", skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(rename = "Template", skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(rename = "Manager", skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
}

impl ExtendedProperties {
    /// Create a new `ExtendedProperties` with the standard namespace set.
    pub fn with_defaults() -> Self {
        Self {
            xmlns: namespaces::EXTENDED_PROPERTIES.to_string(),
            xmlns_vt: Some(namespaces::VT.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_properties_roundtrip() {
        let props = CoreProperties {
            title: Some("Test Title".to_string()),
            subject: Some("Test Subject".to_string()),
            creator: Some("Test Author".to_string()),
            keywords: Some("key1, key2".to_string()),
            description: Some("A description".to_string()),
            last_modified_by: Some("Editor".to_string()),
            revision: Some("3".to_string()),
            created: Some("2024-01-01T00:00:00Z".to_string()),
            modified: Some("2024-06-15T12:30:00Z".to_string()),
            category: Some("Reports".to_string()),
            content_status: Some("Draft".to_string()),
        };

        let xml = serialize_core_properties(&props);
        let parsed = deserialize_core_properties(&xml).unwrap();
        assert_eq!(props, parsed);
    }

    #[test]
    fn test_core_properties_empty_fields() {
        let props = CoreProperties::default();
        let xml = serialize_core_properties(&props);
        let parsed = deserialize_core_properties(&xml).unwrap();
        assert_eq!(props, parsed);
    }

    #[test]
    fn test_core_properties_partial_fields() {
        let props = CoreProperties {
            title: Some("Only Title".to_string()),
            creator: Some("Only Author".to_string()),
            ..Default::default()
        };

        let xml = serialize_core_properties(&props);
        let parsed = deserialize_core_properties(&xml).unwrap();
        assert_eq!(props, parsed);
    }

    #[test]
    fn test_core_properties_serialized_format() {
        let props = CoreProperties {
            title: Some("My Title".to_string()),
            creator: Some("Author Name".to_string()),
            created: Some("2024-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };

        let xml = serialize_core_properties(&props);
        assert!(xml.contains("<cp:coreProperties"));
        assert!(xml.contains("xmlns:cp="));
        assert!(xml.contains("xmlns:dc="));
        assert!(xml.contains("xmlns:dcterms="));
        assert!(xml.contains("<dc:title>My Title</dc:title>"));
        assert!(xml.contains("<dc:creator>Author Name</dc:creator>"));
        assert!(xml.contains("xsi:type=\"dcterms:W3CDTF\""));
        assert!(xml.contains("<dcterms:created"));
        assert!(xml.contains("2024-01-01T00:00:00Z</dcterms:created>"));
    }

    #[test]
    fn test_parse_real_excel_core_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>Budget Report</dc:title>
  <dc:subject>Finance</dc:subject>
  <dc:creator>John Doe</dc:creator>
  <cp:keywords>budget, 2024</cp:keywords>
  <dc:description>Annual budget report</dc:description>
  <cp:lastModifiedBy>Jane Smith</cp:lastModifiedBy>
  <cp:revision>5</cp:revision>
  <dcterms:created xsi:type="dcterms:W3CDTF">2024-01-15T08:00:00Z</dcterms:created>
  <dcterms:modified xsi:type="dcterms:W3CDTF">2024-06-20T16:45:00Z</dcterms:modified>
  <cp:category>Financial</cp:category>
  <cp:contentStatus>Final</cp:contentStatus>
</cp:coreProperties>"#;

        let props = deserialize_core_properties(xml).unwrap();
        assert_eq!(props.title.as_deref(), Some("Budget Report"));
        assert_eq!(props.subject.as_deref(), Some("Finance"));
        assert_eq!(props.creator.as_deref(), Some("John Doe"));
        assert_eq!(props.keywords.as_deref(), Some("budget, 2024"));
        assert_eq!(props.description.as_deref(), Some("Annual budget report"));
        assert_eq!(props.last_modified_by.as_deref(), Some("Jane Smith"));
        assert_eq!(props.revision.as_deref(), Some("5"));
        assert_eq!(props.created.as_deref(), Some("2024-01-15T08:00:00Z"));
        assert_eq!(props.modified.as_deref(), Some("2024-06-20T16:45:00Z"));
        assert_eq!(props.category.as_deref(), Some("Financial"));
        assert_eq!(props.content_status.as_deref(), Some("Final"));
    }

    #[test]
    fn test_extended_properties_serde_roundtrip() {
        let props = ExtendedProperties {
            xmlns: namespaces::EXTENDED_PROPERTIES.to_string(),
            xmlns_vt: Some(namespaces::VT.to_string()),
            application: Some("xlvc".to_string()),
            doc_security: Some(0),
            scale_crop: Some(false),
            company: Some("Acme Corp".to_string()),
            links_up_to_date: Some(false),
            shared_doc: Some(false),
            hyperlinks_changed: Some(false),
            app_version: Some("1.0.0".to_string()),
            template: None,
            manager: Some("Boss".to_string()),
        };

        let xml = quick_xml::se::to_string(&props).unwrap();
        let parsed: ExtendedProperties = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(props, parsed);
    }

    #[test]
    fn test_extended_properties_with_defaults() {
        let props = ExtendedProperties::with_defaults();
        assert_eq!(props.xmlns, namespaces::EXTENDED_PROPERTIES);
        assert_eq!(props.xmlns_vt.as_deref(), Some(namespaces::VT));
        assert!(props.application.is_none());
    }

    #[test]
    fn test_extended_properties_skip_none_fields() {
        let props = ExtendedProperties {
            xmlns: namespaces::EXTENDED_PROPERTIES.to_string(),
            xmlns_vt: None,
            application: Some("Test".to_string()),
            doc_security: None,
            scale_crop: None,
            company: None,
            links_up_to_date: None,
            shared_doc: None,
            hyperlinks_changed: None,
            app_version: None,
            template: None,
            manager: None,
        };

        let xml = quick_xml::se::to_string(&props).unwrap();
        assert!(xml.contains("<Application>Test</Application>"));
        assert!(!xml.contains("DocSecurity"));
        assert!(!xml.contains("Company"));
    }
}
