//! Office Open XML package parts shared by the xlsx reader and writer.
use crate::error::RustyTableError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlWriter;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const TYPE_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const TYPE_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const TYPE_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const TYPE_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

pub(crate) const WORKBOOK_PATH: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const STYLES_PATH: &str = "xl/styles.xml";
pub(crate) const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// Archive path of the n-th (0-based) worksheet written by this crate.
pub(crate) fn worksheet_path(index: usize) -> String {
    format!("xl/worksheets/sheet{}.xml", index + 1)
}

/// Loads worksheet relationships, mapping relationship ids to archive paths.
pub(crate) fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, String>, RustyTableError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only worksheet relationships are of interest
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target to a path inside the archive.
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

pub(crate) fn content_types_xml(sheet_count: usize) -> Result<Vec<u8>, RustyTableError> {
    let mut writer = XmlWriter::new()?;
    writer.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    writer.empty("Default", &[("Extension", "rels"), ("ContentType", TYPE_RELATIONSHIPS)])?;
    writer.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    writer.empty("Override", &[("PartName", "/xl/workbook.xml"), ("ContentType", TYPE_WORKBOOK)])?;
    for index in 0..sheet_count {
        let part_name = format!("/{}", worksheet_path(index));
        writer.empty("Override", &[("PartName", part_name.as_str()), ("ContentType", TYPE_WORKSHEET)])?;
    }
    writer.empty("Override", &[("PartName", "/xl/styles.xml"), ("ContentType", TYPE_STYLES)])?;
    writer.end("Types")?;
    Ok(writer.into_bytes())
}

pub(crate) fn root_relationships_xml() -> Result<Vec<u8>, RustyTableError> {
    let mut writer = XmlWriter::new()?;
    writer.start("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    writer.empty("Relationship", &[("Id", "rId1"), ("Type", REL_OFFICE_DOCUMENT), ("Target", WORKBOOK_PATH)])?;
    writer.end("Relationships")?;
    Ok(writer.into_bytes())
}

pub(crate) fn workbook_xml<'a>(sheet_names: impl Iterator<Item = &'a str>) -> Result<Vec<u8>, RustyTableError> {
    let mut writer = XmlWriter::new()?;
    writer.start("workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)])?;
    writer.start("sheets", &[])?;
    for (index, name) in sheet_names.enumerate() {
        let sheet_id = (index + 1).to_string();
        let relationship_id = format!("rId{}", index + 1);
        writer.empty("sheet", &[("name", name), ("sheetId", sheet_id.as_str()), ("r:id", relationship_id.as_str())])?;
    }
    writer.end("sheets")?;
    writer.end("workbook")?;
    Ok(writer.into_bytes())
}

/// Worksheets take rId1..rIdN, styles take rId(N+1).
pub(crate) fn workbook_relationships_xml(sheet_count: usize) -> Result<Vec<u8>, RustyTableError> {
    let mut writer = XmlWriter::new()?;
    writer.start("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    for index in 0..sheet_count {
        let id = format!("rId{}", index + 1);
        let target = format!("worksheets/sheet{}.xml", index + 1);
        writer.empty("Relationship", &[("Id", id.as_str()), ("Type", REL_WORKSHEET), ("Target", target.as_str())])?;
    }
    let styles_id = format!("rId{}", sheet_count + 1);
    writer.empty("Relationship", &[("Id", styles_id.as_str()), ("Type", REL_STYLES), ("Target", "styles.xml")])?;
    writer.end("Relationships")?;
    Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path(Cow::Borrowed("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("/xl/worksheets/sheet2.xml")), "xl/worksheets/sheet2.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("xl/worksheets/sheet3.xml")), "xl/worksheets/sheet3.xml");
    }

    #[test]
    fn workbook_part_lists_sheets_in_order() {
        let bytes = workbook_xml(["Test Cases", "R&D"].into_iter()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let first = text.find("Test Cases").unwrap();
        let second = text.find("R&amp;D").unwrap();
        assert!(first < second);
        assert!(text.contains(r#"r:id="rId2""#));
    }
}
