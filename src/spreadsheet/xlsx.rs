use crate::error::ResultMessage;
use crate::error::RustyTableError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::xml::XmlWriter;
use crate::helpers::zip::ZipHelper;
use crate::helpers::zip::ZipWriterHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::cell::StyledCell;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Worksheet;
use crate::spreadsheet::style::CellStyle;
use crate::spreadsheet::style::STYLES_XML;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use tracing::debug;
use tracing::warn;
use zip::read::ZipFile;
use zip::ZipArchive;
use zip::ZipWriter;

// XML tag names of the SpreadsheetML parts
const TAG_SHARED_STRING_ITEM: QName = QName(b"si"); // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");     // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                // Text content within strings
const TAG_SHEET: QName = QName(b"sheet");           // Worksheet definition
const TAG_COLUMN: QName = QName(b"col");            // Column width definition
const TAG_ROW: QName = QName(b"row");               // Row in worksheet
const TAG_CELL: QName = QName(b"c");                // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");      // Inline string value
const TAG_VALUE: QName = QName(b"v");               // Cell value content

/// Widths declared over wider spans than this only apply to their first column
const MAX_COLUMN_SPAN: usize = 256;

/// Reads every worksheet of an xlsx file, in workbook order.
pub(crate) fn read_workbook(path: &Path) -> Result<Vec<Worksheet>, RustyTableError> {
    let file = File::open(path)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    let entries = load_workbook(&mut zip)?;
    let shared_strings = load_shared_strings(&mut zip)?;

    let mut sheets = Vec::with_capacity(entries.len());
    for (name, zip_path) in entries {
        let sheet = read_worksheet(&mut zip, &name, &zip_path, &shared_strings)
            .with_prefix(&format!("Read sheet '{name}'"))?;
        sheets.push(sheet);
    }
    debug!(path = %path.display(), sheets = sheets.len(), "loaded workbook");
    Ok(sheets)
}

/// Lists (sheet name, archive path) pairs from the workbook part.
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<(String, String)>, RustyTableError> {
    let relationships = load_relationships(zip, excel::WORKBOOK_RELS_PATH)?;
    let mut reader = zip.xml_reader(excel::WORKBOOK_PATH)?
        .ok_or_else(|| SpreadsheetError::FileError(excel::WORKBOOK_PATH.to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&*id) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Loads the shared string table; absent tables are empty.
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, RustyTableError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader(excel::SHARED_STRINGS_PATH)? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
            shared_strings.push(string);
        }
    });
    Ok(shared_strings)
}

fn read_worksheet<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    name: &str,
    zip_path: &str,
    shared_strings: &[String],
) -> Result<Worksheet, RustyTableError> {
    let mut reader = zip.xml_reader(zip_path)?
        .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_string()))?;
    let mut sheet = Worksheet::new(name);
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    let mut cell = Cell {
        row: 0,
        col: 0,
        kind: CellType::default(),
        style: CellStyle::default(),
        value: String::new(),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_COLUMN => {
            let min = event.get_attribute_value("min")?.map(|it| it.parse::<usize>()).transpose()?;
            let max = event.get_attribute_value("max")?.map(|it| it.parse::<usize>()).transpose()?;
            let width = event.get_attribute_value("width")?.and_then(|it| it.parse::<f64>().ok());
            if let (Some(min), Some(width)) = (min.filter(|min| *min > 0), width) {
                let max = max.filter(|max| *max >= min && max - min < MAX_COLUMN_SPAN).unwrap_or(min);
                for col in min..=max {
                    sheet.set_column_width(col - 1, width);
                }
            }
        }
        Event::Start(event) if event.name() == TAG_ROW => {
            if let Some(number) = event.get_attribute_value("r")? {
                row_count = number.parse::<usize>()?.saturating_sub(1);
            }
            // Rows written without cells still occupy their position
            let rows = sheet.rows_mut();
            if rows.len() <= row_count {
                rows.resize_with(row_count + 1, Vec::new);
            }
        }
        Event::End(event) if event.name() == TAG_ROW => {
            row_count += 1;
            col_count = 0;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            (cell.row, cell.col) = match event.get_attribute_value("r")? {
                Some(reference) => reference_to_index(&reference)
                    .ok_or_else(|| SpreadsheetError::ReferenceError(reference.to_string()))?,
                None => (row_count, col_count),
            };
            col_count = cell.col + 1;
            cell.kind = CellType::from_attribute(event.get_attribute_value("t")?.as_deref());
            cell.style = match event.get_attribute_value("s")? {
                Some(id) if !id.is_empty() => CellStyle::from_id(id.parse::<usize>()?),
                _ => CellStyle::default(),
            };
            cell.value.clear();
        }
        Event::Start(event) if event.name() == TAG_INLINE_STRING => {
            cell.value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
        }
        Event::Start(event) if event.name() == TAG_VALUE => {
            cell.value = read_string_value(&mut reader, TAG_VALUE, true)?;
        }
        Event::End(event) if event.name() == TAG_CELL => {
            if cell.kind == CellType::Error {
                warn!(sheet = name, cell = %cell.reference(), value = %cell.value, "error value in cell");
            }
            sheet.put(cell.row, cell.col, StyledCell::new(cell.text(shared_strings), cell.style));
        }
    });
    Ok(sheet)
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Skips phonetic text annotations. With `is_text_content` the element's own
/// text is collected, otherwise only text inside `<t>` children.
fn read_string_value<RS: Read + Seek>(
    reader: &mut XmlReader<BufReader<ZipFile<'_, RS>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, RustyTableError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_bytes_text(&event)?,
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

/// Writes the sheets as a complete xlsx package, replacing `path`.
pub(crate) fn write_workbook(path: &Path, sheets: &[Worksheet]) -> Result<(), RustyTableError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    zip.add_part("[Content_Types].xml", &excel::content_types_xml(sheets.len())?)?;
    zip.add_part("_rels/.rels", &excel::root_relationships_xml()?)?;
    zip.add_part(excel::WORKBOOK_PATH, &excel::workbook_xml(sheets.iter().map(|sheet| sheet.name()))?)?;
    zip.add_part(excel::WORKBOOK_RELS_PATH, &excel::workbook_relationships_xml(sheets.len())?)?;
    zip.add_part(excel::STYLES_PATH, STYLES_XML.as_bytes())?;
    for (index, sheet) in sheets.iter().enumerate() {
        zip.add_part(&excel::worksheet_path(index), &worksheet_xml(sheet)?)
            .with_prefix(&format!("Write sheet '{}'", sheet.name()))?;
    }
    zip.finish()?;
    debug!(path = %path.display(), sheets = sheets.len(), "saved workbook");
    Ok(())
}

fn worksheet_xml(sheet: &Worksheet) -> Result<Vec<u8>, RustyTableError> {
    let mut writer = XmlWriter::new()?;
    writer.start("worksheet", &[
        ("xmlns", "http://schemas.openxmlformats.org/spreadsheetml/2006/main"),
        ("xmlns:r", "http://schemas.openxmlformats.org/officeDocument/2006/relationships"),
    ])?;

    if sheet.column_widths.iter().any(Option::is_some) {
        writer.start("cols", &[])?;
        for (col, width) in sheet.column_widths.iter().enumerate() {
            if let Some(width) = width {
                let number = (col + 1).to_string();
                let width = width.to_string();
                writer.empty("col", &[
                    ("min", number.as_str()),
                    ("max", number.as_str()),
                    ("width", width.as_str()),
                    ("customWidth", "1"),
                ])?;
            }
        }
        writer.end("cols")?;
    }

    writer.start("sheetData", &[])?;
    for (row, cells) in sheet.rows().iter().enumerate() {
        let number = (row + 1).to_string();
        if cells.is_empty() {
            writer.empty("row", &[("r", number.as_str())])?;
            continue;
        }
        writer.start("row", &[("r", number.as_str())])?;
        for (col, cell) in cells.iter().enumerate() {
            let reference = index_to_reference(row, col);
            let style = cell.style.id().to_string();
            if cell.value.is_empty() {
                writer.empty("c", &[("r", reference.as_str()), ("s", style.as_str())])?;
            } else {
                writer.start("c", &[("r", reference.as_str()), ("s", style.as_str()), ("t", "inlineStr")])?;
                writer.start("is", &[])?;
                writer.element("t", &[("xml:space", "preserve")], &cell.value)?;
                writer.end("is")?;
                writer.end("c")?;
            }
        }
        writer.end("row")?;
    }
    writer.end("sheetData")?;
    writer.end("worksheet")?;
    Ok(writer.into_bytes())
}
