use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::style::CellStyle;

/// Storage types of a worksheet cell, from the `t` attribute.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values such as #N/A
    Error,
}

impl CellType {
    /// Maps the `t` attribute of a `<c>` element; absent means number.
    pub(crate) fn from_attribute(kind: Option<&str>) -> CellType {
        match kind {
            Some("inlineStr") | Some("str") => CellType::InlineString,
            Some("s") => CellType::SharedString,
            Some("d") => CellType::IsoDateTime,
            Some("b") => CellType::Boolean,
            Some("e") => CellType::Error,
            _ => CellType::Number,
        }
    }
}

/// A raw cell as read from a worksheet part.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    pub(crate) style: CellStyle,
    /// Raw value text; an index for shared strings
    pub(crate) value: String,
}

impl Cell {
    /// Returns the A1-style reference of the cell.
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Resolves the display text of the cell.
    pub(crate) fn text(&self, shared_strings: &[String]) -> String {
        match self.kind {
            CellType::Empty => String::new(),
            CellType::Boolean => if self.value == "1" { "true" } else { "false" }.to_owned(),
            CellType::SharedString => self
                .value
                .parse::<usize>()
                .ok()
                .and_then(|index| shared_strings.get(index))
                .cloned()
                .unwrap_or_default(),
            CellType::IsoDateTime => self.value.replace('T', " "),
            CellType::Number | CellType::InlineString | CellType::Error => self.value.to_owned(),
        }
    }
}

/// A cell value together with its presentational style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyledCell {
    pub value: String,
    pub style: CellStyle,
}

impl StyledCell {
    pub fn new(value: impl Into<String>, style: CellStyle) -> Self {
        StyledCell {
            value: value.into(),
            style,
        }
    }
}
