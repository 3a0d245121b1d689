use crate::spreadsheet::cell::StyledCell;

/// One worksheet held as a dense grid of styled cells.
///
/// An empty row vector is a blank row; rows may have different lengths.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Worksheet {
    pub(crate) name: String,
    pub(crate) rows: Vec<Vec<StyledCell>>,
    /// Column widths in characters, by 0-based column index
    pub(crate) column_widths: Vec<Option<f64>>,
}

impl Worksheet {
    pub fn new(name: &str) -> Self {
        Worksheet {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<StyledCell>] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<StyledCell>> {
        &mut self.rows
    }

    /// Returns true if the sheet has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row below the last one.
    pub fn push_row(&mut self, cells: Vec<StyledCell>) {
        self.rows.push(cells);
    }

    pub fn push_blank_row(&mut self) {
        self.rows.push(Vec::new());
    }

    /// Places a cell at (row, col), growing the grid with blank cells as needed.
    pub(crate) fn put(&mut self, row: usize, col: usize, cell: StyledCell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, StyledCell::default);
        }
        cells[col] = cell;
    }

    pub fn set_column_width(&mut self, col: usize, width: f64) {
        if self.column_widths.len() <= col {
            self.column_widths.resize(col + 1, None);
        }
        self.column_widths[col] = Some(width);
    }

    pub fn column_width(&self, col: usize) -> Option<f64> {
        self.column_widths.get(col).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::style::CellStyle;

    #[test]
    fn sheet_put_grows_grid() {
        let mut sheet = Worksheet::new("Data");
        sheet.put(2, 1, StyledCell::new("x", CellStyle::Body));

        assert_eq!(sheet.rows().len(), 3);
        assert!(sheet.rows()[0].is_empty());
        assert!(sheet.rows()[1].is_empty());
        assert_eq!(sheet.rows()[2].len(), 2);
        assert_eq!(sheet.rows()[2][0], StyledCell::default());
        assert_eq!(sheet.rows()[2][1].style, CellStyle::Body);
    }

    #[test]
    fn sheet_column_widths() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_column_width(2, 15.625);
        assert_eq!(sheet.column_width(0), None);
        assert_eq!(sheet.column_width(2), Some(15.625));
        assert_eq!(sheet.column_width(9), None);
    }
}
