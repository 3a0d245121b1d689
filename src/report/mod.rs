//! # Structured Report Store
//!
//! Test cases are accumulated under a fixed five column header in one sheet
//! of an xlsx workbook. Rows can be updated by case name and a summary block
//! of the outcomes can be appended below the data. Nothing is written until
//! [`ReportStore::persist`] is called, which rewrites the whole workbook
//! including any sibling sheets loaded with it.
mod status;
mod summary;

pub use status::Status;
pub use summary::Summary;

use crate::error::ResultMessage;
use crate::error::RustyTableError;
use crate::spreadsheet::CellStyle;
use crate::spreadsheet::StyledCell;
use crate::spreadsheet::Workbook;
use crate::spreadsheet::Worksheet;
use crate::table::Row;
use std::path::Path;
use std::path::PathBuf;
use summary::SUMMARY_TITLE;
use tracing::debug;
use tracing::info;

/// Sheet used when no name is given
pub const DEFAULT_SHEET_NAME: &str = "Test Cases";

pub const COLUMN_NAME: &str = "Test Case Name";
pub const COLUMN_STEPS: &str = "Steps";
pub const COLUMN_EXPECTED: &str = "Expected Result";
pub const COLUMN_ACTUAL: &str = "Actual Result";
pub const COLUMN_STATUS: &str = "Status";

/// Header labels in column order
pub const HEADER: [&str; 5] = [COLUMN_NAME, COLUMN_STEPS, COLUMN_EXPECTED, COLUMN_ACTUAL, COLUMN_STATUS];

/// Column widths in characters, applied with the header
const COLUMN_WIDTHS: [f64; 5] = [31.25, 46.875, 31.25, 31.25, 15.625];

const COL_NAME: usize = 0;
const COL_ACTUAL: usize = 3;
const COL_STATUS: usize = 4;

/// One test case as stored in the sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportRow {
    pub name: String,
    pub steps: String,
    pub expected: String,
    pub actual: String,
    pub status: String,
}

impl ReportRow {
    pub fn new(name: &str, steps: &str, expected: &str, actual: &str, status: &str) -> Self {
        ReportRow {
            name: name.to_owned(),
            steps: steps.to_owned(),
            expected: expected.to_owned(),
            actual: actual.to_owned(),
            status: status.to_owned(),
        }
    }

    fn values(&self) -> [&str; 5] {
        [self.name.as_str(), self.steps.as_str(), self.expected.as_str(), self.actual.as_str(), self.status.as_str()]
    }

    fn styled_cells(&self) -> Vec<StyledCell> {
        let status = Status::parse(&self.status);
        self.values()
            .iter()
            .enumerate()
            .map(|(col, value)| {
                let style = if col == COL_STATUS { status.style() } else { CellStyle::Body };
                StyledCell::new(*value, style)
            })
            .collect()
    }

    fn from_cells(cells: &[StyledCell]) -> Self {
        let value = |col: usize| cells.get(col).map(|cell| cell.value.to_owned()).unwrap_or_default();
        ReportRow {
            name: value(0),
            steps: value(1),
            expected: value(2),
            actual: value(3),
            status: value(4),
        }
    }

    /// Mapping keyed by the header labels, in column order.
    pub fn to_row(&self) -> Row<String> {
        HEADER.iter().zip(self.values()).map(|(column, value)| (*column, value.to_owned())).collect()
    }
}

/// How a sheet row is interpreted when reading back.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RowKind {
    Header,
    Case,
    Summary,
    Blank,
}

/// Classifies a row by the style of its first cell.
///
/// Case rows written by this crate stay cases even when every field is empty.
/// Sheets written elsewhere carry no styles; their first row is the header.
fn row_kind(index: usize, cells: &[StyledCell]) -> RowKind {
    let Some(first) = cells.first() else {
        return RowKind::Blank;
    };
    match first.style {
        CellStyle::Header => RowKind::Header,
        CellStyle::SummaryLabel => RowKind::Summary,
        CellStyle::Body => RowKind::Case,
        _ if cells.iter().all(|cell| cell.value.is_empty()) => RowKind::Blank,
        CellStyle::Default if index == 0 => RowKind::Header,
        _ => RowKind::Case,
    }
}

/// A test report bound to one sheet of a workbook file.
#[derive(Debug)]
pub struct ReportStore {
    path: PathBuf,
    sheet_index: usize,
    workbook: Workbook,
}

impl ReportStore {
    /// Opens the report at `path` using the sheet named `sheet_name`.
    ///
    /// An existing workbook is loaded with all of its sheets and the sheet is
    /// created when missing. A path that does not exist yet starts an empty
    /// workbook in memory.
    pub fn open(path: impl AsRef<Path>, sheet_name: &str) -> Result<ReportStore, RustyTableError> {
        let path = path.as_ref().to_path_buf();
        let mut workbook = if path.exists() {
            Workbook::open(&path).with_prefix(&format!("Load report '{}'", path.display()))?
        } else {
            Workbook::new()
        };
        let sheet_index = workbook.ensure_sheet(sheet_name);
        info!(path = %path.display(), sheet = sheet_name, "opened report");
        Ok(ReportStore {
            path,
            sheet_index,
            workbook,
        })
    }

    /// Opens the report using the default `Test Cases` sheet.
    pub fn open_default(path: impl AsRef<Path>) -> Result<ReportStore, RustyTableError> {
        ReportStore::open(path, DEFAULT_SHEET_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_name(&self) -> &str {
        self.sheet().name()
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    fn sheet(&self) -> &Worksheet {
        self.workbook.sheet_at(self.sheet_index)
    }

    fn sheet_mut(&mut self) -> &mut Worksheet {
        self.workbook.sheet_at_mut(self.sheet_index)
    }

    /// Appends the header row and sets the column widths.
    ///
    /// The header is appended, not placed: a store that already has rows
    /// gains a second header row.
    pub fn create_header(&mut self) {
        let sheet = self.sheet_mut();
        if !sheet.is_empty() {
            debug!(sheet = sheet.name(), rows = sheet.rows().len(), "header appended below existing rows");
        }
        sheet.push_row(HEADER.iter().map(|label| StyledCell::new(*label, CellStyle::Header)).collect());
        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(col, *width);
        }
    }

    pub fn write_row(&mut self, name: &str, steps: &str, expected: &str, actual: &str, status: &str) {
        self.write(&ReportRow::new(name, steps, expected, actual, status));
    }

    /// Appends the rows in order.
    pub fn write_rows(&mut self, rows: &[ReportRow]) {
        for row in rows {
            self.write(row);
        }
    }

    fn write(&mut self, row: &ReportRow) {
        self.sheet_mut().push_row(row.styled_cells());
    }

    fn case_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.sheet()
            .rows()
            .iter()
            .enumerate()
            .filter(|(index, cells)| row_kind(*index, cells) == RowKind::Case)
            .map(|(index, _)| index)
    }

    /// Data rows keyed by the header labels, header and summary rows excluded.
    pub fn read_rows(&self) -> Vec<Row<String>> {
        self.cases().iter().map(ReportRow::to_row).collect()
    }

    /// Data rows as typed records, in sheet order.
    pub fn cases(&self) -> Vec<ReportRow> {
        let rows = self.sheet().rows();
        self.case_indexes().map(|index| ReportRow::from_cells(&rows[index])).collect()
    }

    /// Overwrites actual result and status of the first case named `name`.
    ///
    /// Returns false, changing nothing, when no case has that exact name.
    pub fn update_row(&mut self, name: &str, actual: &str, status: &str) -> bool {
        let found = self
            .case_indexes()
            .find(|index| self.sheet().rows()[*index].get(COL_NAME).map(|cell| cell.value == name).unwrap_or(false));
        let Some(index) = found else {
            return false;
        };
        let style = Status::parse(status).style();
        let sheet = self.sheet_mut();
        sheet.put(index, COL_ACTUAL, StyledCell::new(actual, CellStyle::Body));
        sheet.put(index, COL_STATUS, StyledCell::new(status, style));
        debug!(case = name, row = index + 1, "updated case");
        true
    }

    /// Outcome counts over the current data rows.
    pub fn summary(&self) -> Summary {
        let rows = self.sheet().rows();
        Summary::tally(
            self.case_indexes()
                .map(|index| rows[index].get(COL_STATUS).map(|cell| cell.value.as_str()).unwrap_or("")),
        )
    }

    /// Appends a summary block after two blank rows and returns its counts.
    ///
    /// Every call appends a new block.
    pub fn append_summary(&mut self) -> Summary {
        let summary = self.summary();
        let sheet = self.sheet_mut();
        sheet.push_blank_row();
        sheet.push_blank_row();
        sheet.push_row(vec![StyledCell::new(SUMMARY_TITLE, CellStyle::SummaryLabel)]);
        for (label, value) in summary.entries() {
            sheet.push_row(vec![
                StyledCell::new(label, CellStyle::SummaryLabel),
                StyledCell::new(value, CellStyle::Default),
            ]);
        }
        info!(%summary, "appended summary");
        summary
    }

    /// Writes the whole workbook to the store's path, replacing the file.
    ///
    /// The in-memory store is left untouched on failure and can be persisted again.
    pub fn persist(&self) -> Result<(), RustyTableError> {
        self.workbook
            .save(&self.path)
            .with_prefix(&format!("Persist report '{}'", self.path.display()))?;
        info!(path = %self.path.display(), sheet = self.sheet_name(), "persisted report");
        Ok(())
    }
}
