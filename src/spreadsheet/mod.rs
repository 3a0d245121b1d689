//! # Spreadsheet Container
//!
//! An in-memory workbook of named worksheets, persisted as an Office Open XML
//! (`.xlsx`) package. Cells are strings with a presentational style; no
//! formulas, number formats or merged ranges are modelled.
pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod style;
pub(crate) mod xlsx;

pub use cell::StyledCell;
pub use sheet::Worksheet;
pub use style::CellStyle;

use crate::error::RustyTableError;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing '{0}' in spreadsheet package")]
    FileError(String),

    #[error("Invalid cell reference '{0}'")]
    ReferenceError(String),
}

/// Ordered collection of worksheets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every worksheet of the xlsx file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Workbook, RustyTableError> {
        let sheets = xlsx::read_workbook(path.as_ref())?;
        Ok(Workbook { sheets })
    }

    /// Writes the whole workbook to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RustyTableError> {
        xlsx::write_workbook(path.as_ref(), &self.sheets)
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// Index of the sheet named `name` (ASCII case-insensitive).
    pub fn position(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|sheet| sheet.name.eq_ignore_ascii_case(name))
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.position(name).map(|index| &self.sheets[index])
    }

    /// Returns the index of the sheet named `name`, appending an empty one when absent.
    pub fn ensure_sheet(&mut self, name: &str) -> usize {
        match self.position(name) {
            Some(index) => index,
            None => {
                self.sheets.push(Worksheet::new(name));
                self.sheets.len() - 1
            }
        }
    }

    pub(crate) fn sheet_at(&self, index: usize) -> &Worksheet {
        &self.sheets[index]
    }

    pub(crate) fn sheet_at_mut(&mut self, index: usize) -> &mut Worksheet {
        &mut self.sheets[index]
    }
}
