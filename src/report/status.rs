use crate::spreadsheet::CellStyle;
use std::fmt;

/// Outcome of a test case as recorded in the status column.
///
/// Parsing is case-insensitive. Anything unrecognised is kept as `Other`,
/// so the stored text never changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Pass,
    Fail,
    Skip,
    Other(String),
}

impl Status {
    pub fn parse(text: &str) -> Status {
        if text.eq_ignore_ascii_case("PASS") {
            Status::Pass
        } else if text.eq_ignore_ascii_case("FAIL") {
            Status::Fail
        } else if text.eq_ignore_ascii_case("SKIP") {
            Status::Skip
        } else {
            Status::Other(text.to_owned())
        }
    }

    /// Style of the status cell; unknown statuses are bold without fill.
    pub(crate) fn style(&self) -> CellStyle {
        match self {
            Status::Pass => CellStyle::Pass,
            Status::Fail => CellStyle::Fail,
            Status::Skip => CellStyle::Skip,
            Status::Other(_) => CellStyle::Status,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => f.write_str("PASS"),
            Status::Fail => f.write_str("FAIL"),
            Status::Skip => f.write_str("SKIP"),
            Status::Other(text) => f.write_str(text),
        }
    }
}
