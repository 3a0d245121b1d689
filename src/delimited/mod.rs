//! # Delimited Table Codec
//!
//! Lossless conversion between delimited text (CSV and friends) and
//! [`Table<String>`](crate::table::Table). One header record, RFC 4180 style
//! quoting, configurable single-character delimiter.
mod codec;
mod file;

pub use codec::DelimitedCodec;
use thiserror::Error;

/// Errors raised while decoding delimited text.
#[derive(Error, Debug)]
pub enum DelimitedError {
    #[error("Delimited file '{0}' not found")]
    FileNotFound(String),

    #[error("Unterminated quoted field opened at line {line}")]
    UnterminatedQuote { line: usize },

    #[error("Duplicate column '{0}' in header")]
    DuplicateColumn(String),

    #[error("Invalid delimiter {0:?}")]
    InvalidDelimiter(char),
}
