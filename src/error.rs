use thiserror::Error;

/// Broad classification of a failure, independent of which component raised it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source file, archive part or sheet is absent where it is required
    NotFound,
    /// Input cannot be decoded (unterminated quote, broken xml)
    MalformedInput,
    /// Table shape is inconsistent (duplicate header names)
    SchemaMismatch,
    /// Pool cannot establish or hand out a connection
    ConnectionFailure,
    /// Backend rejected a statement
    QueryFailure,
    /// Operation attempted after the resource was closed
    ClosedResource,
    /// Invalid configuration values
    Config,
    /// Any other I/O level failure
    Io,
}

/// Main error type for the crate.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub enum RustyTableError {
    #[error("{message}: {source}")]
    WithContextError {
        message: String,
        source: Box<RustyTableError>,
    },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    YamlError(#[from] serde_yaml::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Component errors
    #[error("{0}")]
    DelimitedError(#[from] crate::delimited::DelimitedError),

    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    DatabaseError(#[from] crate::database::DatabaseError),
}

impl RustyTableError {
    /// Classifies the error for callers that branch on failure type.
    pub fn kind(&self) -> ErrorKind {
        use crate::database::DatabaseError;
        use crate::delimited::DelimitedError;
        use crate::spreadsheet::SpreadsheetError;

        match self {
            RustyTableError::IoError(error) if error.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            RustyTableError::IoError(_) => ErrorKind::Io,
            RustyTableError::WithContextError { source, .. } => source.kind(),
            RustyTableError::ZipError(zip::result::ZipError::FileNotFound) => ErrorKind::NotFound,
            RustyTableError::ZipError(zip::result::ZipError::Io(error)) => match error.kind() {
                std::io::ErrorKind::NotFound => ErrorKind::NotFound,
                _ => ErrorKind::Io,
            },
            RustyTableError::ParseIntError(_)
            | RustyTableError::ZipError(_)
            | RustyTableError::XmlError(_)
            | RustyTableError::XmlEncodingError(_)
            | RustyTableError::XmlAttributeError(_)
            | RustyTableError::XmlHelperError(_) => ErrorKind::MalformedInput,
            RustyTableError::YamlError(_) => ErrorKind::Config,
            RustyTableError::DelimitedError(error) => match error {
                DelimitedError::FileNotFound(_) => ErrorKind::NotFound,
                DelimitedError::UnterminatedQuote { .. } => ErrorKind::MalformedInput,
                DelimitedError::DuplicateColumn(_) => ErrorKind::SchemaMismatch,
                DelimitedError::InvalidDelimiter(_) => ErrorKind::Config,
            },
            RustyTableError::SpreadsheetError(error) => match error {
                SpreadsheetError::FileError(_) => ErrorKind::NotFound,
                SpreadsheetError::ReferenceError(_) => ErrorKind::MalformedInput,
            },
            RustyTableError::DatabaseError(error) => match error {
                DatabaseError::Closed => ErrorKind::ClosedResource,
                DatabaseError::ConnectionFailure(_)
                | DatabaseError::PoolExhausted(_)
                | DatabaseError::UnsupportedDriver(_) => ErrorKind::ConnectionFailure,
                DatabaseError::QueryFailure(_) => ErrorKind::QueryFailure,
                DatabaseError::InvalidConfig(_) => ErrorKind::Config,
            },
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyTableError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| match e {
            RustyTableError::IoError(error) => {
                RustyTableError::IoError(std::io::Error::new(error.kind(), format!("{}: {}", message, error)))
            }
            other => RustyTableError::WithContextError {
                message: message.to_owned(),
                source: Box::new(other),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimited::DelimitedError;

    #[test]
    fn test_prefix_keeps_kind() {
        let result: Result<(), RustyTableError> = Err(DelimitedError::DuplicateColumn("id".to_owned()).into());
        let error = result.with_prefix("Load table").with_prefix("Import").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SchemaMismatch);
        assert!(error.to_string().starts_with("Import: Load table: "));

        let result: Result<(), RustyTableError> = Err(std::io::Error::from(std::io::ErrorKind::NotFound).into());
        assert_eq!(result.with_prefix("Read").unwrap_err().kind(), ErrorKind::NotFound);
    }
}
