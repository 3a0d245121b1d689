use crate::delimited::DelimitedError;
use crate::error::RustyTableError;
use crate::table::Row;
use crate::table::Table;
use std::collections::HashSet;
use tracing::debug;

/// Scanner states for the quote state machine.
#[derive(Copy, Clone, Debug, PartialEq)]
enum State {
    /// Nothing consumed for the current field yet
    FieldStart,
    /// Inside a field that did not start with a quote
    Unquoted,
    /// Inside a quoted field
    Quoted,
    /// A quote was seen inside a quoted field: either an escaped quote or the end
    QuoteInQuoted,
}

/// Reads and writes delimited text using a single-character delimiter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DelimitedCodec {
    delimiter: char,
}

impl Default for DelimitedCodec {
    fn default() -> Self {
        DelimitedCodec { delimiter: ',' }
    }
}

impl DelimitedCodec {
    /// Creates a codec for `delimiter` (e.g. `;`, `|`, `\t`).
    pub fn new(delimiter: char) -> Result<Self, RustyTableError> {
        if matches!(delimiter, '"' | '\r' | '\n') {
            Err(DelimitedError::InvalidDelimiter(delimiter))?
        }
        Ok(DelimitedCodec { delimiter })
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Parses delimited text into a table.
    ///
    /// The first record becomes the column list (names trimmed). Each further
    /// record is matched to the columns by position: missing trailing cells
    /// read as empty strings and surplus cells are dropped.
    pub fn parse(&self, text: &str) -> Result<Table<String>, RustyTableError> {
        let mut records = self.records(text)?.into_iter();
        let header = match records.next() {
            Some(header) => header_names(header)?,
            None => return Ok(Table::default()),
        };

        let mut table = Table::new(header.iter().cloned());
        for record in records {
            let mut values = record.into_iter();
            let row: Row<String> = header
                .iter()
                .map(|column| (column.as_str(), values.next().unwrap_or_default()))
                .collect();
            table.push_row(row);
        }
        debug!(columns = table.columns().len(), rows = table.len(), "parsed delimited text");
        Ok(table)
    }

    /// Parses only the header record, for callers that append to an existing file.
    ///
    /// Empty when the text holds no records.
    pub(crate) fn parse_header(&self, text: &str) -> Result<Vec<String>, RustyTableError> {
        match self.scan(text, 1)?.into_iter().next() {
            Some(header) => header_names(header),
            None => Ok(Vec::new()),
        }
    }

    /// Splits text into raw records with a single left-to-right scan.
    ///
    /// Quoted mode starts only when a field's first character is a quote.
    /// Inside it `""` is a literal quote and the delimiter, CR and LF are
    /// literal text. Fully empty lines are skipped.
    pub(crate) fn records(&self, text: &str) -> Result<Vec<Vec<String>>, RustyTableError> {
        self.scan(text, usize::MAX)
    }

    /// Scans at most `limit` records from the start of `text`.
    fn scan(&self, text: &str, limit: usize) -> Result<Vec<Vec<String>>, RustyTableError> {
        let mut records = Vec::<Vec<String>>::new();
        let mut record = Vec::<String>::new();
        let mut field = String::new();
        let mut state = State::FieldStart;
        let mut quoted_record = false;
        let mut line = 1usize;
        let mut quote_line = 1usize;

        let mut chars = text.chars().peekable();
        while let Some(character) = chars.next() {
            match (state, character) {
                (State::Quoted, '"') => state = State::QuoteInQuoted,
                (State::Quoted, _) => {
                    if character == '\n' {
                        line += 1;
                    }
                    field.push(character);
                }
                (State::QuoteInQuoted, '"') => {
                    field.push('"');
                    state = State::Quoted;
                }
                (State::FieldStart, '"') => {
                    state = State::Quoted;
                    quoted_record = true;
                    quote_line = line;
                }
                (_, _) if character == self.delimiter => {
                    record.push(std::mem::take(&mut field));
                    state = State::FieldStart;
                }
                (_, '\r') if chars.peek() == Some(&'\n') => (),
                (_, '\n') => {
                    line += 1;
                    record.push(std::mem::take(&mut field));
                    push_record(&mut records, std::mem::take(&mut record), quoted_record);
                    if records.len() >= limit {
                        return Ok(records);
                    }
                    quoted_record = false;
                    state = State::FieldStart;
                }
                (_, _) => {
                    field.push(character);
                    state = State::Unquoted;
                }
            }
        }

        if state == State::Quoted {
            Err(DelimitedError::UnterminatedQuote { line: quote_line })?
        }
        if !record.is_empty() || !field.is_empty() || quoted_record {
            record.push(field);
            push_record(&mut records, record, quoted_record);
        }
        Ok(records)
    }

    /// Serializes a table: the header line, then one line per row, each
    /// terminated by LF.
    pub fn serialize(&self, table: &Table<String>) -> String {
        let mut text = String::new();
        self.write_line(&mut text, table.columns().iter().map(String::as_str));
        for row in table.rows() {
            self.write_line(
                &mut text,
                table.columns().iter().map(|column| row.get(column).map(String::as_str).unwrap_or("")),
            );
        }
        text
    }

    /// Appends one record to `text`.
    pub(crate) fn write_line<'a>(&self, text: &mut String, values: impl Iterator<Item = &'a str>) {
        let values: Vec<&str> = values.collect();
        if let [value] = values.as_slice() {
            if value.is_empty() {
                // A lone empty cell would otherwise read back as a skipped blank line
                text.push_str("\"\"\n");
                return;
            }
        }
        for (index, value) in values.iter().enumerate() {
            if index > 0 {
                text.push(self.delimiter);
            }
            text.push_str(&self.escape(value));
        }
        text.push('\n');
    }

    /// Wraps `value` in quotes (doubling inner quotes) when it contains the
    /// delimiter, a quote or a line break.
    pub fn escape(&self, value: &str) -> String {
        if value.contains(|c| c == self.delimiter || c == '"' || c == '\n' || c == '\r') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_owned()
        }
    }
}

/// Keeps a record unless it came from a blank line.
fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>, quoted: bool) {
    let is_blank = !quoted && record.len() == 1 && record[0].is_empty();
    if !is_blank {
        records.push(record);
    }
}

/// Trims header names and rejects duplicates.
fn header_names(record: Vec<String>) -> Result<Vec<String>, RustyTableError> {
    let header: Vec<String> = record.into_iter().map(|name| name.trim().to_owned()).collect();
    let mut seen = HashSet::<&str>::new();
    for name in &header {
        if !seen.insert(name.as_str()) {
            Err(DelimitedError::DuplicateColumn(name.to_owned()))?
        }
    }
    Ok(header)
}
