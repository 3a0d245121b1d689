//! File-level helpers over [`DelimitedCodec`].
use crate::delimited::DelimitedCodec;
use crate::delimited::DelimitedError;
use crate::error::ResultMessage;
use crate::error::RustyTableError;
use crate::table::Row;
use crate::table::Table;
use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use tracing::debug;

impl DelimitedCodec {
    /// Reads and parses the file at `path`.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Table<String>, RustyTableError> {
        let text = read_text(path.as_ref())?;
        self.parse(&text)
    }

    /// Reads raw positional records, optionally without the header record.
    /// Records keep their own length: no padding or truncation is applied.
    pub fn read_records(&self, path: impl AsRef<Path>, skip_header: bool) -> Result<Vec<Vec<String>>, RustyTableError> {
        let text = read_text(path.as_ref())?;
        let mut records = self.records(&text)?;
        if skip_header && !records.is_empty() {
            records.remove(0);
        }
        Ok(records)
    }

    /// Serializes `table` to `path`, creating parent directories and
    /// replacing any existing file.
    pub fn write_file(&self, path: impl AsRef<Path>, table: &Table<String>) -> Result<(), RustyTableError> {
        let path = path.as_ref();
        create_parent_dirs(path)?;
        fs::write(path, self.serialize(table)).map_err(RustyTableError::from).with_prefix(&path.display().to_string())?;
        debug!(path = %path.display(), rows = table.len(), "wrote delimited file");
        Ok(())
    }

    /// Appends one row to the file at `path`.
    ///
    /// A missing or empty file gets the row's own keys as header first.
    /// Otherwise the row is projected onto the existing header: keys the
    /// header does not know are dropped and missing ones are written empty.
    pub fn append_row_to_file(&self, path: impl AsRef<Path>, row: &Row<String>) -> Result<(), RustyTableError> {
        let path = path.as_ref();
        let mut text = String::new();
        let mut header = match fs::read_to_string(path) {
            Ok(existing) => {
                if !existing.is_empty() && !existing.ends_with('\n') {
                    text.push('\n');
                }
                self.parse_header(&existing)?
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                create_parent_dirs(path)?;
                Vec::new()
            }
            Err(error) => Err(error)?,
        };
        if header.is_empty() {
            header = row.columns().map(str::to_owned).collect();
            self.write_line(&mut text, header.iter().map(String::as_str));
        }

        self.write_line(
            &mut text,
            header.iter().map(|column| row.get(column).map(String::as_str).unwrap_or("")),
        );
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(text.as_bytes())?;
        debug!(path = %path.display(), columns = header.len(), "appended delimited row");
        Ok(())
    }

    /// Values of `column` for every data row of the file.
    pub fn column_values(&self, path: impl AsRef<Path>, column: &str) -> Result<Vec<String>, RustyTableError> {
        Ok(self.read_file(path)?.column_values(column))
    }

    /// Number of data rows in the file, header excluded.
    pub fn count_rows(&self, path: impl AsRef<Path>) -> Result<usize, RustyTableError> {
        Ok(self.read_file(path)?.len())
    }
}

fn read_text(path: &Path) -> Result<String, RustyTableError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            Err(DelimitedError::FileNotFound(path.display().to_string()))?
        }
        Err(error) => Err(error)?,
    }
}

fn create_parent_dirs(path: &Path) -> Result<(), RustyTableError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind as TableErrorKind;

    const PRODUCTS: &str = "ProductName,Price,Category,InStock\n\
                            Blue Top,500,Women,true\n\
                            Men Tshirt,400,Men,true\n\
                            Sleeveless Dress,1000,Women,false\n\
                            Printed Dress,600,Women,true\n\
                            Denim Jeans,800,Men,true\n";

    fn row(cells: &[(&str, &str)]) -> Row<String> {
        cells.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_column_values_and_count_rows() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("products.csv");
        fs::write(&path, PRODUCTS).unwrap();

        let codec = DelimitedCodec::default();
        let names = codec.column_values(&path, "ProductName").unwrap();
        assert_eq!(names.len(), 5);
        assert_eq!(names[0], "Blue Top");
        assert_eq!(names[4], "Denim Jeans");
        assert_eq!(codec.count_rows(&path).unwrap(), 5);
    }

    #[test]
    fn test_read_records_skips_header() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("products.csv");
        fs::write(&path, PRODUCTS).unwrap();

        let records = DelimitedCodec::default().read_records(&path, true).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0], vec!["Blue Top", "500", "Women", "true"]);
        assert_eq!(records[1][0], "Men Tshirt");
    }

    #[test]
    fn test_write_creates_directories_and_reads_back() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("nested").join("output.csv");
        let codec = DelimitedCodec::default();

        let mut table = Table::new(["TestCase", "Username"]);
        table.push_row(row(&[("TestCase", "Login Valid User"), ("Username", "test@example.com")]));
        table.push_row(row(&[("TestCase", "Login Invalid User"), ("Username", "invalid@example.com")]));
        codec.write_file(&path, &table).unwrap();

        assert_eq!(codec.read_file(&path).unwrap(), table);
    }

    #[test]
    fn test_append_row_creates_file_from_row_keys() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("append_test.csv");
        let codec = DelimitedCodec::default();

        codec.append_row_to_file(&path, &row(&[("ID", "1"), ("Name", "John")])).unwrap();
        codec.append_row_to_file(&path, &row(&[("Name", "Jane"), ("ID", "2"), ("Unknown", "x")])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ID,Name\n1,John\n2,Jane\n");
        let table = codec.read_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "Name").unwrap(), "Jane");
    }

    #[test]
    fn test_append_row_to_empty_file_writes_header() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        let codec = DelimitedCodec::default();

        codec.append_row_to_file(&path, &row(&[("ID", "1"), ("Name", "John")])).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "ID,Name\n1,John\n");
        assert_eq!(codec.count_rows(&path).unwrap(), 1);
    }

    #[test]
    fn test_append_row_with_literal_quote_in_header() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("quotes.csv");
        fs::write(&path, "A\"x,B\n\"1\n2\",3\n").unwrap();
        let codec = DelimitedCodec::default();

        codec.append_row_to_file(&path, &row(&[("B", "4")])).unwrap();
        let table = codec.read_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "B").unwrap(), "4");
        assert_eq!(table.cell(1, "A\"x").unwrap(), "");
    }

    #[test]
    fn test_append_row_to_file_without_trailing_newline() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("data.csv");
        fs::write(&path, "col1,col2\n1,2").unwrap();

        DelimitedCodec::default().append_row_to_file(&path, &row(&[("col2", "3, 4")])).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "col1,col2\n1,2\n,\"3, 4\"\n");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let tempdir = tempfile::tempdir().unwrap();
        let error = DelimitedCodec::default().read_file(tempdir.path().join("absent.csv")).unwrap_err();
        assert_eq!(error.kind(), TableErrorKind::NotFound);
    }
}
