//! The ordered table shape shared by the delimited codec, the report store
//! and the relational access layer.

/// One record: an insertion-ordered mapping from column name to cell value.
#[derive(Clone, Debug, PartialEq)]
pub struct Row<V> {
    cells: Vec<(String, V)>,
}

impl<V> Default for Row<V> {
    fn default() -> Self {
        Row { cells: Vec::new() }
    }
}

impl<V> Row<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value`, keeping the original position when the column
    /// is already present. Returns the replaced value.
    pub fn insert(&mut self, column: impl Into<String>, value: V) -> Option<V> {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.cells.push((column, value));
                None
            }
        }
    }

    /// Builder form of [`Row::insert`].
    pub fn with(mut self, column: impl Into<String>, value: V) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&V> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut V> {
        self.cells
            .iter_mut()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Row<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl<V> IntoIterator for Row<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Ordered columns plus ordered rows.
///
/// Rows stored in a table always carry exactly the table's columns, in
/// column order: [`Table::push_row`] projects every incoming row onto the
/// column list, filling missing cells with `V::default()` and dropping keys
/// the table does not know.
#[derive(Clone, Debug, PartialEq)]
pub struct Table<V> {
    columns: Vec<String>,
    rows: Vec<Row<V>>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Table {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl<V> Table<V> {
    /// Creates an empty table. Repeated column names keep their first
    /// occurrence only.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique = Vec::<String>::new();
        for column in columns {
            let column = column.into();
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        Table {
            columns: unique,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row<V>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row<V>] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Row<V>> {
        self.rows
    }

    /// Number of data rows; the header is not counted.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    /// Value of `column` in row `index`, if both exist.
    pub fn cell(&self, index: usize, column: &str) -> Option<&V> {
        self.rows.get(index).and_then(|row| row.get(column))
    }
}

impl<V: Default> Table<V> {
    /// Appends `row` projected onto the existing column list.
    pub fn push_row(&mut self, mut row: Row<V>) {
        let projected = self
            .columns
            .iter()
            .map(|column| {
                let value = row.get_mut(column).map(std::mem::take).unwrap_or_default();
                (column.to_owned(), value)
            })
            .collect();
        self.rows.push(projected);
    }

    /// Appends `row`, first adopting its keys as the column list when the
    /// table has no columns yet.
    pub fn append_row(&mut self, row: Row<V>) {
        if self.columns.is_empty() {
            self.columns = row.columns().map(str::to_owned).collect();
        }
        self.push_row(row);
    }
}

impl<V: Clone + Default> Table<V> {
    /// One value per row for `column`, in row order. Missing values read as
    /// `V::default()`, so an unknown column yields a vector of defaults.
    pub fn column_values(&self, column: &str) -> Vec<V> {
        self.rows
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> Row<String> {
        cells.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_insert_keeps_position_of_existing_key() {
        let mut row = row(&[("a", "1"), ("b", "2")]);
        assert_eq!(row.insert("a", "3".to_string()), Some("1".to_string()));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get("a").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_push_row_pads_and_drops() {
        let mut table = Table::<String>::new(["A", "B", "C"]);
        table.push_row(row(&[("B", "y"), ("Z", "dropped"), ("A", "x")]));

        let stored = &table.rows()[0];
        assert_eq!(stored.columns().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(stored.get("C").map(String::as_str), Some(""));
        assert!(!stored.contains("Z"));
    }

    #[test]
    fn test_append_row_adopts_keys_of_first_row() {
        let mut table = Table::<String>::default();
        table.append_row(row(&[("ID", "1"), ("Name", "John")]));
        table.append_row(row(&[("Name", "Jane"), ("ID", "2"), ("Extra", "x")]));

        assert_eq!(table.columns(), &["ID".to_string(), "Name".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "Name").map(String::as_str), Some("Jane"));
        assert!(table.cell(1, "Extra").is_none());
    }

    #[test]
    fn test_column_values_defaults_missing_column() {
        let mut table = Table::<String>::new(["A"]);
        table.push_row(row(&[("A", "1")]));
        table.push_row(row(&[("A", "2")]));

        assert_eq!(table.column_values("A"), vec!["1", "2"]);
        assert_eq!(table.column_values("missing"), vec!["", ""]);
    }

    #[test]
    fn test_new_deduplicates_columns() {
        let table = Table::<String>::new(["id", "name", "id"]);
        assert_eq!(table.columns().len(), 2);
    }
}
