//! # Pooled Relational Access
//!
//! Parameterized statements against an embedded DuckDB database through a
//! bounded connection pool. Every call checks a connection out for its own
//! duration only; query results are fully materialized into a
//! [`Table<Value>`](crate::table::Table) before the connection goes back.
//!
//! Column labels are passed through exactly as the backend reports them.
mod config;
mod pool;
mod value;

pub use config::DatabaseConfig;
pub use config::Target;
pub use config::DRIVER_DUCKDB;
pub use config::MEMORY_ADDRESS;
pub use value::Value;

use crate::error::RustyTableError;
use crate::table::Row;
use crate::table::Table;
use duckdb::params_from_iter;
use pool::ConnectionPool;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database is closed")]
    Closed,

    #[error("Connection failed: {0}")]
    ConnectionFailure(String),

    #[error("No connection available within {0:?}, pool exhausted")]
    PoolExhausted(Duration),

    #[error("Unsupported driver '{0}'")]
    UnsupportedDriver(String),

    #[error("Query failed: {0}")]
    QueryFailure(#[from] duckdb::Error),

    #[error("Invalid database config: {0}")]
    InvalidConfig(String),
}

/// Handle to a pooled database, safe to share between threads.
pub struct Database {
    config: DatabaseConfig,
    pool: ConnectionPool,
}

impl Database {
    /// Validates the config and opens the pool.
    pub fn new(config: DatabaseConfig) -> Result<Database, RustyTableError> {
        let pool = ConnectionPool::open(&config)?;
        Ok(Database { config, pool })
    }

    /// Private in-memory database with the default pool size.
    pub fn open_in_memory() -> Result<Database, RustyTableError> {
        Database::new(DatabaseConfig::in_memory())
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Runs one statement and returns the number of affected rows.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize, RustyTableError> {
        let connection = self.pool.checkout()?;
        let count = connection
            .execute(sql, params_from_iter(params.iter()))
            .map_err(DatabaseError::QueryFailure)?;
        debug!(sql, count, "executed statement");
        Ok(count)
    }

    /// Runs several `;` separated statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<(), RustyTableError> {
        let connection = self.pool.checkout()?;
        connection.execute_batch(sql).map_err(DatabaseError::QueryFailure)?;
        Ok(())
    }

    /// Runs a query and collects every row, keyed by result column label.
    ///
    /// A label repeated in the result keeps its first position and the value
    /// of its last occurrence.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Table<Value>, RustyTableError> {
        let connection = self.pool.checkout()?;
        let table = collect_rows(&connection, sql, params)?;
        debug!(sql, rows = table.len(), "executed query");
        Ok(table)
    }

    /// First column of the first row.
    ///
    /// `None` when the query yields no rows, `Some(Value::Null)` for a null cell.
    pub fn query_scalar(&self, sql: &str, params: &[Value]) -> Result<Option<Value>, RustyTableError> {
        let connection = self.pool.checkout()?;
        let mut statement = connection.prepare(sql).map_err(DatabaseError::QueryFailure)?;
        let mut rows = statement
            .query(params_from_iter(params.iter()))
            .map_err(DatabaseError::QueryFailure)?;
        let value = match rows.next().map_err(DatabaseError::QueryFailure)? {
            Some(row) => Some(Value::from(row.get::<_, duckdb::types::Value>(0).map_err(DatabaseError::QueryFailure)?)),
            None => None,
        };
        Ok(value)
    }

    /// Closes the pool. Every later call fails with a closed error.
    pub fn close(&self) {
        self.pool.close();
    }

    pub fn is_open(&self) -> bool {
        self.pool.is_open()
    }

    /// Pooled connections currently open, idle or checked out.
    pub fn connections(&self) -> usize {
        self.pool.size()
    }
}

fn collect_rows(connection: &duckdb::Connection, sql: &str, params: &[Value]) -> Result<Table<Value>, DatabaseError> {
    let mut statement = connection.prepare(sql)?;
    let mut rows = statement.query(params_from_iter(params.iter()))?;
    let columns = rows.as_ref().map(|statement| statement.column_names()).unwrap_or_default();

    let mut table = Table::new(columns.iter().cloned());
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (index, column) in columns.iter().enumerate() {
            let value: duckdb::types::Value = row.get(index)?;
            record.insert(column.to_owned(), Value::from(value));
        }
        table.push_row(record);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use anyhow::Result;
    use chrono::NaiveDate;

    fn shop() -> Result<Database> {
        let database = Database::new(DatabaseConfig::in_memory().with_pool_size(2))?;
        database.execute_batch(
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, name VARCHAR NOT NULL, vip BOOLEAN, joined TIMESTAMP);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER REFERENCES customers(id), total DOUBLE);",
        )?;
        Ok(database)
    }

    #[test]
    fn database_crud() -> Result<()> {
        let database = shop()?;
        let joined = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 30, 0).unwrap();
        let inserted = database.execute(
            "INSERT INTO customers VALUES (?, ?, ?, ?), (?, ?, ?, ?)",
            &[1.into(), "Ada".into(), true.into(), joined.into(), 2.into(), "Linus".into(), Value::Null, Value::Null],
        )?;
        assert_eq!(inserted, 2);

        let table = database.query("SELECT id, name, vip, joined FROM customers ORDER BY id", &[])?;
        assert_eq!(table.columns(), ["id", "name", "vip", "joined"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "id"), Some(&Value::Integer(1)));
        assert_eq!(table.cell(0, "name"), Some(&Value::Text("Ada".to_owned())));
        assert_eq!(table.cell(0, "vip"), Some(&Value::Boolean(true)));
        assert_eq!(table.cell(0, "joined"), Some(&Value::Timestamp(joined)));
        assert_eq!(table.cell(1, "vip"), Some(&Value::Null));

        let updated = database.execute("UPDATE customers SET name = ? WHERE id = ?", &["Grace".into(), 2.into()])?;
        assert_eq!(updated, 1);
        assert_eq!(
            database.query_scalar("SELECT name FROM customers WHERE id = ?", &[2.into()])?,
            Some(Value::Text("Grace".to_owned()))
        );

        let deleted = database.execute("DELETE FROM customers WHERE id = ?", &[2.into()])?;
        assert_eq!(deleted, 1);
        assert_eq!(database.query_scalar("SELECT count(*) FROM customers", &[])?, Some(Value::Integer(1)));
        Ok(())
    }

    #[test]
    fn database_foreign_key_violation() -> Result<()> {
        let database = shop()?;
        let error = database
            .execute("INSERT INTO orders VALUES (?, ?, ?)", &[1.into(), 99.into(), 10.5.into()])
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::QueryFailure);
        assert_eq!(database.query_scalar("SELECT count(*) FROM orders", &[])?, Some(Value::Integer(0)));

        let error = database.query("SELECT * FROM missing_table", &[]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::QueryFailure);
        Ok(())
    }

    #[test]
    fn database_timestamp_parameter_keeps_type() -> Result<()> {
        let database = shop()?;
        let timestamp = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(23, 0, 0).unwrap();

        assert_eq!(database.query_scalar("SELECT ?", &[timestamp.into()])?, Some(Value::Timestamp(timestamp)));
        let next_day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(23, 0, 0).unwrap();
        assert_eq!(
            database.query_scalar("SELECT ? + INTERVAL 1 DAY", &[timestamp.into()])?,
            Some(Value::Timestamp(next_day))
        );
        Ok(())
    }

    #[test]
    fn database_scalar_absent_versus_null() -> Result<()> {
        let database = shop()?;
        database.execute("INSERT INTO customers (id, name) VALUES (?, ?)", &[1.into(), "Ada".into()])?;

        assert_eq!(database.query_scalar("SELECT vip FROM customers WHERE id = ?", &[9.into()])?, None);
        assert_eq!(database.query_scalar("SELECT vip FROM customers WHERE id = ?", &[1.into()])?, Some(Value::Null));
        Ok(())
    }

    #[test]
    fn database_label_casing_passes_through() -> Result<()> {
        let database = shop()?;
        let table = database.query("SELECT 1 AS Total, 'x' AS lower_label", &[])?;
        assert_eq!(table.columns(), ["Total", "lower_label"]);
        assert_eq!(table.cell(0, "Total"), Some(&Value::Integer(1)));
        assert_eq!(table.cell(0, "total"), None);
        Ok(())
    }

    #[test]
    fn database_closed() -> Result<()> {
        let database = shop()?;
        assert!(database.is_open());
        assert_eq!(database.connections(), 1);
        database.close();
        database.close();
        assert!(!database.is_open());

        let error = database.execute("DELETE FROM orders", &[]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ClosedResource);
        let error = database.query("SELECT 1", &[]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ClosedResource);
        let error = database.query_scalar("SELECT 1", &[]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ClosedResource);
        Ok(())
    }

    #[test]
    fn database_shared_between_threads() -> Result<()> {
        let database = shop()?;
        database.execute("INSERT INTO customers (id, name) VALUES (1, 'Ada')", &[])?;

        std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8i32)
                .map(|worker| {
                    let database = &database;
                    scope.spawn(move || {
                        database.execute(
                            "INSERT INTO orders VALUES (?, 1, ?)",
                            &[Value::from(worker + 1), Value::from(f64::from(worker))],
                        )?;
                        database.query_scalar("SELECT count(*) FROM customers", &[])
                    })
                })
                .collect();
            for worker in workers {
                let count = worker.join().unwrap().unwrap();
                assert_eq!(count, Some(Value::Integer(1)));
            }
        });

        assert_eq!(database.query_scalar("SELECT count(*) FROM orders", &[])?, Some(Value::Integer(8)));
        Ok(())
    }

    #[test]
    fn database_file_target() -> Result<()> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("harness.duckdb");
        {
            let database = Database::new(DatabaseConfig::file(&path))?;
            database.execute_batch("CREATE TABLE t (v VARCHAR); INSERT INTO t VALUES ('kept');")?;
        }
        let database = Database::new(DatabaseConfig::file(&path))?;
        assert_eq!(database.query_scalar("SELECT v FROM t", &[])?, Some(Value::Text("kept".to_owned())));
        Ok(())
    }

    #[test]
    fn database_unsupported_driver() {
        let config = DatabaseConfig {
            driver: "mysql".to_owned(),
            ..DatabaseConfig::default()
        };
        let error = Database::new(config).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::ConnectionFailure);
    }
}
