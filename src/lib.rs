//! # Rusty Table
//!
//! Tabular data plumbing for a test harness. Three independent components
//! share one ordered [`Table`] shape:
//!
//! - **Delimited files**: [`DelimitedCodec`] parses and writes CSV-like text
//!   with RFC 4180 quoting, including quoted delimiters and newlines.
//! - **Test reports**: [`ReportStore`] keeps test cases in an xlsx sheet with
//!   status-coloured rows, update by case name and a summary block.
//! - **Relational access**: [`Database`] runs parameterized statements on an
//!   embedded DuckDB database through a bounded connection pool and returns
//!   rows as [`Table<Value>`].
//!
//! Every fallible operation returns [`RustyTableError`]; use
//! [`RustyTableError::kind`] to branch on the failure class.
//!
//! ## Example
//!
//! ```no_run
//! use rusty_table::{Database, DelimitedCodec, ReportStore};
//!
//! # fn main() -> Result<(), rusty_table::RustyTableError> {
//! let users = DelimitedCodec::default().read_file("data/users.csv")?;
//!
//! let database = Database::open_in_memory()?;
//! database.execute_batch("CREATE TABLE users (name VARCHAR)")?;
//! for name in users.column_values("name") {
//!     database.execute("INSERT INTO users VALUES (?)", &[name.into()])?;
//! }
//!
//! let mut report = ReportStore::open_default("target/report.xlsx")?;
//! report.create_header();
//! report.write_row("Import users", "Load users.csv", "All rows stored", "", "PASS");
//! report.append_summary();
//! report.persist()?;
//! # Ok(())
//! # }
//! ```
pub mod database;
pub mod delimited;
pub mod error;
pub mod report;
pub mod spreadsheet;
pub mod table;

mod helpers;

pub use database::Database;
pub use database::DatabaseConfig;
pub use database::Value;
pub use delimited::DelimitedCodec;
pub use error::ErrorKind;
pub use error::RustyTableError;
pub use report::ReportRow;
pub use report::ReportStore;
pub use report::Status;
pub use report::Summary;
pub use table::Row;
pub use table::Table;
