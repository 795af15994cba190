use std::time::Duration;

use crate::errors::DbError;
use crate::model::{Dialect, RowSet, Scalar};

pub mod sqlite;

pub use sqlite::SqliteSession;

/// One open database session. All work in a run goes through a single
/// session, one statement at a time.
pub trait SqlSession {
    fn dialect(&self) -> Dialect;

    /// Runs a read-only query and fetches every row. Statements that would
    /// write are refused without running. `time_limit` interrupts the
    /// statement once exceeded.
    fn query(&mut self, sql: &str, time_limit: Option<Duration>) -> Result<RowSet, DbError>;

    /// Runs a statement that returns no rows (DDL, DELETE, ...).
    fn execute(&mut self, sql: &str) -> Result<usize, DbError>;

    /// Prepares `sql` once and runs it for every parameter row, atomically.
    fn execute_many(&mut self, sql: &str, rows: &[Vec<Scalar>]) -> Result<usize, DbError>;
}
