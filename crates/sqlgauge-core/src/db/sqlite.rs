use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::Path;
use std::time::{Duration, Instant};

use super::SqlSession;
use crate::errors::DbError;
use crate::model::{Dialect, RowSet, Scalar};

/// Opcodes between progress-handler checks.
const PROGRESS_OPS: i32 = 1000;

pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    fn fetch(&self, sql: &str) -> Result<RowSet, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        if !stmt.readonly() {
            return Err(DbError::new(
                "refusing to run a statement that writes to the database; only queries are evaluated",
            ));
        }
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(scalar_from_ref(row.get_ref(i)?));
            }
            rows.push(values);
        }
        Ok(RowSet { columns, rows })
    }
}

impl SqlSession for SqliteSession {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn query(&mut self, sql: &str, time_limit: Option<Duration>) -> Result<RowSet, DbError> {
        let Some(limit) = time_limit else {
            return self.fetch(sql);
        };

        let deadline = Instant::now() + limit;
        self.conn
            .progress_handler(PROGRESS_OPS, Some(move || Instant::now() >= deadline));
        let result = self.fetch(sql);
        self.conn.progress_handler(PROGRESS_OPS, None::<fn() -> bool>);

        result.map_err(|e| {
            if Instant::now() >= deadline {
                DbError::new(format!(
                    "statement time limit of {:?} exceeded: {}",
                    limit, e.message
                ))
            } else {
                e
            }
        })
    }

    fn execute(&mut self, sql: &str) -> Result<usize, DbError> {
        Ok(self.conn.execute(sql, [])?)
    }

    fn execute_many(&mut self, sql: &str, rows: &[Vec<Scalar>]) -> Result<usize, DbError> {
        let tx = self.conn.transaction()?;
        let mut n = 0;
        {
            let mut stmt = tx.prepare(sql)?;
            for row in rows {
                n += stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(n)
    }
}

fn scalar_from_ref(v: ValueRef<'_>) -> Scalar {
    match v {
        ValueRef::Null => Scalar::Null,
        ValueRef::Integer(i) => Scalar::Integer(i),
        ValueRef::Real(f) => Scalar::Real(f),
        ValueRef::Text(t) => Scalar::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Scalar::Blob(b.to_vec()),
    }
}

impl ToSql for Scalar {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Scalar::Null => ToSqlOutput::Owned(Value::Null),
            Scalar::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Scalar::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Scalar::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Scalar::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_returns_columns_and_typed_values() {
        let mut s = SqliteSession::memory().unwrap();
        s.execute("CREATE TABLE t (a INTEGER, b TEXT, c REAL)").unwrap();
        s.execute_many(
            "INSERT INTO t VALUES (?1, ?2, ?3)",
            &[
                vec![Scalar::Integer(1), Scalar::from("x"), Scalar::Real(1.5)],
                vec![Scalar::Integer(2), Scalar::Null, Scalar::Real(2.0)],
            ],
        )
        .unwrap();

        let set = s.query("SELECT a, b, c FROM t ORDER BY a", None).unwrap();
        assert_eq!(set.columns, vec!["a", "b", "c"]);
        assert_eq!(set.rows.len(), 2);
        assert_eq!(set.rows[1][1], Scalar::Null);
        assert_eq!(set.rows[0][2], Scalar::Real(1.5));
    }

    #[test]
    fn errors_carry_the_engine_message() {
        let mut s = SqliteSession::memory().unwrap();
        let err = s.query("SELECT nope FROM missing", None).unwrap_err();
        assert!(err.message.contains("no such table"));
    }

    #[test]
    fn writes_are_rejected_and_leave_data_intact() {
        let mut s = SqliteSession::memory().unwrap();
        s.execute("CREATE TABLE t (a INTEGER)").unwrap();
        s.execute("INSERT INTO t VALUES (1), (2), (3)").unwrap();

        for sql in ["DELETE FROM t", "UPDATE t SET a = 0", "DROP TABLE t", "INSERT INTO t VALUES (4)"] {
            let err = s.query(sql, None).unwrap_err();
            assert!(err.message.contains("writes to the database"), "{}: {}", sql, err.message);
        }
        let set = s.query("SELECT COUNT(*) FROM t", None).unwrap();
        assert_eq!(set.rows, vec![vec![Scalar::Integer(3)]]);
    }

    #[test]
    fn time_limit_interrupts_long_statements() {
        let mut s = SqliteSession::memory().unwrap();
        let sql = "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c) SELECT COUNT(*) FROM c";
        let err = s.query(sql, Some(Duration::from_millis(50))).unwrap_err();
        assert!(err.message.contains("time limit of 50ms"), "{}", err.message);

        // handler removed afterwards
        let set = s.query("SELECT 1", None).unwrap();
        assert_eq!(set.rows.len(), 1);
    }
}
