use regex::Regex;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::db::SqlSession;
use crate::model::ExecutionResult;

pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN";

fn vendor_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([A-Za-z]{2,}-\d+)").expect("static regex"))
}

/// Leading error-code token of a database error message.
///
/// `ORA-00933: SQL command not properly ended` yields `ORA-00933`. Messages
/// without a `PREFIX-DIGITS` code fall back to the text before the first `-`,
/// and messages with no `-` at all yield `UNKNOWN`.
pub fn error_code(message: &str) -> String {
    if let Some(c) = vendor_code_re().captures(message) {
        return c[1].to_string();
    }
    match message.split_once('-') {
        Some((head, _)) if !head.trim().is_empty() => head.trim().to_string(),
        _ => UNKNOWN_ERROR_CODE.to_string(),
    }
}

/// Runs `sql` and captures either every row or the error. Never fails.
pub fn execute(
    session: &mut dyn SqlSession,
    sql: &str,
    time_limit: Option<Duration>,
) -> ExecutionResult {
    let start = Instant::now();
    let outcome = session.query(sql, time_limit);
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok(set) => ExecutionResult::success(set, duration_ms),
        Err(e) => {
            let code = error_code(&e.message);
            ExecutionResult::error(e.message, code, duration_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteSession;
    use crate::model::ExecutionStatus;

    #[test]
    fn oracle_code_is_extracted_whole() {
        assert_eq!(
            error_code("ORA-00933: SQL command not properly ended"),
            "ORA-00933"
        );
        assert_eq!(
            error_code("ORA-00904: \"C_CUSTKEY\": invalid identifier"),
            "ORA-00904"
        );
        assert_eq!(error_code("DPY-4011: the database or network closed the connection"), "DPY-4011");
    }

    #[test]
    fn message_without_dash_is_unknown() {
        assert_eq!(error_code("no such column: C_CUSTKEY"), "UNKNOWN");
        assert_eq!(error_code(""), "UNKNOWN");
        assert_eq!(error_code("- leading dash"), "UNKNOWN");
    }

    #[test]
    fn other_dashes_split_at_first_dash() {
        assert_eq!(error_code("near \"FETCH\": syntax error - line 1"), "near \"FETCH\": syntax error");
    }

    #[test]
    fn execute_captures_rows_and_errors() {
        let mut s = SqliteSession::memory().unwrap();
        let ok = execute(&mut s, "SELECT 1 UNION ALL SELECT 2", None);
        assert_eq!(ok.status, ExecutionStatus::Success);
        assert_eq!(ok.row_count, 2);

        let err = execute(&mut s, "SELECT C_CUSTKEY FROM CUSTOMER", None);
        assert_eq!(err.status, ExecutionStatus::Error);
        assert_eq!(err.row_count, 0);
        assert!(err.error_message.as_deref().unwrap().contains("no such table"));
        assert_eq!(err.error_code.as_deref(), Some("UNKNOWN"));
    }
}
