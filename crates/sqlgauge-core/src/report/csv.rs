//! One flat row per evaluated query.

use serde::Serialize;
use std::path::Path;

use crate::model::QueryRecord;

#[derive(Debug, Serialize)]
pub struct CsvRow<'a> {
    pub query_id: i64,
    pub complexity: &'static str,
    pub strategy: &'static str,
    pub question: &'a str,
    pub scenario: &'static str,
    pub gt_status: &'static str,
    pub ai_status: &'static str,
    pub gt_rows: usize,
    pub ai_rows: usize,
    pub results_match: bool,
    pub row_count_match: bool,
    pub semantic_match: bool,
    pub heuristic: &'a str,
    pub generation_ms: f64,
    pub ai_execution_ms: f64,
    pub gt_execution_ms: f64,
    pub total_ms: f64,
    pub overhead_ratio: f64,
    pub error_code: &'a str,
    pub error_message: &'a str,
    pub ground_truth_sql: &'a str,
    pub generated_sql: &'a str,
}

impl<'a> From<&'a QueryRecord> for CsvRow<'a> {
    fn from(r: &'a QueryRecord) -> Self {
        let c = &r.comparison;
        // The AI side is the interesting failure; fall back to the ground truth.
        let failed = if c.ai_result.is_success() {
            &c.gt_result
        } else {
            &c.ai_result
        };
        CsvRow {
            query_id: r.query.id,
            complexity: r.query.complexity.as_str(),
            strategy: r.strategy.as_str(),
            question: &r.query.question,
            scenario: c.scenario.as_str(),
            gt_status: c.gt_result.status.as_str(),
            ai_status: c.ai_result.status.as_str(),
            gt_rows: c.gt_result.row_count,
            ai_rows: c.ai_result.row_count,
            results_match: c.results_match,
            row_count_match: c.row_count_match,
            semantic_match: c.semantic_match,
            heuristic: c.heuristic.as_deref().unwrap_or(""),
            generation_ms: round2(r.timing.generation_ms),
            ai_execution_ms: round2(r.timing.ai_execution_ms),
            gt_execution_ms: round2(r.timing.gt_execution_ms),
            total_ms: round2(r.timing.total_ms()),
            overhead_ratio: round2(r.timing.overhead_ratio()),
            error_code: failed.error_code.as_deref().unwrap_or(""),
            error_message: failed.error_message.as_deref().unwrap_or(""),
            ground_truth_sql: &r.query.ground_truth_sql,
            generated_sql: r.generated_sql.as_deref().unwrap_or(""),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn write_csv(records: &[QueryRecord], path: &Path) -> anyhow::Result<()> {
    let mut w = ::csv::Writer::from_path(path)?;
    for r in records {
        w.serialize(CsvRow::from(r))?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Complexity, ComparisonRecord, ExecutionStatus, ExecutionSummary, QueryTiming, Scenario,
        TestQuery,
    };
    use crate::prompt::PromptStrategy;

    fn summary(status: ExecutionStatus, rows: usize, err: Option<(&str, &str)>) -> ExecutionSummary {
        ExecutionSummary {
            status,
            row_count: rows,
            columns: vec![],
            error_message: err.map(|(m, _)| m.to_string()),
            error_code: err.map(|(_, c)| c.to_string()),
            sample_row: None,
        }
    }

    #[test]
    fn ai_error_code_lands_in_the_row() {
        let rec = QueryRecord {
            query: TestQuery {
                id: 7,
                question: "Show orders, with totals".into(),
                ground_truth_sql: "SELECT 1".into(),
                complexity: Complexity::Medium,
                category: None,
                time_limit_seconds: None,
            },
            strategy: PromptStrategy::Enhanced,
            prompt_fingerprint: "fp".into(),
            generated_sql: Some("SELECT X".into()),
            generation_error: None,
            comparison: ComparisonRecord {
                query_id: 7,
                gt_result: summary(ExecutionStatus::Success, 6, None),
                ai_result: summary(
                    ExecutionStatus::Error,
                    0,
                    Some(("ORA-00904: \"X\": invalid identifier", "ORA-00904")),
                ),
                both_success: false,
                results_match: false,
                row_count_match: false,
                semantic_match: false,
                heuristic: None,
                scenario: Scenario::GtSuccessAiError,
            },
            timing: QueryTiming {
                generation_ms: 10.0,
                ai_execution_ms: 2.0,
                gt_execution_ms: 1.0,
            },
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_csv(std::slice::from_ref(&rec), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("query_id,complexity,strategy,question"));
        let row = lines.next().unwrap();
        assert!(row.contains("ORA-00904"));
        assert!(row.contains("gt_success_ai_error"));
        assert!(row.contains("\"Show orders, with totals\""));
    }
}
