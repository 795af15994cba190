//! Order-independent result comparison.
//!
//! Rows are reduced to tuples of strings (NULL kept as a distinct marker)
//! and collected into sets, so row order and duplicate multiplicity do not
//! affect the verdict.

use std::collections::HashSet;

use crate::heuristics::HeuristicMatcher;
use crate::model::{ComparisonRecord, ExecutionResult, ExecutionStatus, Scalar, Scenario};

pub type NormalizedRow = Vec<Option<String>>;

pub fn normalize_rows(rows: &[Vec<Scalar>]) -> HashSet<NormalizedRow> {
    rows.iter()
        .map(|r| r.iter().map(Scalar::normalized).collect())
        .collect()
}

/// True iff both executions succeeded and their normalized row sets are equal.
pub fn results_match(gt: &ExecutionResult, ai: &ExecutionResult) -> bool {
    gt.is_success() && ai.is_success() && normalize_rows(&gt.rows) == normalize_rows(&ai.rows)
}

pub fn classify(gt: ExecutionStatus, ai: ExecutionStatus) -> Scenario {
    use ExecutionStatus::*;
    match (gt, ai) {
        (_, Skipped) => Scenario::AiSkipped,
        (Success, Success) => Scenario::BothSuccess,
        (Success, Error) => Scenario::GtSuccessAiError,
        (Error, Success) => Scenario::GtErrorAiSuccess,
        (Error, Error) => Scenario::BothError,
        // A skipped ground truth only happens if the fixture itself was skipped.
        (Skipped, Success) => Scenario::GtErrorAiSuccess,
        (Skipped, Error) => Scenario::BothError,
    }
}

pub struct Comparator {
    heuristics: HeuristicMatcher,
}

impl Comparator {
    pub fn new(heuristics: HeuristicMatcher) -> Self {
        Self { heuristics }
    }

    pub fn exact_only() -> Self {
        Self::new(HeuristicMatcher::disabled())
    }

    /// Folds the two executions into a record. Rows are dropped here.
    pub fn compare(
        &self,
        query_id: i64,
        gt: &ExecutionResult,
        ai: &ExecutionResult,
        gt_sql: &str,
        ai_sql: Option<&str>,
    ) -> ComparisonRecord {
        let both_success = gt.is_success() && ai.is_success();
        let exact = results_match(gt, ai);
        let row_count_match = both_success && gt.row_count == ai.row_count;

        let heuristic = match ai_sql {
            Some(ai_sql) if !exact && row_count_match && gt.row_count > 0 => self
                .heuristics
                .find(ai_sql, gt_sql)
                .map(|e| e.claim.clone()),
            _ => None,
        };

        ComparisonRecord {
            query_id,
            gt_result: gt.summary(),
            ai_result: ai.summary(),
            both_success,
            results_match: exact,
            row_count_match,
            semantic_match: exact || heuristic.is_some(),
            heuristic,
            scenario: classify(gt.status, ai.status),
        }
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(HeuristicMatcher::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RowSet;

    fn ok(rows: Vec<Vec<Scalar>>) -> ExecutionResult {
        ExecutionResult::success(
            RowSet {
                columns: vec![],
                rows,
            },
            0.0,
        )
    }

    fn ints(rows: &[&[i64]]) -> Vec<Vec<Scalar>> {
        rows.iter()
            .map(|r| r.iter().map(|v| Scalar::Integer(*v)).collect())
            .collect()
    }

    #[test]
    fn matching_is_reflexive_and_symmetric() {
        let a = ok(ints(&[&[1, 2], &[3, 4]]));
        let b = ok(ints(&[&[3, 4], &[1, 2]]));
        let c = ok(ints(&[&[1, 2]]));
        assert!(results_match(&a, &a));
        assert_eq!(results_match(&a, &b), results_match(&b, &a));
        assert_eq!(results_match(&a, &c), results_match(&c, &a));
        assert!(!results_match(&a, &c));
    }

    #[test]
    fn nulls_compare_equal_but_not_to_text_null() {
        let a = ok(vec![vec![Scalar::Integer(1), Scalar::Null]]);
        let b = ok(vec![vec![Scalar::Integer(1), Scalar::Null]]);
        let c = ok(vec![vec![Scalar::Integer(1), Scalar::Text("NULL".into())]]);
        assert!(results_match(&a, &b));
        assert!(!results_match(&a, &c));
    }

    #[test]
    fn duplicates_collapse_under_set_semantics() {
        let a = ok(ints(&[&[1, 1], &[1, 1]]));
        let b = ok(ints(&[&[1, 1]]));
        assert!(results_match(&a, &b));
        // Row counts still differ, so no heuristic credit either.
        let rec = Comparator::default().compare(1, &a, &b, "x", Some("x"));
        assert!(rec.results_match);
        assert!(!rec.row_count_match);
    }

    #[test]
    fn failures_never_match() {
        let err = ExecutionResult::error("ORA-00942: table or view does not exist".into(), "ORA-00942".into(), 0.0);
        let a = ok(vec![]);
        assert!(!results_match(&err, &err));
        assert!(!results_match(&a, &err));
        let rec = Comparator::default().compare(3, &err, &err, "x", Some("y"));
        assert_eq!(rec.scenario, Scenario::BothError);
        assert!(!rec.results_match && !rec.row_count_match && !rec.both_success);
    }

    #[test]
    fn one_differing_value_keeps_row_count_match() {
        let gt = ok(ints(&[&[1], &[2], &[3], &[4], &[5]]));
        let ai = ok(ints(&[&[1], &[2], &[3], &[4], &[6]]));
        let rec = Comparator::default().compare(7, &gt, &ai, "SELECT 1", Some("SELECT 1"));
        assert!(!rec.results_match);
        assert!(rec.row_count_match);
        assert!(!rec.semantic_match);
        assert_eq!(rec.scenario, Scenario::BothSuccess);
    }

    #[test]
    fn heuristic_only_fires_on_equal_nonzero_counts() {
        let gt_sql = "SELECT * FROM (SELECT * FROM ORDERS ORDER BY O_TOTALPRICE DESC) WHERE ROWNUM <= 2";
        let ai_sql = "SELECT * FROM ORDERS ORDER BY O_TOTALPRICE DESC FETCH FIRST 2 ROWS ONLY";
        let cmp = Comparator::default();

        let rec = cmp.compare(7, &ok(ints(&[&[1], &[2]])), &ok(ints(&[&[1], &[3]])), gt_sql, Some(ai_sql));
        assert!(!rec.results_match);
        assert!(rec.semantic_match);
        assert!(rec.is_pattern_equivalence());
        assert!(rec.heuristic.is_some());

        let rec = cmp.compare(7, &ok(vec![]), &ok(vec![]), gt_sql, Some(ai_sql));
        assert!(rec.results_match);
        assert!(rec.heuristic.is_none());

        let rec = cmp.compare(7, &ok(ints(&[&[1], &[2]])), &ok(ints(&[&[1]])), gt_sql, Some(ai_sql));
        assert!(!rec.semantic_match);

        let rec = Comparator::exact_only().compare(
            7,
            &ok(ints(&[&[1], &[2]])),
            &ok(ints(&[&[1], &[3]])),
            gt_sql,
            Some(ai_sql),
        );
        assert!(!rec.semantic_match);
    }

    #[test]
    fn skipped_ai_side_is_its_own_scenario() {
        let gt = ok(ints(&[&[1]]));
        let ai = ExecutionResult::skipped("generation request failed: timeout".into());
        let rec = Comparator::default().compare(1, &gt, &ai, "SELECT 1", None);
        assert_eq!(rec.scenario, Scenario::AiSkipped);
        assert!(!rec.results_match);
    }
}
