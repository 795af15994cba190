//! Dialect equivalence heuristic.
//!
//! Some generated queries differ from the ground truth only in how a dialect
//! feature is spelled, e.g. `FETCH FIRST n ROWS ONLY` against a `ROWNUM`
//! filter. When both sides return the same non-zero number of rows but the
//! row sets differ (typically ties broken differently), a matching pair of
//! textual patterns marks the query as a semantic match.
//!
//! This is a coarse textual check, not a proof of equivalence. It is kept out
//! of the exact comparator and reported in its own column.

use serde::{Deserialize, Serialize};

/// One table entry: `ai_pattern` must occur in the generated SQL and
/// `gt_pattern` in the ground truth (both compared upper-cased).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equivalence {
    pub ai_pattern: String,
    pub gt_pattern: String,
    pub claim: String,
}

impl Equivalence {
    pub fn new(ai_pattern: &str, gt_pattern: &str, claim: &str) -> Self {
        Self {
            ai_pattern: ai_pattern.to_ascii_uppercase(),
            gt_pattern: gt_pattern.to_ascii_uppercase(),
            claim: claim.to_string(),
        }
    }

    fn applies(&self, ai_upper: &str, gt_upper: &str) -> bool {
        ai_upper.contains(&self.ai_pattern.to_ascii_uppercase())
            && gt_upper.contains(&self.gt_pattern.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone)]
pub struct HeuristicMatcher {
    table: Vec<Equivalence>,
}

impl Default for HeuristicMatcher {
    fn default() -> Self {
        Self {
            table: vec![
                Equivalence::new(
                    "FETCH FIRST",
                    "ROWNUM",
                    "FETCH FIRST n ROWS ONLY and ROWNUM <= n both limit the result",
                ),
                Equivalence::new(
                    "LEFT JOIN",
                    "NOT EXISTS",
                    "anti-join written as LEFT JOIN ... IS NULL instead of NOT EXISTS",
                ),
                Equivalence::new(
                    "NOT EXISTS",
                    "LEFT JOIN",
                    "anti-join written as NOT EXISTS instead of LEFT JOIN ... IS NULL",
                ),
            ],
        }
    }
}

impl HeuristicMatcher {
    /// A matcher that never fires. Used when heuristics are switched off.
    pub fn disabled() -> Self {
        Self { table: Vec::new() }
    }

    pub fn with_extra(mut self, extra: impl IntoIterator<Item = Equivalence>) -> Self {
        self.table.extend(extra);
        self
    }

    pub fn entries(&self) -> &[Equivalence] {
        &self.table
    }

    /// First table entry whose patterns occur in the two SQL texts.
    pub fn find(&self, ai_sql: &str, gt_sql: &str) -> Option<&Equivalence> {
        let ai = ai_sql.to_ascii_uppercase();
        let gt = gt_sql.to_ascii_uppercase();
        self.table.iter().find(|e| e.applies(&ai, &gt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_first_matches_rownum_ground_truth() {
        let m = HeuristicMatcher::default();
        let hit = m.find(
            "select * from orders order by o_totalprice desc fetch first 5 rows only",
            "SELECT * FROM (SELECT * FROM ORDERS ORDER BY O_TOTALPRICE DESC) WHERE ROWNUM <= 5",
        );
        assert!(hit.is_some());
        assert!(hit.unwrap().claim.contains("ROWNUM"));
    }

    #[test]
    fn anti_join_is_recognized_both_ways() {
        let m = HeuristicMatcher::default();
        assert!(m
            .find(
                "SELECT c.c_custkey FROM customer c LEFT JOIN orders o ON 1=1 WHERE o.o_orderkey IS NULL",
                "SELECT C_CUSTKEY FROM CUSTOMER C WHERE NOT EXISTS (SELECT 1 FROM ORDERS)"
            )
            .is_some());
        assert!(m
            .find(
                "SELECT 1 FROM CUSTOMER WHERE NOT EXISTS (SELECT 1 FROM ORDERS)",
                "SELECT 1 FROM CUSTOMER C LEFT JOIN ORDERS O ON C.C_CUSTKEY = O.O_CUSTKEY"
            )
            .is_some());
    }

    #[test]
    fn unrelated_sql_does_not_fire() {
        let m = HeuristicMatcher::default();
        assert!(m
            .find("SELECT COUNT(*) FROM CUSTOMER", "SELECT COUNT(*) FROM CUSTOMER")
            .is_none());
        assert!(HeuristicMatcher::disabled()
            .find("... FETCH FIRST 1 ROW ONLY", "... ROWNUM <= 1")
            .is_none());
    }

    #[test]
    fn extra_entries_extend_the_table() {
        let m = HeuristicMatcher::default().with_extra([Equivalence::new(
            "limit",
            "rownum",
            "LIMIT n against ROWNUM <= n",
        )]);
        assert_eq!(m.entries().len(), 4);
        assert!(m
            .find("SELECT * FROM ORDERS LIMIT 5", "SELECT * FROM ORDERS WHERE ROWNUM <= 5")
            .is_some());
    }
}
