//! Structural SQL features used to explain mismatches in failure reports.

use regex::Regex;
use std::sync::OnceLock;

const FEATURES: [(&str, &str); 11] = [
    ("ROWNUM", r"ROWNUM"),
    ("FETCH FIRST", r"FETCH\s+FIRST"),
    ("NOT EXISTS", r"NOT\s+EXISTS"),
    ("LEFT JOIN", r"LEFT\s+(OUTER\s+)?JOIN"),
    ("JOIN", r"\bJOIN\b"),
    ("GROUP BY", r"GROUP\s+BY"),
    ("SELECT *", r"SELECT\s+\*"),
    ("WHERE", r"\bWHERE\b"),
    ("ORDER BY", r"ORDER\s+BY"),
    ("EXTRACT", r"\bEXTRACT\s*\("),
    ("CORRELATED", r"(?s)WHERE.*SELECT.*WHERE"),
];

fn compiled() -> &'static [(&'static str, Regex)] {
    static RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        FEATURES
            .iter()
            .map(|(name, re)| (*name, Regex::new(re).expect("static regex")))
            .collect()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDiff {
    pub feature: &'static str,
    pub in_ground_truth: bool,
    pub in_generated: bool,
}

impl FeatureDiff {
    pub fn agrees(&self) -> bool {
        self.in_ground_truth == self.in_generated
    }
}

pub fn features(sql: &str) -> Vec<&'static str> {
    let upper = sql.to_ascii_uppercase();
    compiled()
        .iter()
        .filter(|(_, re)| re.is_match(&upper))
        .map(|(name, _)| *name)
        .collect()
}

/// Features present in either SQL text, with where each one occurs.
pub fn compare_features(gt_sql: &str, ai_sql: Option<&str>) -> Vec<FeatureDiff> {
    let gt = gt_sql.to_ascii_uppercase();
    let ai = ai_sql.map(|s| s.to_ascii_uppercase()).unwrap_or_default();
    compiled()
        .iter()
        .filter_map(|(name, re)| {
            let diff = FeatureDiff {
                feature: *name,
                in_ground_truth: re.is_match(&gt),
                in_generated: re.is_match(&ai),
            };
            (diff.in_ground_truth || diff.in_generated).then_some(diff)
        })
        .collect()
}
