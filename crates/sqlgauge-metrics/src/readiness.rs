//! Production-readiness grading of a run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Acceptable,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Excellent => "EXCELLENT",
            Grade::Good => "GOOD",
            Grade::Acceptable => "ACCEPTABLE",
        }
    }

    /// `[PASS]` for excellent and good, `[FAIR]` otherwise.
    pub fn tag(&self) -> &'static str {
        match self {
            Grade::Excellent | Grade::Good => "[PASS]",
            Grade::Acceptable => "[FAIR]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub dimension: &'static str,
    pub grade: Grade,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readiness {
    pub sql_validity: Assessment,
    pub result_accuracy: Assessment,
    pub latency: Assessment,
}

impl Readiness {
    pub fn assessments(&self) -> [&Assessment; 3] {
        [&self.sql_validity, &self.result_accuracy, &self.latency]
    }

    /// The weakest of the three grades.
    pub fn overall(&self) -> Grade {
        self.assessments()
            .iter()
            .map(|a| a.grade)
            .max()
            .unwrap_or(Grade::Acceptable)
    }
}

/// Rates are fractions in `[0, 1]`. A run without latency samples is graded
/// on the other two dimensions only and its latency is reported as unmeasured.
pub fn assess(success_rate: f64, semantic_rate: f64, p95_ms: Option<f64>) -> Readiness {
    let sql_validity = {
        let grade = if success_rate >= 0.95 {
            Grade::Excellent
        } else if success_rate >= 0.90 {
            Grade::Good
        } else {
            Grade::Acceptable
        };
        Assessment {
            dimension: "SQL Validity",
            grade,
            detail: format!("{:.1}% of generated SQL executed without error", success_rate * 100.0),
        }
    };

    let result_accuracy = {
        let grade = if semantic_rate >= 0.70 {
            Grade::Excellent
        } else if semantic_rate >= 0.50 {
            Grade::Good
        } else {
            Grade::Acceptable
        };
        Assessment {
            dimension: "Result Accuracy",
            grade,
            detail: format!("{:.1}% of queries produced correct results", semantic_rate * 100.0),
        }
    };

    let latency = match p95_ms {
        Some(p95) => Assessment {
            dimension: "Latency",
            grade: if p95 < 5000.0 {
                Grade::Excellent
            } else if p95 < 10000.0 {
                Grade::Good
            } else {
                Grade::Acceptable
            },
            detail: format!("P95 {:.0} ms", p95),
        },
        None => Assessment {
            dimension: "Latency",
            grade: Grade::Acceptable,
            detail: "no successful executions to measure".to_string(),
        },
    };

    Readiness {
        sql_validity,
        result_accuracy,
        latency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_for_rates_and_exclusive_for_latency() {
        let r = assess(0.95, 0.70, Some(4999.0));
        assert_eq!(r.overall(), Grade::Excellent);

        let r = assess(0.90, 0.50, Some(5000.0));
        assert_eq!(r.sql_validity.grade, Grade::Good);
        assert_eq!(r.result_accuracy.grade, Grade::Good);
        assert_eq!(r.latency.grade, Grade::Good);

        let r = assess(0.89, 0.49, Some(10000.0));
        assert_eq!(r.overall(), Grade::Acceptable);
        assert_eq!(r.latency.grade.tag(), "[FAIR]");
    }

    #[test]
    fn overall_is_the_weakest_dimension() {
        let r = assess(1.0, 0.6, Some(100.0));
        assert_eq!(r.overall(), Grade::Good);
    }
}
