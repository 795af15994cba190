//! Per-query latency figures.

use crate::model::QueryTiming;

impl QueryTiming {
    /// End-to-end latency a user sees: generation plus AI SQL execution.
    pub fn total_ms(&self) -> f64 {
        self.generation_ms + self.ai_execution_ms
    }

    /// Generation time over AI execution time, 0 when execution took no time.
    pub fn overhead_ratio(&self) -> f64 {
        overhead_ratio(self.generation_ms, self.ai_execution_ms)
    }

    /// Share of the total spent generating, in percent.
    pub fn generation_share_pct(&self) -> f64 {
        let total = self.total_ms();
        if total > 0.0 {
            self.generation_ms / total * 100.0
        } else {
            0.0
        }
    }
}

pub fn overhead_ratio(generation_ms: f64, execution_ms: f64) -> f64 {
    if execution_ms > 0.0 {
        generation_ms / execution_ms
    } else {
        0.0
    }
}
