use serde::Serialize;

use sqlgauge_core::model::{Complexity, QueryRecord, Scenario};

use crate::percentile::{mean, Distribution};
use crate::readiness::{assess, Readiness};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummary {
    pub complexity: Complexity,
    pub total: usize,
    pub ai_success: usize,
    pub results_match: usize,
    pub semantic_match: usize,
    pub success_rate: f64,
    pub match_rate: f64,
    pub semantic_match_rate: f64,
    pub mean_generation_ms: Option<f64>,
    pub mean_total_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    /// Generation plus AI execution, over queries whose AI SQL executed.
    pub total: Option<Distribution>,
    pub generation: Option<Distribution>,
    pub ai_execution: Option<Distribution>,
    pub gt_execution: Option<Distribution>,
    pub mean_overhead_ratio: Option<f64>,
    /// Mean share of the total spent generating, in percent.
    pub generation_share_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryLatency {
    pub query_id: i64,
    pub total_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioCount {
    pub scenario: Scenario,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub ai_success: usize,
    pub gt_success: usize,
    pub results_match: usize,
    pub semantic_match: usize,
    pub row_count_match: usize,
    /// Matches owed to a dialect heuristic alone.
    pub pattern_equivalences: usize,
    pub success_rate: f64,
    pub match_rate: f64,
    pub semantic_match_rate: f64,
    pub scenarios: Vec<ScenarioCount>,
    pub by_complexity: Vec<TierSummary>,
    pub latency: LatencySummary,
    pub fastest: Option<QueryLatency>,
    pub slowest: Option<QueryLatency>,
    pub readiness: Readiness,
}

fn rate(n: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        n as f64 / total as f64
    }
}

fn count(records: &[&QueryRecord], pred: impl Fn(&QueryRecord) -> bool) -> usize {
    records.iter().filter(|r| pred(r)).count()
}

fn tier(complexity: Complexity, records: &[&QueryRecord]) -> TierSummary {
    let total = records.len();
    let ai_success = count(records, |r| r.ai_success());
    let results_match = count(records, |r| r.comparison.results_match);
    let semantic_match = count(records, |r| r.comparison.semantic_match);
    let gen: Vec<f64> = records.iter().map(|r| r.timing.generation_ms).collect();
    let totals: Vec<f64> = records
        .iter()
        .filter(|r| r.ai_success())
        .map(|r| r.timing.total_ms())
        .collect();
    TierSummary {
        complexity,
        total,
        ai_success,
        results_match,
        semantic_match,
        success_rate: rate(ai_success, total),
        match_rate: rate(results_match, total),
        semantic_match_rate: rate(semantic_match, total),
        mean_generation_ms: mean(&gen),
        mean_total_ms: mean(&totals),
    }
}

/// Folds per-query records into run-level figures. Rates are fractions.
pub fn summarize(records: &[QueryRecord]) -> RunSummary {
    let all: Vec<&QueryRecord> = records.iter().collect();
    let executed: Vec<&QueryRecord> = records.iter().filter(|r| r.ai_success()).collect();

    let total = all.len();
    let ai_success = executed.len();
    let gt_success = count(&all, |r| r.comparison.gt_result.is_success());
    let results_match = count(&all, |r| r.comparison.results_match);
    let semantic_match = count(&all, |r| r.comparison.semantic_match);
    let row_count_match = count(&all, |r| r.comparison.row_count_match);
    let pattern_equivalences = count(&all, |r| r.comparison.is_pattern_equivalence());

    let mut scenarios: Vec<ScenarioCount> = Vec::new();
    for r in records {
        match scenarios.iter_mut().find(|s| s.scenario == r.comparison.scenario) {
            Some(s) => s.count += 1,
            None => scenarios.push(ScenarioCount {
                scenario: r.comparison.scenario,
                count: 1,
            }),
        }
    }

    let by_complexity = Complexity::ALL
        .iter()
        .filter_map(|c| {
            let rs: Vec<&QueryRecord> = all
                .iter()
                .copied()
                .filter(|r| r.query.complexity == *c)
                .collect();
            (!rs.is_empty()).then(|| tier(*c, &rs))
        })
        .collect();

    let totals: Vec<f64> = executed.iter().map(|r| r.timing.total_ms()).collect();
    let ratios: Vec<f64> = executed.iter().map(|r| r.timing.overhead_ratio()).collect();
    let shares: Vec<f64> = executed
        .iter()
        .map(|r| r.timing.generation_share_pct())
        .collect();
    let latency = LatencySummary {
        total: Distribution::from_samples(totals.iter().copied()),
        generation: Distribution::from_samples(all.iter().map(|r| r.timing.generation_ms)),
        ai_execution: Distribution::from_samples(executed.iter().map(|r| r.timing.ai_execution_ms)),
        gt_execution: Distribution::from_samples(
            all.iter()
                .filter(|r| r.comparison.gt_result.is_success())
                .map(|r| r.timing.gt_execution_ms),
        ),
        mean_overhead_ratio: mean(&ratios),
        generation_share_pct: mean(&shares),
    };

    let by_total = |r: &&&QueryRecord| r.timing.total_ms();
    let as_latency = |r: &&QueryRecord| QueryLatency {
        query_id: r.query.id,
        total_ms: r.timing.total_ms(),
    };
    let fastest = executed
        .iter()
        .min_by(|a, b| by_total(a).total_cmp(&by_total(b)))
        .map(as_latency);
    let slowest = executed
        .iter()
        .max_by(|a, b| by_total(a).total_cmp(&by_total(b)))
        .map(as_latency);

    let success_rate = rate(ai_success, total);
    let semantic_match_rate = rate(semantic_match, total);
    let readiness = assess(
        success_rate,
        semantic_match_rate,
        latency.total.map(|d| d.p95),
    );

    tracing::debug!(total, ai_success, results_match, semantic_match, "run.summarized");

    RunSummary {
        total,
        ai_success,
        gt_success,
        results_match,
        semantic_match,
        row_count_match,
        pattern_equivalences,
        success_rate,
        match_rate: rate(results_match, total),
        semantic_match_rate,
        scenarios,
        by_complexity,
        latency,
        fastest,
        slowest,
        readiness,
    }
}

/// Records whose AI side did not execute, in record order.
pub fn failed_records(records: &[QueryRecord]) -> impl Iterator<Item = &QueryRecord> {
    records.iter().filter(|r| !r.ai_success())
}

/// Records that executed but did not match, even semantically.
pub fn mismatched_records(records: &[QueryRecord]) -> impl Iterator<Item = &QueryRecord> {
    records
        .iter()
        .filter(|r| r.ai_success() && !r.comparison.semantic_match)
}
