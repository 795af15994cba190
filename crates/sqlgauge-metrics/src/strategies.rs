//! Side-by-side comparison of prompt strategies over the same queries.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use sqlgauge_core::prompt::PromptStrategy;
use sqlgauge_core::report::RunArtifacts;

use crate::summary::summarize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRow {
    pub strategy: PromptStrategy,
    pub queries: usize,
    pub success_rate: f64,
    pub match_rate: f64,
    pub semantic_match_rate: f64,
    pub mean_total_ms: Option<f64>,
    pub p95_total_ms: Option<f64>,
    /// Query ids that match here but not under the baseline strategy.
    pub fixed_vs_baseline: Vec<i64>,
    /// Query ids that match under the baseline strategy but not here.
    pub broken_vs_baseline: Vec<i64>,
}

fn matched_ids(run: &RunArtifacts) -> BTreeSet<i64> {
    run.records
        .iter()
        .filter(|r| r.comparison.semantic_match)
        .map(|r| r.query.id)
        .collect()
}

/// One row per run. Baseline deltas are empty when no baseline run is present.
pub fn compare_strategies(runs: &[RunArtifacts]) -> Vec<StrategyRow> {
    let baseline = runs
        .iter()
        .find(|r| r.meta.strategy == PromptStrategy::Baseline)
        .map(matched_ids);

    runs.iter()
        .map(|run| {
            let s = summarize(&run.records);
            let ids = matched_ids(run);
            let (fixed, broken) = match &baseline {
                Some(base) => (
                    ids.difference(base).copied().collect(),
                    base.difference(&ids).copied().collect(),
                ),
                None => (Vec::new(), Vec::new()),
            };
            StrategyRow {
                strategy: run.meta.strategy,
                queries: s.total,
                success_rate: s.success_rate,
                match_rate: s.match_rate,
                semantic_match_rate: s.semantic_match_rate,
                mean_total_ms: s.latency.total.map(|d| d.mean),
                p95_total_ms: s.latency.total.map(|d| d.p95),
                fixed_vs_baseline: fixed,
                broken_vs_baseline: broken,
            }
        })
        .collect()
}

#[derive(Serialize)]
struct CsvRow {
    strategy: &'static str,
    queries: usize,
    success_rate_pct: String,
    match_rate_pct: String,
    semantic_match_rate_pct: String,
    mean_total_ms: String,
    p95_total_ms: String,
    fixed_vs_baseline: String,
    broken_vs_baseline: String,
}

fn ids(v: &[i64]) -> String {
    v.iter().map(|i| format!("Q{}", i)).collect::<Vec<_>>().join(" ")
}

fn opt_ms(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}", x)).unwrap_or_default()
}

pub fn write_strategies_csv(rows: &[StrategyRow], path: &Path) -> anyhow::Result<()> {
    let mut w = csv::Writer::from_path(path)?;
    for r in rows {
        w.serialize(CsvRow {
            strategy: r.strategy.as_str(),
            queries: r.queries,
            success_rate_pct: format!("{:.1}", r.success_rate * 100.0),
            match_rate_pct: format!("{:.1}", r.match_rate * 100.0),
            semantic_match_rate_pct: format!("{:.1}", r.semantic_match_rate * 100.0),
            mean_total_ms: opt_ms(r.mean_total_ms),
            p95_total_ms: opt_ms(r.p95_total_ms),
            fixed_vs_baseline: ids(&r.fixed_vs_baseline),
            broken_vs_baseline: ids(&r.broken_vs_baseline),
        })?;
    }
    w.flush()?;
    Ok(())
}

/// Fixed-width table for the console.
pub fn render_table(rows: &[StrategyRow]) -> String {
    let mut out = format!(
        "{:<10} {:>7} {:>9} {:>7} {:>9} {:>11}  {}\n",
        "strategy", "queries", "success%", "match%", "semantic%", "mean ms", "fixed vs baseline"
    );
    for r in rows {
        out.push_str(&format!(
            "{:<10} {:>7} {:>9.1} {:>7.1} {:>9.1} {:>11}  {}\n",
            r.strategy.as_str(),
            r.queries,
            r.success_rate * 100.0,
            r.match_rate * 100.0,
            r.semantic_match_rate * 100.0,
            opt_ms(r.mean_total_ms),
            ids(&r.fixed_vs_baseline)
        ));
    }
    out
}
