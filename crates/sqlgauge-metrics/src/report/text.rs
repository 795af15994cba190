use std::fmt::Write as _;

use sqlgauge_core::report::RunArtifacts;

use crate::summary::{failed_records, RunSummary};

const RULE: &str =
    "--------------------------------------------------------------------------------";

fn short(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

/// Plain-text results summary.
pub fn render(artifacts: &RunArtifacts, summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "NL-TO-SQL EVALUATION - RESULTS SUMMARY");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "Suite: {}  Strategy: {}  Generator: {}  Dialect: {}",
        artifacts.meta.suite,
        artifacts.meta.strategy,
        artifacts.meta.generator,
        artifacts.meta.dialect.display_name()
    );
    let _ = writeln!(out, "Started: {}", artifacts.meta.started_at);

    let _ = writeln!(out, "\nACCURACY ANALYSIS\n{}", RULE);
    let _ = writeln!(out, "Total Queries Tested: {}", summary.total);
    let _ = writeln!(
        out,
        "AI Success Rate (No Errors): {:.1}% ({}/{})",
        summary.success_rate * 100.0,
        summary.ai_success,
        summary.total
    );
    let _ = writeln!(
        out,
        "Exact Match Rate: {:.1}% ({}/{})",
        summary.match_rate * 100.0,
        summary.results_match,
        summary.total
    );
    let _ = writeln!(
        out,
        "Semantic Match Rate: {:.1}% ({}/{})",
        summary.semantic_match_rate * 100.0,
        summary.semantic_match,
        summary.total
    );
    if summary.pattern_equivalences > 0 {
        let _ = writeln!(out, "Pattern Equivalences Detected: {}", summary.pattern_equivalences);
    }
    let _ = writeln!(out, "\n  BY COMPLEXITY:");
    for t in &summary.by_complexity {
        let _ = writeln!(
            out,
            "    {:<10}: Success={:.1}% | Exact={:.1}% | Semantic={:.1}% ({} queries)",
            t.complexity.as_str(),
            t.success_rate * 100.0,
            t.match_rate * 100.0,
            t.semantic_match_rate * 100.0,
            t.total
        );
    }

    let _ = writeln!(out, "\nLATENCY ANALYSIS\n{}", RULE);
    match summary.latency.total {
        Some(d) => {
            let _ = writeln!(out, "Mean Latency: {:.2} ms", d.mean);
            let _ = writeln!(out, "Median Latency: {:.2} ms", d.median);
            let _ = writeln!(out, "P95 Latency: {:.2} ms", d.p95);
            let _ = writeln!(out, "P99 Latency: {:.2} ms", d.p99);
        }
        None => {
            let _ = writeln!(out, "No successful executions to measure.");
        }
    }
    if let Some(g) = summary.latency.generation {
        let _ = writeln!(out, "  Average Generation Time: {:.2} ms", g.mean);
    }
    if let Some(e) = summary.latency.ai_execution {
        let _ = writeln!(out, "  Average AI SQL Execution Time: {:.2} ms", e.mean);
    }
    if let Some(r) = summary.latency.mean_overhead_ratio {
        let _ = writeln!(out, "  Average Generation Overhead Ratio: {:.2}x", r);
    }

    let _ = writeln!(out, "\nKEY INSIGHTS\n{}", RULE);
    if let Some(f) = &summary.fastest {
        let _ = writeln!(out, "Fastest Query (Q{}): {:.2} ms", f.query_id, f.total_ms);
    }
    if let Some(s) = &summary.slowest {
        let _ = writeln!(out, "Slowest Query (Q{}): {:.2} ms", s.query_id, s.total_ms);
    }
    let failed: Vec<_> = failed_records(&artifacts.records).collect();
    if !failed.is_empty() {
        let _ = writeln!(out, "\nFailed Queries: {}", failed.len());
        for r in failed {
            let _ = writeln!(out, "  * Q{}: {}", r.query.id, short(&r.query.question, 60));
        }
    }

    let _ = writeln!(out, "\nPRODUCTION READINESS ASSESSMENT\n{}", RULE);
    for a in summary.readiness.assessments() {
        let _ = writeln!(
            out,
            "  {} {}: {} ({})",
            a.grade.tag(),
            a.dimension,
            a.grade.as_str(),
            a.detail
        );
    }
    let _ = writeln!(out, "\n{}", RULE);
    out
}
