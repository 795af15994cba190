use std::fmt::Write as _;

use sqlgauge_core::model::{QueryRecord, Scenario};
use sqlgauge_core::patterns::compare_features;
use sqlgauge_core::report::RunArtifacts;

use crate::percentile::Distribution;
use crate::summary::{failed_records, mismatched_records, RunSummary};

fn pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

fn ms(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2} ms", x))
        .unwrap_or_else(|| "n/a".to_string())
}

fn dist_row(out: &mut String, name: &str, d: Option<Distribution>) {
    let _ = match d {
        Some(d) => writeln!(
            out,
            "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |",
            name, d.count, d.mean, d.median, d.p95, d.p99
        ),
        None => writeln!(out, "| {} | 0 | - | - | - | - |", name),
    };
}

fn failure_narrative(out: &mut String, r: &QueryRecord) {
    let c = &r.comparison;
    let _ = writeln!(out, "### Q{}: {}\n", r.query.id, r.query.question);
    let _ = writeln!(
        out,
        "- Complexity: {}\n- Scenario: `{}`",
        r.query.complexity, c.scenario
    );

    match c.scenario {
        Scenario::AiSkipped => {
            let _ = writeln!(
                out,
                "- Generation failed: {}",
                r.generation_error.as_deref().unwrap_or("unknown error")
            );
        }
        Scenario::BothSuccess => {
            let _ = writeln!(
                out,
                "- Row counts: ground truth {}, generated {} ({})",
                c.gt_result.row_count,
                c.ai_result.row_count,
                if c.row_count_match { "equal" } else { "different" }
            );
            if let Some(sample) = &c.gt_result.sample_row {
                let _ = writeln!(out, "- Ground truth first row: `{}`", sample.join(", "));
            }
            if let Some(sample) = &c.ai_result.sample_row {
                let _ = writeln!(out, "- Generated first row: `{}`", sample.join(", "));
            }
        }
        _ => {
            for (side, res) in [("Generated", &c.ai_result), ("Ground truth", &c.gt_result)] {
                if !res.is_success() {
                    let _ = writeln!(
                        out,
                        "- {} SQL error `{}`: {}",
                        side,
                        res.error_code.as_deref().unwrap_or("UNKNOWN"),
                        res.error_message.as_deref().unwrap_or("")
                    );
                }
            }
        }
    }

    let diffs: Vec<_> = compare_features(&r.query.ground_truth_sql, r.generated_sql.as_deref())
        .into_iter()
        .filter(|d| !d.agrees())
        .collect();
    if !diffs.is_empty() {
        let _ = writeln!(out, "\nPattern differences:\n");
        let _ = writeln!(out, "| Feature | Ground truth | Generated |\n|---|---|---|");
        for d in diffs {
            let yn = |b: bool| if b { "yes" } else { "no" };
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                d.feature,
                yn(d.in_ground_truth),
                yn(d.in_generated)
            );
        }
    }

    let _ = writeln!(
        out,
        "\nGround truth SQL:\n\n```sql\n{}\n```\n",
        r.query.ground_truth_sql.trim()
    );
    match &r.generated_sql {
        Some(sql) => {
            let _ = writeln!(out, "Generated SQL:\n\n```sql\n{}\n```\n", sql.trim());
        }
        None => {
            let _ = writeln!(out, "Generated SQL: none\n");
        }
    }
}

/// Narrative report of one run.
pub fn render(artifacts: &RunArtifacts, summary: &RunSummary) -> String {
    let meta = &artifacts.meta;
    let mut out = String::new();

    let _ = writeln!(out, "# NL-to-SQL Evaluation Report\n");
    let _ = writeln!(
        out,
        "Suite `{}`, strategy `{}`, generator `{}`, {} dialect, started {}.",
        meta.suite,
        meta.strategy,
        meta.generator,
        meta.dialect.display_name(),
        meta.started_at
    );
    if let Some(id) = artifacts.run_id {
        let _ = writeln!(out, "Run id {}.", id);
    }

    let _ = writeln!(out, "\n## Summary\n");
    let _ = writeln!(out, "| Metric | Value |\n|---|---|");
    let _ = writeln!(out, "| Queries | {} |", summary.total);
    let _ = writeln!(
        out,
        "| AI success rate | {} ({}/{}) |",
        pct(summary.success_rate),
        summary.ai_success,
        summary.total
    );
    let _ = writeln!(
        out,
        "| Exact match rate | {} ({}/{}) |",
        pct(summary.match_rate),
        summary.results_match,
        summary.total
    );
    let _ = writeln!(
        out,
        "| Semantic match rate | {} ({}/{}) |",
        pct(summary.semantic_match_rate),
        summary.semantic_match,
        summary.total
    );
    let _ = writeln!(out, "| Pattern equivalences | {} |", summary.pattern_equivalences);
    let _ = writeln!(out, "| Row count matches | {} |", summary.row_count_match);

    if !summary.scenarios.is_empty() {
        let _ = writeln!(out, "\n| Scenario | Queries |\n|---|---|");
        for s in &summary.scenarios {
            let _ = writeln!(out, "| `{}` | {} |", s.scenario, s.count);
        }
    }

    let _ = writeln!(out, "\n## By Complexity\n");
    let _ = writeln!(
        out,
        "| Complexity | Queries | Success | Exact | Semantic | Mean generation | Mean total |\n|---|---|---|---|---|---|---|"
    );
    for t in &summary.by_complexity {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            t.complexity,
            t.total,
            pct(t.success_rate),
            pct(t.match_rate),
            pct(t.semantic_match_rate),
            ms(t.mean_generation_ms),
            ms(t.mean_total_ms)
        );
    }

    let lat = &summary.latency;
    let _ = writeln!(out, "\n## Latency\n");
    let _ = writeln!(
        out,
        "| Measure (ms) | Samples | Mean | Median | P95 | P99 |\n|---|---|---|---|---|---|"
    );
    dist_row(&mut out, "Total (generation + execution)", lat.total);
    dist_row(&mut out, "Generation", lat.generation);
    dist_row(&mut out, "AI execution", lat.ai_execution);
    dist_row(&mut out, "Ground truth execution", lat.gt_execution);
    if let Some(r) = lat.mean_overhead_ratio {
        let _ = writeln!(out, "\nMean generation overhead ratio: {:.2}x", r);
    }
    if let Some(s) = lat.generation_share_pct {
        let _ = writeln!(out, "Generation share of total latency: {:.1}%", s);
    }

    let _ = writeln!(out, "\n## Key Insights\n");
    if let Some(f) = &summary.fastest {
        let _ = writeln!(out, "- Fastest query: Q{} ({:.2} ms)", f.query_id, f.total_ms);
    }
    if let Some(s) = &summary.slowest {
        let _ = writeln!(out, "- Slowest query: Q{} ({:.2} ms)", s.query_id, s.total_ms);
    }
    if summary.pattern_equivalences > 0 {
        let _ = writeln!(
            out,
            "- {} result(s) differ textually but follow a known dialect equivalence",
            summary.pattern_equivalences
        );
    }
    let failed: Vec<&QueryRecord> = failed_records(&artifacts.records).collect();
    if !failed.is_empty() {
        let _ = writeln!(out, "- {} queries failed to produce executable SQL", failed.len());
    }

    let _ = writeln!(out, "\n## Production Readiness\n");
    for a in summary.readiness.assessments() {
        let _ = writeln!(
            out,
            "- {} {}: {} ({})",
            a.grade.tag(),
            a.dimension,
            a.grade.as_str(),
            a.detail
        );
    }
    let _ = writeln!(out, "\nOverall: **{}**", summary.readiness.overall().as_str());

    let mismatched: Vec<&QueryRecord> = mismatched_records(&artifacts.records).collect();
    let _ = writeln!(out, "\n## Failure Analysis\n");
    if failed.is_empty() && mismatched.is_empty() {
        let _ = writeln!(out, "No failures.");
        return out;
    }

    let _ = writeln!(
        out,
        "| Query | Complexity | Scenario | Error code | Rows (gt/ai) |\n|---|---|---|---|---|"
    );
    for r in failed.iter().chain(mismatched.iter()) {
        let c = &r.comparison;
        let code = c
            .ai_result
            .error_code
            .as_deref()
            .or(c.gt_result.error_code.as_deref())
            .unwrap_or("-");
        let _ = writeln!(
            out,
            "| Q{} | {} | `{}` | {} | {}/{} |",
            r.query.id,
            r.query.complexity,
            c.scenario,
            code,
            c.gt_result.row_count,
            c.ai_result.row_count
        );
    }
    let _ = writeln!(out);
    for r in failed.iter().chain(mismatched.iter()) {
        failure_narrative(&mut out, r);
    }
    out
}
