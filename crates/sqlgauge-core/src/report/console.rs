use crate::model::{QueryRecord, Scenario};

use super::RunArtifacts;

fn short(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn print_record(r: &QueryRecord) {
    let c = &r.comparison;
    let timing = format!("({:.2}s)", r.timing.total_ms() / 1000.0);
    let label = format!("Q{:<3} {:<8}", r.query.id, r.query.complexity.as_str());

    match c.scenario {
        Scenario::BothSuccess if c.results_match => {
            eprintln!("✅ {} MATCH  {} rows  {}", label, c.gt_result.row_count, timing);
        }
        Scenario::BothSuccess if c.semantic_match => {
            eprintln!(
                "⚡ {} EQUIVALENT  {}  {}",
                label,
                c.heuristic.as_deref().unwrap_or("pattern equivalence"),
                timing
            );
        }
        Scenario::BothSuccess => {
            eprintln!(
                "❌ {} MISMATCH  gt {} rows, ai {} rows  {}",
                label, c.gt_result.row_count, c.ai_result.row_count, timing
            );
        }
        Scenario::AiSkipped => {
            let why = r.generation_error.as_deref().unwrap_or("generation failed");
            eprintln!("⏭️  {} SKIPPED  {}", label, short(why, 100));
        }
        _ => {
            let side = if c.ai_result.is_success() {
                &c.gt_result
            } else {
                &c.ai_result
            };
            eprintln!(
                "💥 {} {}  {}: {}",
                label,
                c.scenario,
                side.error_code.as_deref().unwrap_or("UNKNOWN"),
                short(side.error_message.as_deref().unwrap_or(""), 100)
            );
        }
    }
}

/// Per-query lines and a closing tally, on stderr.
pub fn print_summary(artifacts: &RunArtifacts) {
    let records = &artifacts.records;
    eprintln!(
        "\nEvaluated {} queries ({} strategy, {} generator, {})",
        records.len(),
        artifacts.meta.strategy,
        artifacts.meta.generator,
        artifacts.meta.dialect.display_name()
    );

    for r in records {
        print_record(r);
    }

    let semantic = records.iter().filter(|r| r.comparison.semantic_match).count();
    let skipped = records
        .iter()
        .filter(|r| r.comparison.scenario == Scenario::AiSkipped)
        .count();

    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary: {} executed, {} matched, {} semantic, {} skipped, {} total",
        artifacts.ai_success_count(),
        artifacts.match_count(),
        semantic,
        skipped,
        records.len()
    );
    if let Some(id) = artifacts.run_id {
        eprintln!("Run id: {}", id);
    }
}
