use sqlgauge_core::model::{
    Complexity, ComparisonRecord, Dialect, ExecutionStatus, ExecutionSummary, QueryRecord,
    QueryTiming, Scenario, TestQuery,
};
use sqlgauge_core::prompt::PromptStrategy;
use sqlgauge_core::report::{RunArtifacts, RunMeta};
use sqlgauge_metrics::readiness::Grade;
use sqlgauge_metrics::report::{markdown, text, write_artifacts};
use sqlgauge_metrics::strategies::compare_strategies;
use sqlgauge_metrics::summarize;

fn ok(rows: usize) -> ExecutionSummary {
    ExecutionSummary {
        status: ExecutionStatus::Success,
        row_count: rows,
        columns: vec!["C".into()],
        error_message: None,
        error_code: None,
        sample_row: (rows > 0).then(|| vec!["1".to_string()]),
    }
}

fn err(code: &str, msg: &str) -> ExecutionSummary {
    ExecutionSummary {
        status: ExecutionStatus::Error,
        row_count: 0,
        columns: vec![],
        error_message: Some(msg.into()),
        error_code: Some(code.into()),
        sample_row: None,
    }
}

struct Rec {
    id: i64,
    complexity: Complexity,
    gt: ExecutionSummary,
    ai: ExecutionSummary,
    exact: bool,
    heuristic: Option<&'static str>,
    scenario: Scenario,
    gen_ms: f64,
    exec_ms: f64,
}

fn record(r: Rec, strategy: PromptStrategy) -> QueryRecord {
    let row_count_match = r.gt.is_success() && r.ai.is_success() && r.gt.row_count == r.ai.row_count;
    QueryRecord {
        query: TestQuery {
            id: r.id,
            question: format!("question {}", r.id),
            ground_truth_sql: "SELECT C_NAME FROM CUSTOMER WHERE C_CUSTKEY = 1".into(),
            complexity: r.complexity,
            category: None,
            time_limit_seconds: None,
        },
        strategy,
        prompt_fingerprint: "fp".into(),
        generated_sql: r
            .ai
            .is_success()
            .then(|| "SELECT C_NAME FROM CUSTOMER".to_string())
            .or_else(|| (r.scenario != Scenario::AiSkipped).then(|| "SELECT C_NAMEX FROM CUSTOMER".to_string())),
        generation_error: (r.scenario == Scenario::AiSkipped).then(|| "timeout".to_string()),
        comparison: ComparisonRecord {
            query_id: r.id,
            both_success: r.gt.is_success() && r.ai.is_success(),
            results_match: r.exact,
            row_count_match,
            semantic_match: r.exact || r.heuristic.is_some(),
            heuristic: r.heuristic.map(str::to_string),
            scenario: r.scenario,
            gt_result: r.gt,
            ai_result: r.ai,
        },
        timing: QueryTiming {
            generation_ms: r.gen_ms,
            ai_execution_ms: r.exec_ms,
            gt_execution_ms: 5.0,
        },
    }
}

fn sample(strategy: PromptStrategy) -> Vec<QueryRecord> {
    vec![
        record(
            Rec {
                id: 1,
                complexity: Complexity::Simple,
                gt: ok(5),
                ai: ok(5),
                exact: true,
                heuristic: None,
                scenario: Scenario::BothSuccess,
                gen_ms: 90.0,
                exec_ms: 10.0,
            },
            strategy,
        ),
        record(
            Rec {
                id: 2,
                complexity: Complexity::Simple,
                gt: ok(5),
                ai: ok(5),
                exact: false,
                heuristic: Some("FETCH FIRST and ROWNUM both limit rows"),
                scenario: Scenario::BothSuccess,
                gen_ms: 180.0,
                exec_ms: 20.0,
            },
            strategy,
        ),
        record(
            Rec {
                id: 3,
                complexity: Complexity::Medium,
                gt: ok(6),
                ai: err("ORA-00904", "ORA-00904: \"C_NAMEX\": invalid identifier"),
                exact: false,
                heuristic: None,
                scenario: Scenario::GtSuccessAiError,
                gen_ms: 250.0,
                exec_ms: 1.0,
            },
            strategy,
        ),
        record(
            Rec {
                id: 4,
                complexity: Complexity::Complex,
                gt: ok(2),
                ai: ok(3),
                exact: false,
                heuristic: None,
                scenario: Scenario::BothSuccess,
                gen_ms: 370.0,
                exec_ms: 30.0,
            },
            strategy,
        ),
    ]
}

fn artifacts(strategy: PromptStrategy, records: Vec<QueryRecord>) -> RunArtifacts {
    RunArtifacts {
        run_id: Some(1),
        meta: RunMeta {
            suite: "tpch".into(),
            strategy,
            generator: "trace".into(),
            dialect: Dialect::Sqlite,
            started_at: "2026-01-01T00:00:00Z".into(),
        },
        records,
    }
}

#[test]
fn rates_counts_and_latency() {
    let s = summarize(&sample(PromptStrategy::Enhanced));
    assert_eq!(s.total, 4);
    assert_eq!(s.ai_success, 3);
    assert_eq!(s.results_match, 1);
    assert_eq!(s.semantic_match, 2);
    assert_eq!(s.pattern_equivalences, 1);
    assert_eq!(s.row_count_match, 2);
    assert!((s.success_rate - 0.75).abs() < 1e-12);
    assert!((s.semantic_match_rate - 0.5).abs() < 1e-12);

    // totals of executed queries: 100, 200, 400
    let total = s.latency.total.unwrap();
    assert_eq!(total.count, 3);
    assert!((total.median - 200.0).abs() < 1e-9);
    assert_eq!(s.fastest.as_ref().unwrap().query_id, 1);
    assert_eq!(s.slowest.as_ref().unwrap().query_id, 4);
    assert_eq!(s.latency.generation.unwrap().count, 4);

    let tiers: Vec<_> = s.by_complexity.iter().map(|t| (t.complexity, t.total)).collect();
    assert_eq!(
        tiers,
        vec![
            (Complexity::Simple, 2),
            (Complexity::Medium, 1),
            (Complexity::Complex, 1)
        ]
    );

    assert_eq!(s.readiness.sql_validity.grade, Grade::Acceptable);
    assert_eq!(s.readiness.result_accuracy.grade, Grade::Good);
    assert_eq!(s.readiness.latency.grade, Grade::Excellent);
}

#[test]
fn empty_run_summarizes_to_zeroes() {
    let s = summarize(&[]);
    assert_eq!(s.total, 0);
    assert_eq!(s.success_rate, 0.0);
    assert!(s.latency.total.is_none());
    assert!(s.by_complexity.is_empty());
    assert!(s.fastest.is_none());
}

#[test]
fn failure_analysis_names_the_error_code() {
    let art = artifacts(PromptStrategy::Enhanced, sample(PromptStrategy::Enhanced));
    let s = summarize(&art.records);
    let md = markdown::render(&art, &s);
    assert!(md.contains("## Failure Analysis"));
    assert!(md.contains("| Q3 | medium | `gt_success_ai_error` | ORA-00904 | 6/0 |"));
    assert!(md.contains("invalid identifier"));
    assert!(md.contains("### Q4: question 4"));
    assert!(!md.contains("### Q2:"));

    let txt = text::render(&art, &s);
    assert!(txt.contains("AI Success Rate (No Errors): 75.0% (3/4)"));
    assert!(txt.contains("Pattern Equivalences Detected: 1"));
    assert!(txt.contains("Q3: question 3"));
}

#[test]
fn writes_the_artifact_set() {
    let dir = tempfile::tempdir().unwrap();
    let art = artifacts(PromptStrategy::Enhanced, sample(PromptStrategy::Enhanced));
    let (_, written) = write_artifacts(dir.path(), &art).unwrap();
    for name in ["results.csv", "report.md", "summary.txt", "run.json"] {
        assert!(dir.path().join(name).exists(), "{} missing", name);
    }
    assert_eq!(std::fs::read_dir(dir.path().join("charts")).unwrap().count(), 5);
    assert_eq!(written.len(), 9);
    let csv = std::fs::read_to_string(dir.path().join("results.csv")).unwrap();
    assert!(csv.contains("ORA-00904"));
}

#[test]
fn strategies_report_fixes_relative_to_baseline() {
    let mut base = sample(PromptStrategy::Baseline);
    // Baseline misses Q1.
    base[0].comparison.results_match = false;
    base[0].comparison.semantic_match = false;
    let runs = vec![
        artifacts(PromptStrategy::Baseline, base),
        artifacts(PromptStrategy::Enhanced, sample(PromptStrategy::Enhanced)),
    ];
    let rows = compare_strategies(&runs);
    assert_eq!(rows.len(), 2);
    assert!(rows[0].fixed_vs_baseline.is_empty());
    assert_eq!(rows[1].fixed_vs_baseline, vec![1]);
    assert!(rows[1].broken_vs_baseline.is_empty());
    assert!(rows[1].semantic_match_rate > rows[0].semantic_match_rate);
}
