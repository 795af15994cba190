use std::sync::Arc;

use sqlgauge_core::db::SqliteSession;
use sqlgauge_core::engine::Runner;
use sqlgauge_core::model::{Complexity, EvalConfig, Scenario, TestQuery};
use sqlgauge_core::prompt::PromptStrategy;
use sqlgauge_core::providers::trace::TraceGenerator;
use sqlgauge_core::storage::Store;
use tempfile::tempdir;

fn query(id: i64, question: &str, sql: &str) -> TestQuery {
    TestQuery {
        id,
        question: question.into(),
        ground_truth_sql: sql.into(),
        complexity: Complexity::Simple,
        category: Some("smoke".into()),
        time_limit_seconds: None,
    }
}

#[tokio::test]
async fn test_storage_smoke_lifecycle() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("runs.db");

    // 1. Open store (init schema)
    let store = Store::open(&db_path)?;
    store.init_schema()?;
    assert_eq!(store.latest_run_id()?, None);

    // 2. Run two queries, one of them without a recorded generation
    let trace = TraceGenerator::parse(r#"{"question": "one", "sql": "SELECT 1"}"#)?;
    let mut runner = Runner::new(Box::new(SqliteSession::memory()?), Arc::new(trace));
    runner.strategy = PromptStrategy::Baseline;
    runner.store = Some(store.clone());

    let queries = [query(1, "one", "SELECT 1"), query(2, "two", "SELECT 2")];
    let art = runner.run(&EvalConfig::default(), &queries).await?;

    // 3. Read back through a fresh handle
    drop(store);
    let store = Store::open(&db_path)?;
    let id = store.latest_run_id()?.expect("run recorded");
    assert_eq!(Some(id), art.run_id);

    let run = store.run(id)?.expect("run row");
    assert_eq!(run.meta.strategy, PromptStrategy::Baseline);
    assert_eq!(run.meta.generator, "trace");
    assert_eq!(run.status, "completed");
    assert!(run.finished_at.is_some());
    assert_eq!(run.queries, 2);

    let records = store.records(id)?;
    assert_eq!(records.len(), 2);
    assert!(records[0].comparison.results_match);
    assert_eq!(records[1].comparison.scenario, Scenario::AiSkipped);
    assert!(records[1]
        .generation_error
        .as_deref()
        .unwrap()
        .starts_with("no recorded generation"));

    assert_eq!(store.list_runs(10)?.len(), 1);
    Ok(())
}
