pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  suite TEXT NOT NULL,
  strategy TEXT NOT NULL,
  generator TEXT NOT NULL,
  dialect TEXT NOT NULL,
  started_at TEXT NOT NULL,
  finished_at TEXT,
  status TEXT NOT NULL,
  config_json TEXT
);

CREATE TABLE IF NOT EXISTS query_results (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_id INTEGER NOT NULL REFERENCES runs(id),
  query_id INTEGER NOT NULL,
  complexity TEXT NOT NULL,
  scenario TEXT NOT NULL,
  results_match INTEGER NOT NULL,
  semantic_match INTEGER NOT NULL,
  row_count_match INTEGER NOT NULL,
  generation_ms REAL NOT NULL,
  ai_execution_ms REAL NOT NULL,
  gt_execution_ms REAL NOT NULL,
  prompt_fingerprint TEXT NOT NULL,
  record_json TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_query_results_run ON query_results(run_id);
"#;
