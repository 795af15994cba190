use crate::model::{EvalConfig, QueryRecord};
use crate::report::RunMeta;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Run history: one row per run, one row per evaluated query.
#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRow {
    pub id: i64,
    pub meta: RunMeta,
    pub finished_at: Option<String>,
    pub status: String,
    pub queries: i64,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("store connection mutex poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    pub fn create_run(&self, meta: &RunMeta, cfg: &EvalConfig) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO runs(suite, strategy, generator, dialect, started_at, status, config_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                meta.suite,
                meta.strategy.as_str(),
                meta.generator,
                meta.dialect.as_str(),
                meta.started_at,
                "running",
                serde_json::to_string(cfg)?
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn finalize_run(&self, run_id: i64, status: &str) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE runs SET status=?1, finished_at=?2 WHERE id=?3",
            params![status, chrono::Utc::now().to_rfc3339(), run_id],
        )?;
        Ok(())
    }

    pub fn insert_record(&self, run_id: i64, rec: &QueryRecord) -> anyhow::Result<()> {
        let conn = self.lock()?;
        let c = &rec.comparison;
        conn.execute(
            "INSERT INTO query_results(run_id, query_id, complexity, scenario, results_match, semantic_match,
                row_count_match, generation_ms, ai_execution_ms, gt_execution_ms, prompt_fingerprint, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                run_id,
                rec.query.id,
                rec.query.complexity.as_str(),
                c.scenario.as_str(),
                c.results_match,
                c.semantic_match,
                c.row_count_match,
                rec.timing.generation_ms,
                rec.timing.ai_execution_ms,
                rec.timing.gt_execution_ms,
                rec.prompt_fingerprint,
                serde_json::to_string(rec)?,
            ],
        )?;
        Ok(())
    }

    pub fn latest_run_id(&self) -> anyhow::Result<Option<i64>> {
        let conn = self.lock()?;
        let id = conn
            .query_row("SELECT MAX(id) FROM runs", [], |r| r.get::<_, Option<i64>>(0))
            .optional()?
            .flatten();
        Ok(id)
    }

    pub fn run(&self, run_id: i64) -> anyhow::Result<Option<RunRow>> {
        Ok(self
            .runs_where("WHERE r.id = ?1", params![run_id])?
            .into_iter()
            .next())
    }

    /// Most recent runs first.
    pub fn list_runs(&self, limit: usize) -> anyhow::Result<Vec<RunRow>> {
        self.runs_where("ORDER BY r.id DESC LIMIT ?1", params![limit as i64])
    }

    fn runs_where(&self, clause: &str, p: impl rusqlite::Params) -> anyhow::Result<Vec<RunRow>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT r.id, r.suite, r.strategy, r.generator, r.dialect, r.started_at, r.finished_at, r.status,
                    (SELECT COUNT(*) FROM query_results q WHERE q.run_id = r.id)
             FROM runs r {}",
            clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(p)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let strategy: String = row.get(2)?;
            let dialect: String = row.get(4)?;
            out.push(RunRow {
                id: row.get(0)?,
                meta: RunMeta {
                    suite: row.get(1)?,
                    strategy: crate::prompt::PromptStrategy::parse(&strategy)?,
                    generator: row.get(3)?,
                    dialect: dialect.parse()?,
                    started_at: row.get(5)?,
                },
                finished_at: row.get(6)?,
                status: row.get(7)?,
                queries: row.get(8)?,
            });
        }
        Ok(out)
    }

    /// Every record of a run, in insertion order.
    pub fn records(&self, run_id: i64) -> anyhow::Result<Vec<QueryRecord>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT record_json FROM query_results WHERE run_id=?1 ORDER BY id")?;
        let mut rows = stmt.query(params![run_id])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let s: String = row.get(0)?;
            out.push(serde_json::from_str(&s)?);
        }
        Ok(out)
    }
}
