use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::compare::Comparator;
use crate::db::SqlSession;
use crate::engine::executor::execute;
use crate::errors::truncate_message;
use crate::fingerprint::prompt_fingerprint;
use crate::model::{EvalConfig, ExecutionResult, QueryRecord, QueryTiming, TestQuery};
use crate::prompt::PromptStrategy;
use crate::providers::llm::{GenerationRequest, SqlGenerator};
use crate::report::{RunArtifacts, RunMeta};
use crate::storage::Store;

pub const DEFAULT_ERROR_TRUNCATE_CHARS: usize = 100;

/// Drives one evaluation run: for each query, generate, execute both sides,
/// compare and record. Strictly sequential over a single session.
pub struct Runner {
    pub session: Box<dyn SqlSession>,
    pub generator: Arc<dyn SqlGenerator>,
    pub comparator: Comparator,
    pub strategy: PromptStrategy,
    pub error_truncate_chars: usize,
    pub store: Option<Store>,
}

impl Runner {
    pub fn new(session: Box<dyn SqlSession>, generator: Arc<dyn SqlGenerator>) -> Self {
        Self {
            session,
            generator,
            comparator: Comparator::default(),
            strategy: PromptStrategy::default(),
            error_truncate_chars: DEFAULT_ERROR_TRUNCATE_CHARS,
            store: None,
        }
    }

    pub async fn run(
        &mut self,
        cfg: &EvalConfig,
        queries: &[TestQuery],
    ) -> anyhow::Result<RunArtifacts> {
        let meta = RunMeta {
            suite: cfg.suite.clone(),
            strategy: self.strategy,
            generator: self.generator.provider_name().to_string(),
            dialect: self.session.dialect(),
            started_at: chrono::Utc::now().to_rfc3339(),
        };

        let run_id = match &self.store {
            Some(store) => Some(store.create_run(&meta, cfg)?),
            None => None,
        };
        tracing::info!(
            run_id = ?run_id,
            queries = queries.len(),
            strategy = %self.strategy,
            generator = %meta.generator,
            "run.started"
        );

        let mut records = Vec::with_capacity(queries.len());
        for q in queries {
            let rec = self.evaluate(q).await;
            if let (Some(store), Some(id)) = (&self.store, run_id) {
                store.insert_record(id, &rec)?;
            }
            records.push(rec);
        }

        if let (Some(store), Some(id)) = (&self.store, run_id) {
            store.finalize_run(id, "completed")?;
        }

        let artifacts = RunArtifacts {
            run_id,
            meta,
            records,
        };
        tracing::info!(
            run_id = ?run_id,
            executed = artifacts.ai_success_count(),
            matched = artifacts.match_count(),
            "run.finished"
        );
        Ok(artifacts)
    }

    /// Evaluates one query. Generation and execution failures end up in the
    /// record rather than as errors.
    pub async fn evaluate(&mut self, q: &TestQuery) -> QueryRecord {
        let dialect = self.session.dialect();
        let prompt = self.strategy.compose(&q.question, dialect);
        let fingerprint =
            prompt_fingerprint(self.generator.provider_name(), self.strategy, &prompt);
        let req = GenerationRequest::show_sql(&q.question, prompt);

        let start = Instant::now();
        let generated = self.generator.generate(&req).await;
        let generation_ms = start.elapsed().as_secs_f64() * 1000.0;

        let time_limit = q.time_limit_seconds.map(Duration::from_secs);
        let (generated_sql, generation_error, ai) = match generated {
            Ok(sql) => {
                tracing::debug!(query_id = q.id, sql = %sql, "query.generated");
                let ai = execute(self.session.as_mut(), &sql, time_limit);
                (Some(sql), None, ai)
            }
            Err(e) => {
                let msg = truncate_message(&e.to_string(), self.error_truncate_chars);
                tracing::warn!(query_id = q.id, error = %msg, "generation.failed");
                (None, Some(msg.clone()), ExecutionResult::skipped(msg))
            }
        };
        let gt = execute(self.session.as_mut(), &q.ground_truth_sql, time_limit);

        let comparison = self.comparator.compare(
            q.id,
            &gt,
            &ai,
            &q.ground_truth_sql,
            generated_sql.as_deref(),
        );
        let timing = QueryTiming {
            generation_ms,
            ai_execution_ms: ai.duration_ms,
            gt_execution_ms: gt.duration_ms,
        };

        tracing::info!(
            query_id = q.id,
            complexity = %q.complexity,
            scenario = %comparison.scenario,
            results_match = comparison.results_match,
            semantic_match = comparison.semantic_match,
            generation_ms = timing.generation_ms,
            "query.evaluated"
        );

        QueryRecord {
            query: q.clone(),
            strategy: self.strategy,
            prompt_fingerprint: fingerprint,
            generated_sql,
            generation_error,
            comparison,
            timing,
        }
    }
}
