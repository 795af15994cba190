use crate::errors::GenerationError;
use crate::providers::llm::{GenerationRequest, SqlGenerator};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Recorded {
    Sql(String),
    Failure(String),
}

/// Replays generations recorded in a JSONL file, one object per line:
/// `{"question": "...", "sql": "..."}` or `{"question": "...", "error": "..."}`.
/// Lookup is by question text, so replays work under any prompt strategy.
#[derive(Clone)]
pub struct TraceGenerator {
    // question -> recorded outcome
    traces: Arc<HashMap<String, Recorded>>,
}

impl TraceGenerator {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to open trace file {}: {}", path.display(), e))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        #[derive(serde::Deserialize)]
        struct TraceEntry {
            question: String,
            sql: Option<String>,
            error: Option<String>,
        }

        let mut traces = HashMap::new();
        for (i, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: TraceEntry = serde_json::from_str(line)
                .map_err(|e| anyhow::anyhow!("line {}: failed to parse trace: {}", i + 1, e))?;

            let recorded = match (entry.sql, entry.error) {
                (Some(sql), None) => Recorded::Sql(sql),
                (None, Some(err)) => Recorded::Failure(err),
                _ => anyhow::bail!("line {}: exactly one of `sql`/`error` is required", i + 1),
            };

            if traces.contains_key(&entry.question) {
                anyhow::bail!(
                    "Duplicate question found in trace file at line {}: {}",
                    i + 1,
                    entry.question
                );
            }
            traces.insert(entry.question, recorded);
        }

        Ok(Self {
            traces: Arc::new(traces),
        })
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    fn closest_question(&self, question: &str) -> Option<String> {
        self.traces
            .keys()
            .map(|k| (strsim::normalized_levenshtein(k, question), k))
            .filter(|(score, _)| *score >= 0.5)
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, k)| k.clone())
    }
}

#[async_trait]
impl SqlGenerator for TraceGenerator {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, GenerationError> {
        match self.traces.get(&req.question) {
            Some(Recorded::Sql(sql)) => Ok(sql.clone()),
            Some(Recorded::Failure(msg)) => Err(GenerationError::Recorded(msg.clone())),
            None => Err(GenerationError::TraceMiss {
                closest: self.closest_question(&req.question),
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "trace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn req(q: &str) -> GenerationRequest {
        GenerationRequest::show_sql(q, format!("prompt for {}", q))
    }

    #[tokio::test]
    async fn replays_sql_and_failures() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, r#"{{"question": "How many customers are there?", "sql": "SELECT COUNT(*) FROM CUSTOMER"}}"#)?;
        writeln!(tmp)?;
        writeln!(tmp, r#"{{"question": "List all regions.", "error": "ORA-20000: profile not set"}}"#)?;

        let g = TraceGenerator::from_path(tmp.path())?;
        assert_eq!(g.len(), 2);
        assert_eq!(
            g.generate(&req("How many customers are there?")).await.unwrap(),
            "SELECT COUNT(*) FROM CUSTOMER"
        );
        let err = g.generate(&req("List all regions.")).await.unwrap_err();
        assert!(err.to_string().contains("ORA-20000"));
        Ok(())
    }

    #[tokio::test]
    async fn miss_suggests_closest_question() -> anyhow::Result<()> {
        let g = TraceGenerator::parse(
            r#"{"question": "How many customers are there?", "sql": "SELECT 1"}"#,
        )?;
        match g.generate(&req("How many customers exist?")).await {
            Err(GenerationError::TraceMiss { closest }) => {
                assert_eq!(closest.as_deref(), Some("How many customers are there?"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn rejects_duplicates_and_ambiguous_lines() {
        let dup = "{\"question\": \"q\", \"sql\": \"1\"}\n{\"question\": \"q\", \"sql\": \"2\"}";
        assert!(TraceGenerator::parse(dup).is_err());
        let both = r#"{"question": "q", "sql": "1", "error": "x"}"#;
        assert!(TraceGenerator::parse(both).is_err());
        let neither = r#"{"question": "q"}"#;
        assert!(TraceGenerator::parse(neither).is_err());
    }
}
