use serde::{Deserialize, Serialize};

use crate::model::{Dialect, QueryRecord};
use crate::prompt::PromptStrategy;

pub mod console;
pub mod csv;
pub mod json;

/// Identifies one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub suite: String,
    pub strategy: PromptStrategy,
    pub generator: String,
    pub dialect: Dialect,
    pub started_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifacts {
    /// Present when the run was recorded in the history store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<i64>,
    pub meta: RunMeta,
    pub records: Vec<QueryRecord>,
}

impl RunArtifacts {
    pub fn ai_success_count(&self) -> usize {
        self.records.iter().filter(|r| r.ai_success()).count()
    }

    pub fn match_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.comparison.results_match)
            .count()
    }
}
