use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::heuristics::Equivalence;
use crate::prompt::PromptStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default = "default_version", alias = "configVersion")]
    pub version: u32,
    pub suite: String,
    #[serde(default, skip_serializing_if = "is_default_settings")]
    pub settings: Settings,
    /// Overrides the built-in fixtures when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<TestQuery>,
}

fn default_version() -> u32 {
    1
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            suite: "tpch".to_string(),
            settings: Settings::default(),
            queries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_strategy: Option<PromptStrategy>,
    /// Generation error messages are cut to this many characters (default 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_truncate_chars: Option<usize>,
    /// Set to false to report exact set matches only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristics: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_equivalences: Vec<Equivalence>,
    /// Replay file for the trace generator, relative to the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_file: Option<String>,
}

fn is_default_settings(s: &Settings) -> bool {
    s == &Settings::default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Simple, Complexity::Medium, Complexity::Complex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Medium => "medium",
            Complexity::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = ConfigError;

    // Fixed-width CHAR columns come back space padded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Complexity::Simple),
            "medium" => Ok(Complexity::Medium),
            "complex" => Ok(Complexity::Complex),
            other => Err(ConfigError(format!("unknown complexity tier: {:?}", other))),
        }
    }
}

/// SQL dialect spoken by a session. Selects fixture SQL and prompt rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Oracle,
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Oracle => "oracle",
            Dialect::Sqlite => "sqlite",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Oracle => "Oracle",
            Dialect::Sqlite => "SQLite",
        }
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oracle" => Ok(Dialect::Oracle),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(ConfigError(format!("unknown SQL dialect: {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestQuery {
    pub id: i64,
    pub question: String,
    pub ground_truth_sql: String,
    pub complexity: Complexity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Statement time limit applied to both sides of this query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<u64>,
}

/// A single cell value as returned by a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Scalar {
    /// String form used for comparison. `None` is the null marker, so a SQL
    /// NULL never equals the four-character text "NULL".
    pub fn normalized(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Integer(v) => Some(v.to_string()),
            Scalar::Real(v) => Some(v.to_string()),
            Scalar::Text(s) => Some(s.clone()),
            Scalar::Blob(b) => Some(hex::encode(b)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.normalized() {
            Some(s) => f.write_str(&s),
            None => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Integer(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Real(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Error,
    Skipped,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Error => "error",
            ExecutionStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running one SQL text. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
    pub row_count: usize,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub duration_ms: f64,
}

impl ExecutionResult {
    pub fn success(set: RowSet, duration_ms: f64) -> Self {
        let row_count = set.rows.len();
        Self {
            status: ExecutionStatus::Success,
            columns: set.columns,
            rows: set.rows,
            row_count,
            error_message: None,
            error_code: None,
            duration_ms,
        }
    }

    pub fn error(message: String, code: String, duration_ms: f64) -> Self {
        Self {
            status: ExecutionStatus::Error,
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            error_message: Some(message),
            error_code: Some(code),
            duration_ms,
        }
    }

    pub fn skipped(reason: String) -> Self {
        Self {
            status: ExecutionStatus::Skipped,
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            error_message: Some(reason),
            error_code: None,
            duration_ms: 0.0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    pub fn summary(&self) -> ExecutionSummary {
        ExecutionSummary {
            status: self.status,
            row_count: self.row_count,
            columns: self.columns.clone(),
            error_message: self.error_message.clone(),
            error_code: self.error_code.clone(),
            sample_row: self
                .rows
                .first()
                .map(|r| r.iter().map(|v| v.to_string()).collect()),
        }
    }
}

/// What survives of an [`ExecutionResult`] once rows have been compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub status: ExecutionStatus,
    pub row_count: usize,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_row: Option<Vec<String>>,
}

impl ExecutionSummary {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    BothSuccess,
    GtSuccessAiError,
    GtErrorAiSuccess,
    BothError,
    AiSkipped,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::BothSuccess => "both_success",
            Scenario::GtSuccessAiError => "gt_success_ai_error",
            Scenario::GtErrorAiSuccess => "gt_error_ai_success",
            Scenario::BothError => "both_error",
            Scenario::AiSkipped => "ai_skipped",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "both_success" => Scenario::BothSuccess,
            "gt_success_ai_error" => Scenario::GtSuccessAiError,
            "gt_error_ai_success" => Scenario::GtErrorAiSuccess,
            "both_error" => Scenario::BothError,
            "ai_skipped" => Scenario::AiSkipped,
            other => anyhow::bail!("unknown scenario: {}", other),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub query_id: i64,
    pub gt_result: ExecutionSummary,
    pub ai_result: ExecutionSummary,
    pub both_success: bool,
    /// Exact set equality of normalized rows.
    pub results_match: bool,
    /// Both sides succeeded with the same number of rows.
    pub row_count_match: bool,
    /// Exact match, or a dialect equivalence fired on equal non-zero row counts.
    pub semantic_match: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<String>,
    pub scenario: Scenario,
}

impl ComparisonRecord {
    /// True when only the dialect heuristic made this a match.
    pub fn is_pattern_equivalence(&self) -> bool {
        self.semantic_match && !self.results_match
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryTiming {
    pub generation_ms: f64,
    pub ai_execution_ms: f64,
    pub gt_execution_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: TestQuery,
    pub strategy: PromptStrategy,
    pub prompt_fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_error: Option<String>,
    pub comparison: ComparisonRecord,
    pub timing: QueryTiming,
}

impl QueryRecord {
    /// AI SQL was generated and executed without error.
    pub fn ai_success(&self) -> bool {
        self.comparison.ai_result.is_success()
    }
}
