use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sqlgauge",
    version,
    about = "Evaluation harness for natural-language-to-SQL generation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate SQL for every question, run it next to the ground truth and report
    Run(RunArgs),
    /// Run the same questions once per prompt strategy and compare
    Strategies(StrategiesArgs),
    /// Create and populate the TPC-H schema with synthetic rows
    Seed(SeedArgs),
    /// Inspect or store the question registry
    Queries(QueriesArgs),
    /// Re-render the artifacts of a stored run
    Report(ReportArgs),
    /// Write a sample config
    Init(InitArgs),
    Version,
}

/// Options shared by every command that evaluates queries.
#[derive(clap::Args, Debug, Clone)]
pub struct EvalArgs {
    /// YAML config; defaults apply when the file is absent
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// SQLite database holding the TPC-H tables
    #[arg(long, default_value = "tpch.db")]
    pub database: PathBuf,

    /// Run history store
    #[arg(long, default_value = ".sqlgauge/runs.db")]
    pub db: PathBuf,

    /// Do not record the run in the history store
    #[arg(long)]
    pub no_store: bool,

    /// Replay generations from a JSONL trace instead of calling the endpoint
    #[arg(long)]
    pub trace_file: Option<PathBuf>,

    /// Only these query ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub queries: Vec<i64>,

    /// Read questions from the NL_SQL_TEST_QUERIES table
    #[arg(long)]
    pub from_table: bool,

    /// Seed the database at this scale before evaluating
    #[arg(long)]
    pub seed_scale: Option<f64>,

    /// Report exact matches only
    #[arg(long)]
    pub no_heuristics: bool,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub eval: EvalArgs,

    /// baseline | enhanced | few_shot (overrides the config)
    #[arg(long)]
    pub strategy: Option<String>,

    /// Artifact directory
    #[arg(long, default_value = "sqlgauge-results")]
    pub out: PathBuf,

    /// Exit 1 when the exact match rate (0..1) is below this value
    #[arg(long)]
    pub min_match_rate: Option<f64>,
}

#[derive(Parser, Clone)]
pub struct StrategiesArgs {
    #[command(flatten)]
    pub eval: EvalArgs,

    /// Strategies to compare (comma separated); all by default
    #[arg(long, value_delimiter = ',')]
    pub strategies: Vec<String>,

    #[arg(long, default_value = "sqlgauge-strategies")]
    pub out: PathBuf,
}

#[derive(Parser, Clone)]
pub struct SeedArgs {
    #[arg(long, default_value = "tpch.db")]
    pub database: PathBuf,

    /// 1.0 is the full TPC-H SF1 row counts
    #[arg(long, default_value_t = 0.1)]
    pub scale: f64,

    /// Rows per insert transaction
    #[arg(long, default_value_t = 5000)]
    pub chunk_size: usize,

    /// Keep existing rows instead of emptying the tables first
    #[arg(long)]
    pub no_truncate: bool,
}

#[derive(Parser, Clone)]
pub struct QueriesArgs {
    #[command(subcommand)]
    pub cmd: QueriesSub,
}

#[derive(Subcommand, Clone)]
pub enum QueriesSub {
    /// Print the registry
    List(QueriesListArgs),
    /// Upsert the built-in questions into NL_SQL_TEST_QUERIES
    Seed(QueriesSeedArgs),
}

#[derive(Parser, Clone)]
pub struct QueriesListArgs {
    #[arg(long, default_value = "tpch.db")]
    pub database: PathBuf,

    /// Read from the NL_SQL_TEST_QUERIES table instead of the built-in set
    #[arg(long)]
    pub from_table: bool,

    /// Also print the ground-truth SQL
    #[arg(long)]
    pub sql: bool,
}

#[derive(Parser, Clone)]
pub struct QueriesSeedArgs {
    #[arg(long, default_value = "tpch.db")]
    pub database: PathBuf,
}

#[derive(Parser, Clone)]
pub struct ReportArgs {
    #[arg(long, default_value = ".sqlgauge/runs.db")]
    pub db: PathBuf,

    /// Defaults to the latest run
    #[arg(long)]
    pub run_id: Option<i64>,

    #[arg(long, default_value = "sqlgauge-results")]
    pub out: PathBuf,

    /// List recent runs instead of rendering one
    #[arg(long)]
    pub list: bool,

    #[arg(long, default_value_t = 20)]
    pub last: usize,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "sqlgauge.yaml")]
    pub config: PathBuf,
}
