use super::args::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlgauge_core::compare::Comparator;
use sqlgauge_core::config::env::GeneratorEnv;
use sqlgauge_core::db::{SqlSession, SqliteSession};
use sqlgauge_core::engine::runner::{Runner, DEFAULT_ERROR_TRUNCATE_CHARS};
use sqlgauge_core::errors::ConfigError;
use sqlgauge_core::heuristics::HeuristicMatcher;
use sqlgauge_core::model::{EvalConfig, TestQuery};
use sqlgauge_core::prompt::PromptStrategy;
use sqlgauge_core::providers::llm::openai::OpenAiGenerator;
use sqlgauge_core::providers::llm::SqlGenerator;
use sqlgauge_core::providers::trace::TraceGenerator;
use sqlgauge_core::seed::SeedPlan;
use sqlgauge_core::storage::Store;
use sqlgauge_core::{registry, seed as seeder};

pub mod queries;
pub mod report;
pub mod run;
pub mod seed;
pub mod strategies;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const GATE_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::cmd_run(args).await,
        Command::Strategies(args) => strategies::cmd_strategies(args).await,
        Command::Seed(args) => seed::cmd_seed(args),
        Command::Queries(args) => match args.cmd {
            QueriesSub::List(a) => queries::cmd_list(a),
            QueriesSub::Seed(a) => queries::cmd_seed(a),
        },
        Command::Report(args) => report::cmd_report(args),
        Command::Init(args) => cmd_init(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if !args.config.exists() {
        ensure_parent_dir(&args.config)?;
        sqlgauge_core::config::write_sample_config(&args.config)?;
        eprintln!("created {}", args.config.display());
    } else {
        eprintln!("note: {} already exists", args.config.display());
    }
    Ok(exit_codes::OK)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Prints configuration errors and maps them to exit code 2; anything else
/// propagates.
pub(crate) fn config_error_or(e: anyhow::Error) -> anyhow::Result<i32> {
    match e.downcast_ref::<ConfigError>() {
        Some(ce) => {
            eprintln!("{}", ce);
            Ok(exit_codes::CONFIG_ERROR)
        }
        None => Err(e),
    }
}

/// Everything a run needs, resolved before the first query is evaluated.
pub(crate) struct Prepared {
    pub cfg: EvalConfig,
    pub queries: Vec<TestQuery>,
    pub generator: Arc<dyn SqlGenerator>,
    pub store: Option<Store>,
    pub heuristics: bool,
}

impl Prepared {
    pub fn error_truncate_chars(&self) -> usize {
        self.cfg
            .settings
            .error_truncate_chars
            .unwrap_or(DEFAULT_ERROR_TRUNCATE_CHARS)
    }

    fn comparator(&self) -> Comparator {
        if !self.heuristics {
            return Comparator::exact_only();
        }
        Comparator::new(
            HeuristicMatcher::default().with_extra(self.cfg.settings.extra_equivalences.clone()),
        )
    }

    /// Builds a runner over `session`. Callers running several passes take
    /// the session back from `runner.session` afterwards.
    pub fn runner(&self, session: Box<dyn SqlSession>, strategy: PromptStrategy) -> Runner {
        let mut runner = Runner::new(session, self.generator.clone());
        runner.comparator = self.comparator();
        runner.strategy = strategy;
        runner.error_truncate_chars = self.error_truncate_chars();
        runner.store = self.store.clone();
        runner
    }
}

fn load_config(args: &EvalArgs) -> Result<EvalConfig, ConfigError> {
    match &args.config {
        Some(path) => sqlgauge_core::config::load_or_default(path, true),
        None => sqlgauge_core::config::load_or_default(Path::new("sqlgauge.yaml"), false),
    }
}

fn build_generator(
    args: &EvalArgs,
    cfg: &EvalConfig,
) -> anyhow::Result<Arc<dyn SqlGenerator>> {
    let trace = args
        .trace_file
        .clone()
        .or_else(|| cfg.settings.trace_file.as_ref().map(PathBuf::from));

    if let Some(path) = trace {
        let g = TraceGenerator::from_path(&path).map_err(|e| ConfigError(e.to_string()))?;
        tracing::info!(event = "generator.trace", file = %path.display(), entries = g.len());
        return Ok(Arc::new(g));
    }

    let env = GeneratorEnv::from_env()?;
    tracing::info!(event = "generator.openai", model = %env.model, base_url = %env.base_url);
    let truncate = cfg
        .settings
        .error_truncate_chars
        .unwrap_or(DEFAULT_ERROR_TRUNCATE_CHARS);
    Ok(Arc::new(OpenAiGenerator::new(&env, truncate)))
}

pub(crate) fn open_database(path: &Path, seed_scale: Option<f64>) -> anyhow::Result<SqliteSession> {
    if seed_scale.is_none() && !path.exists() {
        return Err(ConfigError(format!(
            "database {} does not exist; run `sqlgauge seed` first or pass --seed-scale",
            path.display()
        ))
        .into());
    }
    ensure_parent_dir(path)?;
    let mut session = SqliteSession::open(path)?;
    if let Some(scale) = seed_scale {
        let plan = SeedPlan {
            scale,
            ..SeedPlan::default()
        };
        let counts = seeder::seed(&mut session, &plan)?;
        eprintln!("seeded {} tables at scale {}", counts.len(), scale);
    }
    Ok(session)
}

/// Resolves config, generator, session, questions and store. Configuration
/// problems surface as [`ConfigError`] before any query runs.
pub(crate) fn prepare(args: &EvalArgs) -> anyhow::Result<(Prepared, Box<dyn SqlSession>)> {
    let cfg = load_config(args)?;
    let generator = build_generator(args, &cfg)?;
    let mut session = open_database(&args.database, args.seed_scale)?;

    let queries = if args.from_table {
        registry::load_from_table(&mut session)?
    } else if !cfg.queries.is_empty() {
        cfg.queries.clone()
    } else {
        registry::builtin(session.dialect())
    };
    registry::validate(&queries)?;
    let queries = registry::select(queries, &args.queries)?;

    let store = if args.no_store {
        None
    } else {
        ensure_parent_dir(&args.db)?;
        let store = Store::open(&args.db)?;
        store.init_schema()?;
        Some(store)
    };

    let heuristics = !args.no_heuristics && cfg.settings.heuristics.unwrap_or(true);

    Ok((
        Prepared {
            cfg,
            queries,
            generator,
            store,
            heuristics,
        },
        Box::new(session),
    ))
}
