use sqlgauge_core::prompt::PromptStrategy;
use sqlgauge_metrics::report::write_artifacts;
use sqlgauge_metrics::strategies::{compare_strategies, render_table, write_strategies_csv};

use super::{config_error_or, exit_codes, prepare};
use crate::cli::args::StrategiesArgs;

pub async fn cmd_strategies(args: StrategiesArgs) -> anyhow::Result<i32> {
    let strategies = if args.strategies.is_empty() {
        PromptStrategy::ALL.to_vec()
    } else {
        let mut out = Vec::new();
        for s in &args.strategies {
            match PromptStrategy::parse(s) {
                Ok(s) if !out.contains(&s) => out.push(s),
                Ok(_) => {}
                Err(e) => return config_error_or(e.into()),
            }
        }
        out
    };

    let (prepared, mut session) = match prepare(&args.eval) {
        Ok(p) => p,
        Err(e) => return config_error_or(e),
    };

    let mut runs = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        eprintln!("strategy {}: {} queries", strategy, prepared.queries.len());
        let mut runner = prepared.runner(session, strategy);
        let artifacts = runner.run(&prepared.cfg, &prepared.queries).await?;
        session = runner.session;

        write_artifacts(&args.out.join(strategy.as_str()), &artifacts)?;
        runs.push(artifacts);
    }

    let rows = compare_strategies(&runs);
    let path = args.out.join("strategies.csv");
    write_strategies_csv(&rows, &path)?;
    print!("{}", render_table(&rows));
    eprintln!("wrote {}", path.display());
    Ok(exit_codes::OK)
}
