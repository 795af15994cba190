use sqlgauge_core::report::console::print_summary;
use sqlgauge_core::report::RunArtifacts;
use sqlgauge_core::storage::Store;
use sqlgauge_metrics::report::write_artifacts;

use super::exit_codes;
use crate::cli::args::ReportArgs;

pub fn cmd_report(args: ReportArgs) -> anyhow::Result<i32> {
    if !args.db.exists() {
        eprintln!("config error: run store {} not found", args.db.display());
        return Ok(exit_codes::CONFIG_ERROR);
    }
    let store = Store::open(&args.db)?;
    store.init_schema()?;

    if args.list {
        for r in store.list_runs(args.last)? {
            println!(
                "{:>5}  {:<9} {:<10} {:<8} {:>4} queries  {}  {}",
                r.id,
                r.status,
                r.meta.strategy.as_str(),
                r.meta.generator,
                r.queries,
                r.meta.dialect.as_str(),
                r.meta.started_at
            );
        }
        return Ok(exit_codes::OK);
    }

    let run_id = match args.run_id {
        Some(id) => id,
        None => match store.latest_run_id()? {
            Some(id) => id,
            None => {
                eprintln!("no runs recorded in {}", args.db.display());
                return Ok(exit_codes::CONFIG_ERROR);
            }
        },
    };
    let Some(run) = store.run(run_id)? else {
        eprintln!("run {} not found", run_id);
        return Ok(exit_codes::CONFIG_ERROR);
    };

    let artifacts = RunArtifacts {
        run_id: Some(run.id),
        meta: run.meta,
        records: store.records(run.id)?,
    };
    print_summary(&artifacts);
    let (_, written) = write_artifacts(&args.out, &artifacts)?;
    eprintln!("wrote {} files to {}", written.len(), args.out.display());
    Ok(exit_codes::OK)
}
