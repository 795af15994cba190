use sqlgauge_core::db::SqliteSession;
use sqlgauge_core::seed::{seed, SeedPlan};

use super::{ensure_parent_dir, exit_codes};
use crate::cli::args::SeedArgs;

pub fn cmd_seed(args: SeedArgs) -> anyhow::Result<i32> {
    if args.scale.is_nan() || args.scale <= 0.0 || args.chunk_size == 0 {
        eprintln!("config error: --scale and --chunk-size must be positive");
        return Ok(exit_codes::CONFIG_ERROR);
    }
    ensure_parent_dir(&args.database)?;
    let mut session = SqliteSession::open(&args.database)?;
    let plan = SeedPlan {
        scale: args.scale,
        chunk_size: args.chunk_size,
        truncate: !args.no_truncate,
    };

    let started = std::time::Instant::now();
    let counts = seed(&mut session, &plan)?;
    for c in &counts {
        println!("{:<10} {:>10}", c.table, c.rows);
    }
    eprintln!(
        "seeded {} in {:.1}s",
        args.database.display(),
        started.elapsed().as_secs_f64()
    );
    Ok(exit_codes::OK)
}
