use sqlgauge_core::db::SqlSession;
use sqlgauge_core::model::Dialect;
use sqlgauge_core::registry;

use super::{exit_codes, open_database};
use crate::cli::args::{QueriesListArgs, QueriesSeedArgs};

pub fn cmd_list(args: QueriesListArgs) -> anyhow::Result<i32> {
    let queries = if args.from_table {
        let mut session = match open_database(&args.database, None) {
            Ok(s) => s,
            Err(e) => return super::config_error_or(e),
        };
        registry::load_from_table(&mut session)?
    } else {
        registry::builtin(Dialect::Sqlite)
    };

    for q in &queries {
        println!("{:>3}  {:<8} {}", q.id, q.complexity.as_str(), q.question);
        if args.sql {
            println!("       {}", q.ground_truth_sql);
        }
    }
    eprintln!("{} queries", queries.len());
    Ok(exit_codes::OK)
}

pub fn cmd_seed(args: QueriesSeedArgs) -> anyhow::Result<i32> {
    super::ensure_parent_dir(&args.database)?;
    let mut session = sqlgauge_core::db::SqliteSession::open(&args.database)?;
    let queries = registry::builtin(session.dialect());
    let n = registry::store_in_table(&mut session, &queries)?;
    eprintln!("stored {} queries in {}", n, registry::QUERY_TABLE);
    Ok(exit_codes::OK)
}
