use sqlgauge_core::prompt::PromptStrategy;
use sqlgauge_core::report::console::print_summary;
use sqlgauge_metrics::report::write_artifacts;

use super::{config_error_or, exit_codes, prepare};
use crate::cli::args::RunArgs;

pub async fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    if let Some(rate) = args.min_match_rate {
        if !(0.0..=1.0).contains(&rate) {
            eprintln!(
                "config error: --min-match-rate must be between 0 and 1, got {}",
                rate
            );
            return Ok(exit_codes::CONFIG_ERROR);
        }
    }

    let requested = match args.strategy.as_deref().map(PromptStrategy::parse).transpose() {
        Ok(s) => s,
        Err(e) => return config_error_or(e.into()),
    };
    let (prepared, session) = match prepare(&args.eval) {
        Ok(p) => p,
        Err(e) => return config_error_or(e),
    };
    let strategy = requested
        .or(prepared.cfg.settings.prompt_strategy)
        .unwrap_or_default();

    let mut runner = prepared.runner(session, strategy);
    let artifacts = runner.run(&prepared.cfg, &prepared.queries).await?;
    print_summary(&artifacts);

    let (summary, written) = write_artifacts(&args.out, &artifacts)?;
    eprintln!("wrote {} files to {}", written.len(), args.out.display());
    eprintln!(
        "match rate {:.1}%, semantic {:.1}%, readiness {}",
        summary.match_rate * 100.0,
        summary.semantic_match_rate * 100.0,
        summary.readiness.overall().as_str()
    );

    if let Some(min) = args.min_match_rate {
        if summary.match_rate < min {
            eprintln!(
                "gate failed: match rate {:.1}% is below {:.1}%",
                summary.match_rate * 100.0,
                min * 100.0
            );
            return Ok(exit_codes::GATE_FAILED);
        }
    }
    Ok(exit_codes::OK)
}
