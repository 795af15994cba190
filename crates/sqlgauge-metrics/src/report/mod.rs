//! Run-level artifacts: everything that needs the aggregated summary.

use std::path::{Path, PathBuf};

use sqlgauge_core::report::{csv::write_csv, json::write_json, RunArtifacts};

use crate::summary::{summarize, RunSummary};

pub mod chart;
pub mod markdown;
pub mod text;

pub const RESULTS_CSV: &str = "results.csv";
pub const REPORT_MD: &str = "report.md";
pub const SUMMARY_TXT: &str = "summary.txt";
pub const RUN_JSON: &str = "run.json";
pub const CHARTS_DIR: &str = "charts";

/// Writes the full artifact set for a run into `out_dir`.
pub fn write_artifacts(out_dir: &Path, artifacts: &RunArtifacts) -> anyhow::Result<(RunSummary, Vec<PathBuf>)> {
    std::fs::create_dir_all(out_dir)?;
    let summary = summarize(&artifacts.records);
    let mut written = Vec::new();

    let p = out_dir.join(RESULTS_CSV);
    write_csv(&artifacts.records, &p)?;
    written.push(p);

    let p = out_dir.join(RUN_JSON);
    write_json(artifacts, &p)?;
    written.push(p);

    let p = out_dir.join(REPORT_MD);
    std::fs::write(&p, markdown::render(artifacts, &summary))?;
    written.push(p);

    let p = out_dir.join(SUMMARY_TXT);
    std::fs::write(&p, text::render(artifacts, &summary))?;
    written.push(p);

    written.extend(chart::write_charts(
        &out_dir.join(CHARTS_DIR),
        &artifacts.records,
        &summary,
    )?);

    tracing::info!(dir = %out_dir.display(), files = written.len(), "report.written");
    Ok((summary, written))
}
