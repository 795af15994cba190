//! Charts as standalone SVG documents.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use sqlgauge_core::model::QueryRecord;

use crate::summary::RunSummary;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 420.0;
const LEFT: f64 = 70.0;
const RIGHT: f64 = 20.0;
const TOP: f64 = 50.0;
const BOTTOM: f64 = 70.0;

const GREEN: &str = "#2ecc71";
const ORANGE: &str = "#f39c12";
const RED: &str = "#e74c3c";
const BLUE: &str = "#3498db";
const PURPLE: &str = "#9b59b6";

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

struct Canvas {
    body: String,
}

impl Canvas {
    fn new(title: &str) -> Self {
        let mut c = Self {
            body: String::new(),
        };
        c.text(WIDTH / 2.0, 28.0, "middle", 16.0, title);
        c
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x, y, w, h, fill
        );
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, dashed: bool) {
        let dash = if dashed { r#" stroke-dasharray="6 4""# } else { "" };
        let _ = writeln!(
            self.body,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1.5"{}/>"#,
            x1, y1, x2, y2, stroke, dash
        );
    }

    fn text(&mut self, x: f64, y: f64, anchor: &str, size: f64, s: &str) {
        let _ = writeln!(
            self.body,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="{}" font-size="{}" font-family="sans-serif">{}</text>"#,
            x,
            y,
            anchor,
            size,
            escape(s)
        );
    }

    fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n\
             <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n{body}</svg>\n",
            w = WIDTH,
            h = HEIGHT,
            body = self.body
        )
    }
}

struct Series<'a> {
    name: &'a str,
    color: &'a str,
    values: Vec<f64>,
}

fn nice_max(v: f64) -> f64 {
    if v <= 0.0 {
        return 1.0;
    }
    let mag = 10f64.powi(v.log10().floor() as i32);
    for step in [1.0, 2.0, 2.5, 5.0, 10.0] {
        if step * mag >= v {
            return step * mag;
        }
    }
    10.0 * mag
}

fn axes(c: &mut Canvas, y_max: f64, y_label: &str) {
    let plot_h = HEIGHT - TOP - BOTTOM;
    c.line(LEFT, TOP, LEFT, HEIGHT - BOTTOM, "#333", false);
    c.line(LEFT, HEIGHT - BOTTOM, WIDTH - RIGHT, HEIGHT - BOTTOM, "#333", false);
    for i in 0..=4 {
        let v = y_max * i as f64 / 4.0;
        let y = HEIGHT - BOTTOM - plot_h * i as f64 / 4.0;
        c.line(LEFT - 4.0, y, LEFT, y, "#333", false);
        c.text(LEFT - 8.0, y + 4.0, "end", 11.0, &format!("{:.0}", v));
    }
    c.text(18.0, TOP - 12.0, "start", 12.0, y_label);
}

fn grouped_bars(title: &str, y_label: &str, categories: &[String], series: &[Series<'_>], y_max: Option<f64>) -> String {
    let mut c = Canvas::new(title);
    let data_max = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0, f64::max);
    let y_max = y_max.unwrap_or_else(|| nice_max(data_max));
    axes(&mut c, y_max, y_label);

    let plot_w = WIDTH - LEFT - RIGHT;
    let plot_h = HEIGHT - TOP - BOTTOM;
    let n = categories.len().max(1) as f64;
    let group_w = plot_w / n;
    let bar_w = group_w * 0.8 / series.len().max(1) as f64;

    for (ci, cat) in categories.iter().enumerate() {
        let gx = LEFT + group_w * ci as f64 + group_w * 0.1;
        for (si, s) in series.iter().enumerate() {
            let v = s.values.get(ci).copied().unwrap_or(0.0).max(0.0);
            let h = (v / y_max).min(1.0) * plot_h;
            c.rect(gx + bar_w * si as f64, HEIGHT - BOTTOM - h, bar_w, h, s.color);
        }
        c.text(gx + group_w * 0.4, HEIGHT - BOTTOM + 18.0, "middle", 11.0, cat);
    }

    if series.len() > 1 {
        for (si, s) in series.iter().enumerate() {
            let x = LEFT + 10.0 + 150.0 * si as f64;
            c.rect(x, HEIGHT - 30.0, 12.0, 12.0, s.color);
            c.text(x + 18.0, HEIGHT - 20.0, "start", 11.0, s.name);
        }
    }
    c.finish()
}

pub fn accuracy_by_complexity(summary: &RunSummary) -> String {
    let tiers = &summary.by_complexity;
    let cats: Vec<String> = tiers.iter().map(|t| t.complexity.to_string()).collect();
    grouped_bars(
        "Accuracy by Query Complexity",
        "%",
        &cats,
        &[
            Series {
                name: "AI success",
                color: GREEN,
                values: tiers.iter().map(|t| t.success_rate * 100.0).collect(),
            },
            Series {
                name: "Exact match",
                color: BLUE,
                values: tiers.iter().map(|t| t.match_rate * 100.0).collect(),
            },
            Series {
                name: "Semantic match",
                color: PURPLE,
                values: tiers.iter().map(|t| t.semantic_match_rate * 100.0).collect(),
            },
        ],
        Some(100.0),
    )
}

pub fn overall_metrics(summary: &RunSummary) -> String {
    let cats = vec![
        "AI success".to_string(),
        "Exact match".to_string(),
        "Semantic match".to_string(),
    ];
    grouped_bars(
        "Overall Metrics",
        "%",
        &cats,
        &[Series {
            name: "rate",
            color: BLUE,
            values: vec![
                summary.success_rate * 100.0,
                summary.match_rate * 100.0,
                summary.semantic_match_rate * 100.0,
            ],
        }],
        Some(100.0),
    )
}

/// Histogram of total latency with mean (red) and median (orange) markers.
pub fn latency_histogram(records: &[QueryRecord], summary: &RunSummary) -> String {
    let samples: Vec<f64> = records
        .iter()
        .filter(|r| r.ai_success())
        .map(|r| r.timing.total_ms())
        .collect();
    let mut c = Canvas::new("Total Latency Distribution");

    let Some(dist) = summary.latency.total else {
        c.text(WIDTH / 2.0, HEIGHT / 2.0, "middle", 13.0, "no successful executions");
        return c.finish();
    };

    const BINS: usize = 10;
    let span = (dist.max - dist.min).max(1.0);
    let mut counts = [0usize; BINS];
    for v in &samples {
        let i = (((v - dist.min) / span) * BINS as f64) as usize;
        counts[i.min(BINS - 1)] += 1;
    }
    let y_max = nice_max(counts.iter().copied().max().unwrap_or(0) as f64);
    axes(&mut c, y_max, "queries");

    let plot_w = WIDTH - LEFT - RIGHT;
    let plot_h = HEIGHT - TOP - BOTTOM;
    let bin_w = plot_w / BINS as f64;
    for (i, n) in counts.iter().enumerate() {
        let h = *n as f64 / y_max * plot_h;
        c.rect(LEFT + bin_w * i as f64 + 1.0, HEIGHT - BOTTOM - h, bin_w - 2.0, h, BLUE);
    }

    let x_of = |v: f64| LEFT + (v - dist.min) / span * plot_w;
    c.line(x_of(dist.mean), TOP, x_of(dist.mean), HEIGHT - BOTTOM, RED, true);
    c.line(x_of(dist.median), TOP, x_of(dist.median), HEIGHT - BOTTOM, ORANGE, true);
    c.text(LEFT, HEIGHT - BOTTOM + 18.0, "start", 11.0, &format!("{:.0} ms", dist.min));
    c.text(WIDTH - RIGHT, HEIGHT - BOTTOM + 18.0, "end", 11.0, &format!("{:.0} ms", dist.max));
    c.rect(LEFT + 10.0, HEIGHT - 30.0, 12.0, 12.0, RED);
    c.text(LEFT + 28.0, HEIGHT - 20.0, "start", 11.0, &format!("mean {:.0} ms", dist.mean));
    c.rect(LEFT + 180.0, HEIGHT - 30.0, 12.0, 12.0, ORANGE);
    c.text(LEFT + 198.0, HEIGHT - 20.0, "start", 11.0, &format!("median {:.0} ms", dist.median));
    c.finish()
}

pub fn generation_vs_execution(records: &[QueryRecord]) -> String {
    let first: Vec<&QueryRecord> = records.iter().filter(|r| r.ai_success()).take(10).collect();
    let cats: Vec<String> = first.iter().map(|r| format!("Q{}", r.query.id)).collect();
    grouped_bars(
        "Generation vs Execution Time (first 10 queries)",
        "ms",
        &cats,
        &[
            Series {
                name: "Generation",
                color: ORANGE,
                values: first.iter().map(|r| r.timing.generation_ms).collect(),
            },
            Series {
                name: "AI execution",
                color: GREEN,
                values: first.iter().map(|r| r.timing.ai_execution_ms).collect(),
            },
        ],
        None,
    )
}

pub fn top_overhead(records: &[QueryRecord]) -> String {
    let mut rs: Vec<&QueryRecord> = records.iter().filter(|r| r.ai_success()).collect();
    rs.sort_by(|a, b| b.timing.overhead_ratio().total_cmp(&a.timing.overhead_ratio()));
    rs.truncate(10);
    let cats: Vec<String> = rs.iter().map(|r| format!("Q{}", r.query.id)).collect();
    grouped_bars(
        "Top 10 Generation Overhead Ratios",
        "x",
        &cats,
        &[Series {
            name: "overhead",
            color: RED,
            values: rs.iter().map(|r| r.timing.overhead_ratio()).collect(),
        }],
        None,
    )
}

/// Writes every chart into `dir` and returns the paths written.
pub fn write_charts(dir: &Path, records: &[QueryRecord], summary: &RunSummary) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let charts = [
        ("accuracy_by_complexity.svg", accuracy_by_complexity(summary)),
        ("overall_metrics.svg", overall_metrics(summary)),
        ("latency_histogram.svg", latency_histogram(records, summary)),
        ("generation_vs_execution.svg", generation_vs_execution(records)),
        ("top_overhead.svg", top_overhead(records)),
    ];
    let mut out = Vec::with_capacity(charts.len());
    for (name, svg) in charts {
        let path = dir.join(name);
        std::fs::write(&path, svg)?;
        out.push(path);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_max_rounds_up_to_a_readable_bound() {
        assert_eq!(nice_max(0.0), 1.0);
        assert_eq!(nice_max(7.0), 10.0);
        assert_eq!(nice_max(180.0), 200.0);
        assert_eq!(nice_max(2400.0), 2500.0);
    }

    #[test]
    fn labels_are_escaped() {
        let svg = grouped_bars(
            "a < b & c",
            "%",
            &["x".to_string()],
            &[Series {
                name: "s",
                color: BLUE,
                values: vec![1.0],
            }],
            None,
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("a &lt; b &amp; c"));
    }
}
