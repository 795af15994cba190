//! Aggregation of per-query evaluation records into accuracy, latency and
//! readiness figures, plus the reports rendered from them.

pub mod percentile;
pub mod readiness;
pub mod report;
pub mod strategies;
pub mod summary;

pub use percentile::{percentile, Distribution};
pub use readiness::{Grade, Readiness};
pub use summary::{summarize, RunSummary};
