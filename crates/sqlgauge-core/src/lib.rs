pub mod compare;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod heuristics;
pub mod latency;
pub mod model;
pub mod patterns;
pub mod prompt;
pub mod providers;
pub mod registry;
pub mod report;
pub mod seed;
pub mod storage;
