pub mod executor;
pub mod runner;

pub use runner::Runner;
