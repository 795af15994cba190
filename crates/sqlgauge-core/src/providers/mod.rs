pub mod llm;
pub mod trace;
