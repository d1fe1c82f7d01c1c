pub mod generator;
pub mod json_extract;
pub mod ollama;
pub mod perf;
