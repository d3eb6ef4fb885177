//! DivLab Runner — run configuration, pipeline orchestration, artifact export.
//!
//! This crate builds on `divlab-core` to provide:
//! - TOML run configuration with validation
//! - The fetch → combine → calendar → statistics pipeline
//! - CSV and JSON artifacts for per-ticker bars, the combined table,
//!   the dividend calendar and its statistics

pub mod config;
pub mod export;
pub mod pipeline;

pub use config::{ConfigError, OutputMode, RunConfig};
pub use export::CsvBarSink;
pub use pipeline::{run_pipeline, RunReport};
